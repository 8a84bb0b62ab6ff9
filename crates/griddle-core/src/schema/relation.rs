use super::Catalog;
use crate::{Error, Result};

/// Structural cardinality between two collections, inferred from foreign
/// keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relationship {
    /// The joined collection holds a foreign key back to the base.
    OneToMany,

    /// The base collection holds the foreign key.
    ManyToOne,

    /// Neither side holds a foreign key; a junction collection references
    /// both.
    ManyToMany,
}

/// Upper bound on join-path length.
///
/// The relationship graph is not guaranteed acyclic; resolution fails
/// instead of recursing past this depth.
pub const MAX_JOIN_DEPTH: usize = 8;

/// A foreign-key attachment: the attribute holding the key and the attribute
/// it points at.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinKey {
    pub fk_attribute: String,
    pub referenced_attribute: String,
}

/// The junction collection linking the two sides of a many-to-many step.
#[derive(Debug, Clone, PartialEq)]
pub struct Junction {
    pub collection: String,

    /// Junction foreign key pointing at the step's parent.
    pub to_parent: JoinKey,

    /// Junction foreign key pointing at the joined collection.
    pub to_joined: JoinKey,

    /// Junction attributes carried into the step's payload, e.g. a grade on
    /// an enrollment. Foreign keys and identity columns stay out of the
    /// payload.
    pub attributes: Vec<String>,
}

/// How a join step attaches to its parent.
#[derive(Debug, Clone, PartialEq)]
pub enum Link {
    /// One-to-many: the joined collection holds `fk`, pointing at the
    /// parent's `referenced` attribute.
    ForeignKeyOnJoined { fk: String, referenced: String },

    /// Many-to-one: the parent holds `fk`, pointing at the joined
    /// collection's `referenced` attribute.
    ForeignKeyOnParent { fk: String, referenced: String },

    /// Many-to-many through a junction collection.
    ViaJunction(Junction),
}

/// One resolved step of a join path.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinNode {
    /// The joined collection.
    pub collection: String,

    /// Cardinality between the parent step and this collection.
    pub relationship: Relationship,

    /// Foreign-key attachment to the parent.
    pub link: Link,

    /// JSON key under which this step's payload appears in its parent:
    /// always the joined collection's own name.
    pub json_key: String,

    /// True when the step aggregates rows (one-to-many or many-to-many).
    pub aggregated: bool,

    /// Attributes projected into the step's JSON payload. The foreign key
    /// that attaches the child step is excluded; it is replaced by the
    /// child's aggregated value.
    pub attributes: Vec<String>,

    /// The next step of the path, nested inside this one.
    pub child: Option<Box<JoinNode>>,
}

/// A fully resolved join path: relationship classification and attribute
/// selection happen here, rendering the tree to SQL is a separate, pure
/// pass.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinTree {
    pub root: JoinNode,
}

impl JoinTree {
    /// Resolves an ordered chain of collection names against `base`.
    ///
    /// Every consecutive pair must have a classifiable relationship; the
    /// chain length is capped at [`MAX_JOIN_DEPTH`].
    pub fn resolve(catalog: &Catalog, base: &str, path: &[String]) -> Result<JoinTree> {
        if path.is_empty() {
            return Err(Error::schema(format!(
                "empty join path on collection >{base}<"
            )));
        }
        if path.len() > MAX_JOIN_DEPTH {
            return Err(Error::schema(format!(
                "join path >{}< exceeds the maximum depth of {MAX_JOIN_DEPTH}",
                path.join(",")
            )));
        }

        let root = resolve_step(catalog, base, path)?;
        Ok(JoinTree { root })
    }

    /// Collection names on the path, junctions included. Used to scope
    /// dotted filter references.
    pub fn collections(&self) -> Vec<&str> {
        let mut names = vec![];
        let mut node = Some(&self.root);
        while let Some(current) = node {
            names.push(current.collection.as_str());
            if let Link::ViaJunction(junction) = &current.link {
                names.push(junction.collection.as_str());
            }
            node = current.child.as_deref();
        }
        names
    }
}

fn resolve_step(catalog: &Catalog, parent: &str, path: &[String]) -> Result<JoinNode> {
    let (name, rest) = path.split_first().expect("path is non-empty");
    let joined = catalog.collection(name)?;
    let relationship = catalog.relationship(parent, name)?;

    let link = match relationship {
        Relationship::OneToMany => {
            let attr = joined.reference_to(parent).ok_or_else(|| missing_fk(name, parent))?;
            let reference = attr.reference.as_ref().expect("reference_to returned a foreign key");
            Link::ForeignKeyOnJoined {
                fk: attr.name.clone(),
                referenced: reference.attribute.clone(),
            }
        }
        Relationship::ManyToOne => {
            let parent_collection = catalog.collection(parent)?;
            let attr = parent_collection
                .reference_to(name)
                .ok_or_else(|| missing_fk(parent, name))?;
            let reference = attr.reference.as_ref().expect("reference_to returned a foreign key");
            Link::ForeignKeyOnParent {
                fk: attr.name.clone(),
                referenced: reference.attribute.clone(),
            }
        }
        Relationship::ManyToMany => {
            let junction = catalog.junction(parent, name)?;
            let to_parent = junction.reference_to(parent).ok_or_else(|| missing_fk(&junction.name, parent))?;
            let to_joined = junction.reference_to(name).ok_or_else(|| missing_fk(&junction.name, name))?;
            let attributes = junction
                .attributes
                .values()
                .filter(|a| a.reference.is_none() && !a.identity)
                .map(|a| a.name.clone())
                .collect();
            Link::ViaJunction(Junction {
                collection: junction.name.clone(),
                to_parent: join_key(to_parent),
                to_joined: join_key(to_joined),
                attributes,
            })
        }
    };

    let child = match rest {
        [] => None,
        _ => Some(Box::new(resolve_step(catalog, name, rest)?)),
    };

    // The foreign key that attaches a many-to-one child is dropped from the
    // payload; the child's value takes its place under the same key.
    let excluded = child.as_ref().and_then(|c| match &c.link {
        Link::ForeignKeyOnParent { fk, .. } => Some(fk.as_str()),
        _ => None,
    });
    let attributes = joined
        .attributes
        .keys()
        .filter(|key| Some(key.as_str()) != excluded)
        .cloned()
        .collect();

    // Nested payloads always appear under the nested collection's own key,
    // whichever side holds the foreign key.
    let json_key = name.clone();

    Ok(JoinNode {
        collection: name.clone(),
        relationship,
        link,
        json_key,
        aggregated: relationship != Relationship::ManyToOne,
        attributes,
        child,
    })
}

fn join_key(attr: &super::Attribute) -> JoinKey {
    let reference = attr.reference.as_ref().expect("junction attribute holds a foreign key");
    JoinKey {
        fk_attribute: attr.name.clone(),
        referenced_attribute: reference.attribute.clone(),
    }
}

fn missing_fk(holder: &str, target: &str) -> Error {
    Error::schema(format!(
        "collection >{holder}< holds no foreign key into >{target}<"
    ))
}
