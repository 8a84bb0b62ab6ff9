use super::{Collection, Relationship};
use crate::{Error, Result};

use indexmap::IndexMap;
use std::collections::HashMap;

/// An introspection snapshot of one database schema.
///
/// A catalog is built once per request by the driver and holds every
/// collection of the schema, so relationship classification and junction
/// discovery are pure in-memory lookups: deterministic and side-effect-free.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    schema: String,
    collections: IndexMap<String, Collection>,
    junction_overrides: HashMap<(String, String), String>,
}

impl Catalog {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            collections: IndexMap::new(),
            junction_overrides: HashMap::new(),
        }
    }

    /// Name of the database schema this snapshot was taken from.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn with_collection(mut self, collection: Collection) -> Self {
        self.collections
            .insert(collection.name.clone(), collection);
        self
    }

    /// Maps a collection pair to an explicit junction collection, overriding
    /// structural discovery. Used when more than one candidate junction
    /// exists between the two sides.
    pub fn with_junction_override(
        mut self,
        left: impl Into<String>,
        right: impl Into<String>,
        junction: impl Into<String>,
    ) -> Self {
        self.junction_overrides
            .insert((left.into(), right.into()), junction.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    /// Applies an in-place edit to one attribute. Introspection uses this to
    /// fold key, foreign-key, and geometry metadata into the snapshot.
    pub fn map_attribute(
        &mut self,
        collection: &str,
        attribute: &str,
        f: impl FnOnce(&mut super::Attribute),
    ) {
        if let Some(attribute) = self
            .collections
            .get_mut(collection)
            .and_then(|c| c.attributes.get_mut(attribute))
        {
            f(attribute);
        }
    }

    /// Looks up a collection, treating an attribute-less entry as missing: a
    /// real table always carries at least its identity column.
    pub fn collection(&self, name: &str) -> Result<&Collection> {
        match self.collections.get(name) {
            Some(collection) if !collection.attributes.is_empty() => Ok(collection),
            _ => Err(Error::schema(format!(
                "collection >{}.{}< does not exist",
                self.schema, name
            ))),
        }
    }

    /// Classifies the cardinality between two collections from their foreign
    /// keys. Fails when no structural relationship can be determined.
    pub fn relationship(&self, left: &str, right: &str) -> Result<Relationship> {
        let a = self.collection(left)?;
        let b = self.collection(right)?;

        if a.reference_to(right).is_some() {
            return Ok(Relationship::ManyToOne);
        }
        if b.reference_to(left).is_some() {
            return Ok(Relationship::OneToMany);
        }
        if !self.junction_candidates(left, right).is_empty()
            || self.junction_override(left, right).is_some()
        {
            return Ok(Relationship::ManyToMany);
        }

        Err(Error::schema(format!(
            "cannot determine the relationship between >{left}< and >{right}<"
        )))
    }

    /// Resolves the junction collection of a many-to-many pair.
    ///
    /// An explicit override wins; otherwise exactly one structural candidate
    /// is required and ambiguity is an error.
    pub fn junction(&self, left: &str, right: &str) -> Result<&Collection> {
        if let Some(name) = self.junction_override(left, right) {
            let junction = self.collection(name)?;
            if junction.reference_to(left).is_none() || junction.reference_to(right).is_none() {
                return Err(Error::schema(format!(
                    "configured junction >{name}< does not reference both >{left}< and >{right}<"
                )));
            }
            return Ok(junction);
        }

        let candidates = self.junction_candidates(left, right);
        match candidates.as_slice() {
            [junction] => Ok(junction),
            [] => Err(Error::schema(format!(
                "no junction collection links >{left}< and >{right}<"
            ))),
            _ => {
                let names: Vec<&str> = candidates.iter().map(|c| c.name.as_str()).collect();
                Err(Error::schema(format!(
                    "ambiguous junction between >{left}< and >{right}<: candidates are >{}<; \
                     configure an explicit junction",
                    names.join(",")
                )))
            }
        }
    }

    fn junction_override(&self, left: &str, right: &str) -> Option<&str> {
        self.junction_overrides
            .get(&(left.to_string(), right.to_string()))
            .or_else(|| {
                self.junction_overrides
                    .get(&(right.to_string(), left.to_string()))
            })
            .map(String::as_str)
    }

    /// Collections holding exactly the two foreign keys expected of a
    /// junction: one into `left`, one into `right`.
    fn junction_candidates(&self, left: &str, right: &str) -> Vec<&Collection> {
        self.collections
            .values()
            .filter(|c| c.name != left && c.name != right)
            .filter(|c| c.reference_to(left).is_some() && c.reference_to(right).is_some())
            .filter(|c| c.referencing_attributes().count() == 2)
            .collect()
    }
}
