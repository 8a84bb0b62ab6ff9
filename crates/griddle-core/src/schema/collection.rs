use super::Attribute;

use indexmap::IndexMap;

/// A named relation exposed through the record API.
///
/// Collections are constructed per request from schema introspection and do
/// not outlive the request that produced them. Attribute order follows the
/// catalog's column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Collection {
    /// Name of the table or document collection.
    pub name: String,

    /// The collection's attributes, keyed by name.
    pub attributes: IndexMap<String, Attribute>,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
        }
    }

    /// Adds an attribute, replacing any previous attribute of the same name.
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.insert(attribute.name.clone(), attribute);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Identity attributes in catalog order. The first one is the default
    /// target for update and delete.
    pub fn identity_attributes(&self) -> Vec<&Attribute> {
        self.attributes.values().filter(|a| a.identity).collect()
    }

    pub fn default_identity(&self) -> Option<&Attribute> {
        self.attributes.values().find(|a| a.identity)
    }

    pub fn geometry_attributes(&self) -> Vec<&Attribute> {
        self.attributes
            .values()
            .filter(|a| a.geometry.is_some())
            .collect()
    }

    /// The first attribute holding a foreign key into `other`, if any.
    pub fn reference_to(&self, other: &str) -> Option<&Attribute> {
        self.attributes.values().find(|a| {
            a.reference
                .as_ref()
                .is_some_and(|r| r.collection == other)
        })
    }

    /// Attributes holding foreign keys, in catalog order.
    pub fn referencing_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values().filter(|a| a.reference.is_some())
    }
}
