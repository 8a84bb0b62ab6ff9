mod attribute;
pub use attribute::{Attribute, GeometryInfo, Reference};

mod catalog;
pub use catalog::Catalog;

mod collection;
pub use collection::Collection;

mod relation;
pub use relation::{JoinKey, JoinNode, JoinTree, Junction, Link, Relationship, MAX_JOIN_DEPTH};
