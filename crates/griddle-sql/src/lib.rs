pub mod serializer;
pub use serializer::{ParamCounter, Params, Placeholder, PlaceholderMap, Serializer};

pub mod stmt;
pub use stmt::Statement;
