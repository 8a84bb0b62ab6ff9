mod delete;
pub use delete::Delete;

mod insert;
pub use insert::Insert;

mod select;
pub use select::{GeoJson, Output, Projection, Select};

mod update;
pub use update::Update;

use griddle_core::stmt::SqlType;

/// A compilable SQL statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(Select),
    Insert(Insert),
    Update(Update),
    Delete(Delete),
}

/// A column written by an insert or update. The declared type selects the
/// placeholder wrapper (`to_json(..)`, `ST_GeomFromText(..)`, or a bare
/// placeholder).
#[derive(Debug, Clone, PartialEq)]
pub struct WriteColumn {
    pub name: String,
    pub ty: SqlType,
}

impl WriteColumn {
    pub fn new(name: impl Into<String>, ty: SqlType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

impl From<Select> for Statement {
    fn from(value: Select) -> Self {
        Statement::Select(value)
    }
}

impl From<Insert> for Statement {
    fn from(value: Insert) -> Self {
        Statement::Insert(value)
    }
}

impl From<Update> for Statement {
    fn from(value: Update) -> Self {
        Statement::Update(value)
    }
}

impl From<Delete> for Statement {
    fn from(value: Delete) -> Self {
        Statement::Delete(value)
    }
}
