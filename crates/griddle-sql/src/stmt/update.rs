use super::WriteColumn;

/// A compiled update. Assignment placeholders come first, in assignment
/// order; the identity placeholder is always the last bound parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub schema: String,
    pub collection: String,
    pub assignments: Vec<WriteColumn>,
    pub identity: WriteColumn,
}
