use super::WriteColumn;

/// A compiled insert. Placeholders are assigned in column order, one per
/// column.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub schema: String,
    pub collection: String,
    pub columns: Vec<WriteColumn>,
}
