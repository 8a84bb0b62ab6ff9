use super::WriteColumn;

/// A compiled delete targeting the collection's first identity column with
/// an `IN` list of `id_count` typed placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub schema: String,
    pub collection: String,
    pub identity: WriteColumn,
    pub id_count: usize,
}
