use super::Error;

/// Error when a collection, attribute, or relationship cannot be resolved.
///
/// This covers missing collections (including collections that introspect to
/// zero attributes), unknown attributes on the write path when nothing
/// remains to write, and join chains whose cardinality cannot be classified.
/// Schema errors are fatal for the request.
#[derive(Debug)]
pub(super) struct SchemaError {
    message: Box<str>,
}

impl std::error::Error for SchemaError {}

impl core::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "schema error: {}", self.message)
    }
}

impl Error {
    /// Creates a schema resolution error.
    pub fn schema(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Schema(SchemaError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a schema resolution error.
    pub fn is_schema(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Schema(_))
    }
}
