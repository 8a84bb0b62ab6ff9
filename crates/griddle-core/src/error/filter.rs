use super::Error;

/// Error when a filter expression cannot be parsed or typed.
///
/// Raised for malformed wire grammar, unknown opcodes, wrong operand counts,
/// operands that cannot be coerced to the attribute's declared type, and
/// dotted references to collections outside the active join scope. The
/// request fails with a client-error status.
#[derive(Debug)]
pub(super) struct FilterError {
    message: Box<str>,
}

impl std::error::Error for FilterError {}

impl core::fmt::Display for FilterError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid filter: {}", self.message)
    }
}

impl Error {
    /// Creates a filter parse error.
    pub fn filter(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Filter(FilterError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a filter parse error.
    pub fn is_filter(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Filter(_))
    }
}
