use super::Error;

/// Error when the database driver fails during bind or execute.
///
/// Surfaced as a server error; on the write path an execution error triggers
/// a rollback of the surrounding transaction.
#[derive(Debug)]
pub(super) struct ExecutionError {
    message: Box<str>,
    source: Option<anyhow::Error>,
}

impl ExecutionError {
    pub(super) fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.source {
            Some(source) => Some(source.as_ref()),
            None => None,
        }
    }
}

impl std::error::Error for ExecutionError {}

impl core::fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "execution failed: {}", self.message)
    }
}

impl Error {
    /// Creates a driver execution error.
    pub fn execution(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Execution(ExecutionError {
            message: message.into().into(),
            source: None,
        }))
    }

    /// Creates a driver execution error wrapping the driver's own error.
    pub fn execution_from(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Error {
        Error::from(super::ErrorKind::Execution(ExecutionError {
            message: message.into().into(),
            source: Some(source.into()),
        }))
    }

    /// Returns `true` if this error is a driver execution error.
    pub fn is_execution(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Execution(_))
    }
}
