use super::Error;

/// Error when the service configuration is unusable, e.g. a malformed
/// connection URL or an invalid hard limit.
#[derive(Debug)]
pub(super) struct ConfigError {
    message: Box<str>,
}

impl std::error::Error for ConfigError {}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid configuration: {}", self.message)
    }
}

impl Error {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Config(ConfigError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Config(_))
    }
}
