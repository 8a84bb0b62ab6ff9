mod compile;
mod config;
mod execution;
mod filter;
mod schema;

use compile::CompileError;
use config::ConfigError;
use execution::ExecutionError;
use filter::FilterError;
use schema::SchemaError;

/// An error that can occur while serving a record request.
///
/// Errors are classified by the request phase that produced them: schema
/// resolution, filter parsing, statement compilation, or execution. The
/// classification determines how the failure is surfaced to the caller
/// (client error vs. server error).
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

#[derive(Debug)]
enum ErrorKind {
    /// A collection, attribute, or relationship could not be resolved.
    Schema(SchemaError),

    /// A filter expression is malformed or could not be typed.
    Filter(FilterError),

    /// A statement could not be compiled or prepared.
    Compile(CompileError),

    /// The database driver failed during bind or execute.
    Execution(ExecutionError),

    /// The service configuration is unusable.
    Config(ConfigError),

    /// Foreign errors funneled through `anyhow`.
    Other(anyhow::Error),
}

impl Error {
    fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self { kind }
    }
}

impl From<anyhow::Error> for Error {
    fn from(value: anyhow::Error) -> Self {
        Self {
            kind: ErrorKind::Other(value),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind() {
            ErrorKind::Execution(err) => err.source(),
            ErrorKind::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self.kind() {
            ErrorKind::Schema(err) => core::fmt::Display::fmt(err, f),
            ErrorKind::Filter(err) => core::fmt::Display::fmt(err, f),
            ErrorKind::Compile(err) => core::fmt::Display::fmt(err, f),
            ErrorKind::Execution(err) => core::fmt::Display::fmt(err, f),
            ErrorKind::Config(err) => core::fmt::Display::fmt(err, f),
            ErrorKind::Other(err) => core::fmt::Display::fmt(err, f),
        }
    }
}
