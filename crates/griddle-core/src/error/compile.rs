use super::Error;

/// Error when a statement cannot be compiled or prepared.
///
/// Carries the offending SQL so server-side diagnostics can reproduce the
/// failure; surfaced to callers as a server error.
#[derive(Debug)]
pub(super) struct CompileError {
    message: Box<str>,
    sql: Option<Box<str>>,
}

impl std::error::Error for CompileError {}

impl core::fmt::Display for CompileError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "compile error: {}", self.message)?;
        if let Some(ref sql) = self.sql {
            write!(f, "; sql={sql}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Creates a statement compilation error.
    pub fn compile(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Compile(CompileError {
            message: message.into().into(),
            sql: None,
        }))
    }

    /// Creates a statement compilation error carrying the offending SQL.
    pub fn compile_sql(message: impl Into<String>, sql: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::Compile(CompileError {
            message: message.into().into(),
            sql: Some(sql.into().into()),
        }))
    }

    /// Returns `true` if this error is a compilation error.
    pub fn is_compile(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::Compile(_))
    }
}
