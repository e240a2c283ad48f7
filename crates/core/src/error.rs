use thiserror::Error;

/// Errors raised when reading a typed value from a port.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    /// A required port is absent, null, or an empty string.
    #[error("missing required input '{0}'")]
    Missing(String),

    /// The port holds a value of the wrong kind.
    #[error("input '{port}' must be {expected}")]
    TypeMismatch {
        port: String,
        expected: &'static str,
    },
}
