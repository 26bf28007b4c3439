use std::fmt;

/// Category of a target error. Lets the engine decide whether a target
/// should be skipped for this call or the failure is permanent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid target configuration (bad URI, unknown scheme).
    Config,
    /// Connection or query failure.
    Io,
    /// Stored data could not be decoded.
    Format,
    /// The target did not answer within the per-call timeout.
    Timeout,
    /// Anything else (invalid state, generic).
    Logic,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Config => f.write_str("config"),
            ErrorKind::Io => f.write_str("io"),
            ErrorKind::Format => f.write_str("format"),
            ErrorKind::Timeout => f.write_str("timeout"),
            ErrorKind::Logic => f.write_str("logic"),
        }
    }
}

/// Error returned by every [`TargetStore`](crate::TargetStore) and
/// [`TargetConnector`](crate::TargetConnector) method.
#[derive(Debug, Clone)]
pub struct StoreError {
    pub kind: ErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Config, message: msg.into() }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Io, message: msg.into() }
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Format, message: msg.into() }
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Timeout, message: msg.into() }
    }

    pub fn logic(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Logic, message: msg.into() }
    }

    /// Add context to the error, preserving the original ErrorKind.
    ///
    /// Produces: `"context: original message"`.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }

    /// Io and Timeout failures may succeed on a later call.
    pub fn is_transient(&self) -> bool {
        matches!(self.kind, ErrorKind::Io | ErrorKind::Timeout)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for StoreError {}

// ---------------------------------------------------------------------------
// From impls: standard error types → StoreError with correct ErrorKind
// ---------------------------------------------------------------------------

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::io(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::format(e.to_string())
    }
}
