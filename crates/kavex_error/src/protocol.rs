//! Wire protocol error types.

/// Protocol error conditions for inbound frames.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ProtocolErrorKind {
    /// Frame was not a parseable JSON object
    #[display("Malformed JSON frame: {}", _0)]
    MalformedJson(String),
    /// Frame had no string `op` discriminator
    #[display("Frame is missing the op discriminator")]
    MissingDiscriminator,
    /// Known discriminator with a payload that failed validation
    #[display("Invalid '{}' payload: {}", op, reason)]
    InvalidPayload {
        /// Discriminator value
        op: String,
        /// Validation failure
        reason: String,
    },
}

impl ProtocolErrorKind {
    /// Short machine-readable code sent back in `error` frames.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedJson(_) => "bad_json",
            Self::MissingDiscriminator => "missing_op",
            Self::InvalidPayload { .. } => "bad_payload",
        }
    }
}

/// Protocol error with source location tracking.
///
/// # Examples
///
/// ```
/// use kavex_error::{ProtocolError, ProtocolErrorKind};
///
/// let err = ProtocolError::new(ProtocolErrorKind::MissingDiscriminator);
/// assert_eq!(err.kind.code(), "missing_op");
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Protocol Error: {} at line {} in {}", kind, line, file)]
pub struct ProtocolError {
    /// The kind of error that occurred
    pub kind: ProtocolErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ProtocolError {
    /// Create a new ProtocolError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ProtocolErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
