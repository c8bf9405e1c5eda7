//! Delivery (outbound post / socket write) error types.

/// Delivery failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum DeliveryErrorKind {
    /// Request could not be sent
    #[display("Transport error: {}", _0)]
    Transport(String),
    /// Endpoint answered with a non-success status
    #[display("Endpoint returned {}: {}", status, body)]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (possibly empty)
        body: String,
    },
    /// Target socket or client is closed
    #[display("Delivery target closed")]
    Closed,
}

/// Delivery error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Delivery Error: {} at line {} in {}", kind, line, file)]
pub struct DeliveryError {
    /// The kind of error that occurred
    pub kind: DeliveryErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl DeliveryError {
    /// Create a new DeliveryError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: DeliveryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
