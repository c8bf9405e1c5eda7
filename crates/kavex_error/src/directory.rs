//! Directory service error types.

/// Directory lookup failure conditions.
///
/// Every variant is treated as "directory unavailable" by callers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum DirectoryErrorKind {
    /// The readiness signal has not fired yet
    #[display("Directory not ready")]
    NotReady,
    /// The directory could not answer
    #[display("Directory unavailable: {}", _0)]
    Unavailable(String),
    /// Upstream HTTP call failed
    #[display("Directory HTTP error: {}", _0)]
    Http(String),
}

/// Directory error with source location tracking.
///
/// # Examples
///
/// ```
/// use kavex_error::{DirectoryError, DirectoryErrorKind};
///
/// let err = DirectoryError::new(DirectoryErrorKind::NotReady);
/// assert!(format!("{}", err).contains("not ready"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Directory Error: {} at line {} in {}", kind, line, file)]
pub struct DirectoryError {
    /// The kind of error that occurred
    pub kind: DirectoryErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl DirectoryError {
    /// Create a new DirectoryError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: DirectoryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
