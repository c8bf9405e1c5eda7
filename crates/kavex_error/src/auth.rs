//! Authentication error types.

/// Authentication failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum AuthErrorKind {
    /// Auth frame carried an empty or missing token
    #[display("missing token")]
    MissingToken,
    /// Non-auth frame received before a successful auth
    #[display("not authenticated")]
    NotAuthenticated,
}

impl AuthErrorKind {
    /// Short machine-readable code sent back to the plugin.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing token",
            Self::NotAuthenticated => "not_authenticated",
        }
    }
}

/// Authentication error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Auth Error: {} at line {} in {}", kind, line, file)]
pub struct AuthError {
    /// The kind of error that occurred
    pub kind: AuthErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl AuthError {
    /// Create a new AuthError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: AuthErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
