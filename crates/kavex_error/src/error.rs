//! Top-level error wrapper types.

use crate::{AuthError, ConfigError, DeliveryError, DirectoryError, ProtocolError, StoreError};

/// Every error condition a Kavex crate can surface.
///
/// # Examples
///
/// ```
/// use kavex_error::{KavexError, ConfigError};
///
/// let err: KavexError = ConfigError::new("bad port").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum KavexErrorKind {
    /// Malformed inbound frame
    #[from(ProtocolError)]
    Protocol(ProtocolError),
    /// Authentication failure
    #[from(AuthError)]
    Auth(AuthError),
    /// Directory lookup failure
    #[from(DirectoryError)]
    Directory(DirectoryError),
    /// Outbound delivery failure
    #[from(DeliveryError)]
    Delivery(DeliveryError),
    /// Persistence failure
    #[from(StoreError)]
    Store(StoreError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Kavex error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Kavex Error: {}", _0)]
pub struct KavexError(Box<KavexErrorKind>);

impl KavexError {
    /// Create a new error from a kind.
    pub fn new(kind: KavexErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &KavexErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to KavexErrorKind
impl<T> From<T> for KavexError
where
    T: Into<KavexErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Kavex operations.
pub type KavexResult<T> = std::result::Result<T, KavexError>;
