//! Error types for the Kavex bridge.
//!
//! This crate provides the error taxonomy shared by every Kavex crate.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! | Error | Raised when | Handling |
//! |---|---|---|
//! | [`ProtocolError`] | an inbound frame cannot be decoded | logged, error frame sent, socket stays open |
//! | [`AuthError`] | a token is missing or a socket is unauthenticated | failure frame, no state change |
//! | [`DirectoryError`] | the guild directory cannot answer | permission cache fallback |
//! | [`DeliveryError`] | an outbound post or socket write fails | logged per recipient |
//! | [`StoreError`] | a persistence operation fails | aborts only the triggering operation |
//!
//! # Examples
//!
//! ```
//! use kavex_error::{KavexResult, ConfigError};
//!
//! fn load() -> KavexResult<String> {
//!     Err(ConfigError::new("DISCORD_TOKEN not set"))?
//! }
//!
//! assert!(load().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod config;
mod delivery;
mod directory;
mod error;
mod protocol;
mod store;

pub use auth::{AuthError, AuthErrorKind};
pub use config::ConfigError;
pub use delivery::{DeliveryError, DeliveryErrorKind};
pub use directory::{DirectoryError, DirectoryErrorKind};
pub use error::{KavexError, KavexErrorKind, KavexResult};
pub use protocol::{ProtocolError, ProtocolErrorKind};
pub use store::{StoreError, StoreErrorKind};
