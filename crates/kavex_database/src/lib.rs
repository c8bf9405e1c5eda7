//! Persistence for the Kavex bridge.
//!
//! Two [`BridgeStore`](kavex_interface::BridgeStore) implementations live here:
//!
//! - [`PostgresBridgeStore`] - Diesel over a shared PostgreSQL connection, with
//!   embedded migrations
//! - [`InMemoryBridgeStore`] - a volatile store for tests and local runs
//!
//! # Example
//!
//! ```rust,ignore
//! use kavex_database::{establish_connection, run_migrations, PostgresBridgeStore};
//!
//! let mut conn = establish_connection("postgres://localhost/kavex")?;
//! run_migrations(&mut conn)?;
//! let store = PostgresBridgeStore::new(conn);
//! ```

mod connection;
mod memory;
mod models;
mod postgres;

pub mod schema;

pub use connection::{establish_connection, run_migrations};
pub use memory::InMemoryBridgeStore;
pub use models::{
    AccountLinkRow, GuildSettingsRow, LinkRow, LinkTokenRow, PermissionRow, SinkRow,
};
pub use postgres::PostgresBridgeStore;
