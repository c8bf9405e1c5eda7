//! Database connection utilities.

use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use kavex_error::{StoreError, StoreErrorKind};
use kavex_interface::StoreResult;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Establish a connection to the PostgreSQL database at `database_url`.
///
/// # Errors
///
/// Returns a connection error if the URL is empty or the server refuses the
/// connection.
pub fn establish_connection(database_url: &str) -> StoreResult<PgConnection> {
    if database_url.trim().is_empty() {
        return Err(StoreError::new(StoreErrorKind::Connection(
            "database URL is empty".to_string(),
        )));
    }
    PgConnection::establish(database_url).map_err(StoreError::from)
}

/// Run pending migrations, returning how many were applied.
pub fn run_migrations(conn: &mut PgConnection) -> StoreResult<usize> {
    conn.run_pending_migrations(MIGRATIONS)
        .map(|applied| applied.len())
        .map_err(|e| StoreError::new(StoreErrorKind::Migration(e.to_string())))
}
