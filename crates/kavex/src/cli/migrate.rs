//! `migrate` command handler.

use crate::BridgeConfig;
use kavex_database::{establish_connection, run_migrations};
use kavex_error::KavexResult;
use tracing::info;

/// Apply pending migrations, returning how many ran.
pub fn run_migrate(config: &BridgeConfig) -> KavexResult<usize> {
    let mut conn = establish_connection(config.require_database_url()?)?;
    let applied = run_migrations(&mut conn)?;
    info!(applied, "Database migrations applied");
    Ok(applied)
}
