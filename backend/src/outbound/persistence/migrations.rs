//! Embedded catalog migrations applied at startup.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while bringing the catalog schema up to date.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// The catalog database could not be reached.
    #[error("failed to connect to catalog database: {message}")]
    Connection { message: String },
    /// A migration failed to apply.
    #[error("failed to apply catalog migrations: {message}")]
    Apply { message: String },
}

/// Apply every pending catalog migration, returning how many ran.
///
/// Blocking; call from `spawn_blocking` inside an async runtime.
///
/// # Errors
///
/// [`MigrationError`] when the database is unreachable or a migration fails.
pub fn run_migrations(database_url: &str) -> Result<usize, MigrationError> {
    let mut conn =
        PgConnection::establish(database_url).map_err(|err| MigrationError::Connection {
            message: err.to_string(),
        })?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Apply {
            message: err.to_string(),
        })?;
    for version in &applied {
        info!(%version, "applied catalog migration");
    }
    Ok(applied.len())
}
