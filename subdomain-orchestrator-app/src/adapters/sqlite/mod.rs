//! SQLite-backed subdomain store using `SeaORM`.

pub(crate) mod entity;
mod migration;
mod subdomain_repo;

use std::path::Path;

use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use subdomain_orchestrator_core::error::{CoreError, CoreResult};

use migration::Migrator;

/// `SubdomainRepository` over a local `SQLite` database file.
///
/// Timestamps are stored as RFC 3339 strings. Uniqueness of live names is
/// enforced by the database, so concurrent claims of one name cannot both win.
pub struct SqliteSubdomainStore {
    /// Shared `SeaORM` database connection.
    pub(crate) db: DatabaseConnection,
}

impl SqliteSubdomainStore {
    /// Open (or create) the database at `db_path` and bring its schema up to date.
    ///
    /// # Errors
    /// Returns `CoreError::StorageError` if directory creation, database
    /// connection, or schema migration fails.
    pub async fn new(db_path: &Path) -> CoreResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::StorageError(format!("Failed to create directory: {e}")))?;
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let db = Database::connect(&db_url)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to connect to SQLite: {e}")))?;

        let store = Self { db };

        Migrator::up(&store.db, None)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to run migrations: {e}")))?;

        log::info!("Subdomain store ready at {}", db_path.display());
        Ok(store)
    }
}
