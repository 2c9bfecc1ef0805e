//! # Database Migrations
//!
//! Embedded SQL migrations for the catalog.
//!
//! ## How Migrations Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Database::new                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  _sqlx_migrations (created on first run)                               │
//! │       │                                                                 │
//! │       ├── 001_products.sql   ✓ applied                                 │
//! │       └── 00N_next.sql       ⬜ pending → run in order, recorded        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Adding New Migrations
//!
//! 1. Add `migrations/sqlite/NNN_description.sql` with the next number
//! 2. **NEVER** edit an applied migration; the checksum is recorded
//! 3. Keep `products.id` AUTOINCREMENT; barcode allocation reads
//!    `sqlite_sequence`

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Every file under `migrations/sqlite`, embedded at compile time.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies every pending migration, in filename order.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!(available = MIGRATOR.migrations.len(), "Checking for pending migrations");
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// `(embedded, applied)` migration counts.
///
/// A database that was never migrated has no `_sqlx_migrations` table and
/// reports zero applied; any other query failure is returned.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let tracked: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;
    if tracked == 0 {
        return Ok((total, 0));
    }

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;

    Ok((total, applied as usize))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_status_of_unmigrated_database() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();

        let (total, applied) = migration_status(db.pool()).await.unwrap();
        assert_eq!(total, MIGRATOR.migrations.len());
        assert_eq!(applied, 0);
    }

    #[tokio::test]
    async fn test_status_after_migrating() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let (total, applied) = migration_status(db.pool()).await.unwrap();
        assert!(total > 0);
        assert_eq!(applied, total);
    }

    #[tokio::test]
    async fn test_status_reports_query_errors() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        assert!(migration_status(db.pool()).await.is_err());
    }
}
