//! # Database Migration Management
//!
//! The SQL files under `migrations/` are embedded into the binary at build time
//! and applied in filename order.

use crate::errors::Result;
use crate::storage::DbPool;
use sqlx::migrate::Migrator;
use tracing::info;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run all pending database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    info!(available = MIGRATOR.iter().count(), "Running database migrations");
    MIGRATOR.run(pool).await?;
    info!("Database migrations complete");
    Ok(())
}
