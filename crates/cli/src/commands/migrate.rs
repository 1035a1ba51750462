//! Schema setup.
//!
//! Runs the same idempotent DDL the server applies lazily, so it is safe to
//! run repeatedly.

use xmas_events_server::db::PgInstallationStore;

use super::{CommandError, connect};

/// Create the `shops` table if missing.
pub async fn run() -> Result<(), CommandError> {
    let store = PgInstallationStore::new(connect().await?);

    tracing::info!("Creating schema...");
    store.ensure_schema().await?;

    tracing::info!("Schema ready");
    Ok(())
}
