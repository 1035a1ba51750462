//! Installation persistence.
//!
//! # Tables
//!
//! - `shops` - One row per installed shop (domain, offline access token, scope)
//!
//! # Schema
//!
//! The table is created lazily by [`PgInstallationStore`] before its first
//! statement, or explicitly via:
//! ```bash
//! cargo run -p xmas-events-cli -- migrate
//! ```

mod installations;
mod memory;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use xmas_events_core::ShopDomain;

use crate::models::Installation;

pub use installations::{PgInstallationStore, SCHEMA_SQL};
pub use memory::MemoryInstallationStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Storage for Shopify app installations.
///
/// At most one record exists per shop; re-installing overwrites the token,
/// scope and timestamp.
#[async_trait]
pub trait InstallationStore: Send + Sync {
    /// Insert or overwrite the installation for `shop`.
    async fn upsert(
        &self,
        shop: &ShopDomain,
        access_token: &str,
        scope: &str,
    ) -> Result<Installation, RepositoryError>;

    /// Look up the installation for `shop`.
    async fn find(&self, shop: &ShopDomain) -> Result<Option<Installation>, RepositoryError>;

    /// The earliest installation, if any.
    async fn first(&self) -> Result<Option<Installation>, RepositoryError>;

    /// All installations, oldest first.
    async fn list(&self) -> Result<Vec<Installation>, RepositoryError>;

    /// Verify the backing storage is reachable.
    async fn health_check(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
