//! CLI subcommands.

pub mod migrate;
pub mod shops;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;
use xmas_events_server::db::RepositoryError;

/// Errors shared by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

/// Connect using `XMAS_DATABASE_URL`, falling back to `DATABASE_URL`.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("XMAS_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar("XMAS_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(xmas_events_server::db::create_pool(&SecretString::from(database_url)).await?)
}
