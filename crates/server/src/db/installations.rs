//! `PostgreSQL` installation store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use sqlx::PgPool;
use tokio::sync::OnceCell;
use tracing::instrument;
use xmas_events_core::ShopDomain;

use super::{InstallationStore, RepositoryError};
use crate::models::Installation;

/// DDL for the `shops` table. Idempotent.
pub const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS shops (
    shop text PRIMARY KEY,
    access_token text NOT NULL,
    scope text NOT NULL DEFAULT '',
    installed_at timestamptz NOT NULL DEFAULT now()
)
";

/// Internal row type for `PostgreSQL` queries.
#[derive(sqlx::FromRow)]
struct InstallationRow {
    shop: String,
    access_token: String,
    scope: String,
    installed_at: DateTime<Utc>,
}

impl TryFrom<InstallationRow> for Installation {
    type Error = RepositoryError;

    fn try_from(row: InstallationRow) -> Result<Self, Self::Error> {
        let shop = ShopDomain::parse(&row.shop).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid shop {:?}: {e}", row.shop))
        })?;

        Ok(Self {
            shop,
            access_token: SecretString::from(row.access_token),
            scope: row.scope,
            installed_at: row.installed_at,
        })
    }
}

/// Installation store backed by the `shops` table.
///
/// The schema is created once per process, before the first statement.
pub struct PgInstallationStore {
    pool: PgPool,
    schema: OnceCell<()>,
}

impl PgInstallationStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self {
            pool,
            schema: OnceCell::const_new(),
        }
    }

    /// Create the `shops` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the DDL fails.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        self.schema
            .get_or_try_init(|| async {
                sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
                tracing::debug!("shops table ready");
                Ok::<_, RepositoryError>(())
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl InstallationStore for PgInstallationStore {
    #[instrument(skip(self, access_token), fields(shop = %shop))]
    async fn upsert(
        &self,
        shop: &ShopDomain,
        access_token: &str,
        scope: &str,
    ) -> Result<Installation, RepositoryError> {
        self.ensure_schema().await?;

        let row = sqlx::query_as::<_, InstallationRow>(
            r"
            INSERT INTO shops (shop, access_token, scope, installed_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (shop) DO UPDATE SET
                access_token = EXCLUDED.access_token,
                scope = EXCLUDED.scope,
                installed_at = now()
            RETURNING shop, access_token, scope, installed_at
            ",
        )
        .bind(shop.as_str())
        .bind(access_token)
        .bind(scope)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    #[instrument(skip(self), fields(shop = %shop))]
    async fn find(&self, shop: &ShopDomain) -> Result<Option<Installation>, RepositoryError> {
        self.ensure_schema().await?;

        let row = sqlx::query_as::<_, InstallationRow>(
            r"
            SELECT shop, access_token, scope, installed_at
            FROM shops
            WHERE shop = $1
            ",
        )
        .bind(shop.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Installation::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn first(&self) -> Result<Option<Installation>, RepositoryError> {
        self.ensure_schema().await?;

        let row = sqlx::query_as::<_, InstallationRow>(
            r"
            SELECT shop, access_token, scope, installed_at
            FROM shops
            ORDER BY installed_at ASC, shop ASC
            LIMIT 1
            ",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(Installation::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Installation>, RepositoryError> {
        self.ensure_schema().await?;

        let rows = sqlx::query_as::<_, InstallationRow>(
            r"
            SELECT shop, access_token, scope, installed_at
            FROM shops
            ORDER BY installed_at ASC, shop ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Installation::try_from).collect()
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_conversion_rejects_invalid_shop() {
        let row = InstallationRow {
            shop: "not a shop".to_string(),
            access_token: "token".to_string(),
            scope: String::new(),
            installed_at: Utc::now(),
        };
        assert!(matches!(
            Installation::try_from(row),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_schema_is_idempotent_ddl() {
        assert!(SCHEMA_SQL.contains("CREATE TABLE IF NOT EXISTS shops"));
        assert!(SCHEMA_SQL.contains("shop text PRIMARY KEY"));
    }
}
