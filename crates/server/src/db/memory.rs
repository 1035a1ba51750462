//! In-memory installation store for tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use secrecy::SecretString;
use tokio::sync::RwLock;
use xmas_events_core::ShopDomain;

use super::{InstallationStore, RepositoryError};
use crate::models::Installation;

/// Installation store holding records in a map.
#[derive(Default)]
pub struct MemoryInstallationStore {
    shops: RwLock<HashMap<ShopDomain, Installation>>,
}

impl MemoryInstallationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn oldest_first(installations: &mut [Installation]) {
    installations.sort_by(|a, b| {
        a.installed_at
            .cmp(&b.installed_at)
            .then_with(|| a.shop.cmp(&b.shop))
    });
}

#[async_trait]
impl InstallationStore for MemoryInstallationStore {
    async fn upsert(
        &self,
        shop: &ShopDomain,
        access_token: &str,
        scope: &str,
    ) -> Result<Installation, RepositoryError> {
        let installation = Installation {
            shop: shop.clone(),
            access_token: SecretString::from(access_token),
            scope: scope.to_string(),
            installed_at: Utc::now(),
        };
        self.shops
            .write()
            .await
            .insert(shop.clone(), installation.clone());
        Ok(installation)
    }

    async fn find(&self, shop: &ShopDomain) -> Result<Option<Installation>, RepositoryError> {
        Ok(self.shops.read().await.get(shop).cloned())
    }

    async fn first(&self) -> Result<Option<Installation>, RepositoryError> {
        Ok(self.list().await?.into_iter().next())
    }

    async fn list(&self) -> Result<Vec<Installation>, RepositoryError> {
        let mut installations: Vec<_> = self.shops.read().await.values().cloned().collect();
        oldest_first(&mut installations);
        Ok(installations)
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
