//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::InstallationStore;
use crate::shopify::{AdminClient, OAuthClient};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    store: Arc<dyn InstallationStore>,
    oauth: OAuthClient,
    admin: AdminClient,
}

impl AppState {
    /// Build state with Shopify clients sharing one HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be built.
    pub fn new(config: AppConfig, store: Arc<dyn InstallationStore>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.shopify.http_timeout)
            .user_agent(concat!("xmas-events/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let oauth = OAuthClient::new(&config.shopify, &config.app_url, http.clone());
        let admin = AdminClient::new(&config.shopify, http);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                oauth,
                admin,
            }),
        })
    }

    /// Server configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Installation store.
    #[must_use]
    pub fn store(&self) -> &dyn InstallationStore {
        self.inner.store.as_ref()
    }

    /// OAuth client for the install flow.
    #[must_use]
    pub fn oauth(&self) -> &OAuthClient {
        &self.inner.oauth
    }

    /// Admin GraphQL client.
    #[must_use]
    pub fn shopify(&self) -> &AdminClient {
        &self.inner.admin
    }
}
