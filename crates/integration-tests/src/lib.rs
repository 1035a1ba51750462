//! Integration tests for Xmas Events.
//!
//! Tests drive the full router in-process with `tower::ServiceExt::oneshot`,
//! backed by the in-memory installation store. Every outbound Shopify call
//! (token exchange and Admin GraphQL) goes to a `wiremock` server through the
//! origin override.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p xmas-events-integration-tests
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;
use xmas_events_core::ShopDomain;
use xmas_events_server::config::{AppConfig, ShopifyAppConfig};
use xmas_events_server::db::{InstallationStore, MemoryInstallationStore};
use xmas_events_server::shopify::oauth::hmac::{compute_signature, signing_message};
use xmas_events_server::state::AppState;

/// Client secret the test app signs callbacks with.
pub const CLIENT_SECRET: &str = "8f3b2a9c1d4e7f60a5b8c3d2e1f09a7b";
/// Client ID of the test app.
pub const CLIENT_ID: &str = "test-client-id";
/// Public URL of the test app.
pub const APP_URL: &str = "https://xmas.example.com";
/// Scopes requested at install time.
pub const SCOPES: &str = "read_products,write_products";
/// Shop used by most tests.
pub const SHOP: &str = "sinflora.myshopify.com";
/// Admin GraphQL path for the configured API version.
pub const GRAPHQL_PATH: &str = "/admin/api/2024-07/graphql.json";

/// In-process app with a mocked Shopify.
pub struct TestContext {
    /// Router under test.
    pub app: Router,
    /// Mock for every Shopify endpoint.
    pub shopify: MockServer,
    /// Store shared with the router.
    pub store: Arc<MemoryInstallationStore>,
}

/// A buffered response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Body as UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    /// First value of `name` as a string, if present.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestContext {
    /// Build the app against a fresh mock server and empty store.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    pub async fn new() -> Self {
        let shopify = MockServer::start().await;
        let store = Arc::new(MemoryInstallationStore::new());

        let config = AppConfig {
            database_url: SecretString::from("postgres://unused"),
            host: "127.0.0.1".parse().expect("valid IP"),
            port: 0,
            app_url: APP_URL.to_string(),
            shopify: ShopifyAppConfig {
                client_id: CLIENT_ID.to_string(),
                client_secret: SecretString::from(CLIENT_SECRET),
                scopes: SCOPES.to_string(),
                api_version: "2024-07".to_string(),
                origin_override: Some(shopify.uri()),
                http_timeout: Duration::from_secs(5),
            },
            events_query: "tag:evento".to_string(),
            json_logs: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        let state = AppState::new(config, store.clone()).expect("HTTP client builds");

        Self {
            app: xmas_events_server::app(state),
            shopify,
            store,
        }
    }

    /// Record an installation directly in the store.
    ///
    /// # Panics
    ///
    /// Panics if `shop` is not a valid domain.
    pub async fn install(&self, shop: &str, access_token: &str) {
        let shop = ShopDomain::parse(shop).expect("valid shop domain");
        self.store
            .upsert(&shop, access_token, SCOPES)
            .await
            .expect("memory store never fails");
    }

    /// Send a request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the router or body fails, which the router never does.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("body collects")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// GET `uri`.
    ///
    /// # Panics
    ///
    /// Panics if `uri` is invalid.
    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::get(uri)
            .body(Body::empty())
            .expect("valid request");
        self.send(request).await
    }
}

/// Append a valid `hmac` for `pairs` signed with [`CLIENT_SECRET`].
#[must_use]
pub fn signed_params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    let (message, _) = signing_message(&params);
    params.push(("hmac".to_string(), compute_signature(&message, CLIENT_SECRET)));
    params
}

/// Encode parameters as a query string.
#[must_use]
pub fn query_string(params: &[(String, String)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (k, v) in params {
        serializer.append_pair(k, v);
    }
    serializer.finish()
}
