//! Shopify Admin API GraphQL client.
//!
//! One client serves every installed shop: each call takes the
//! [`Installation`] whose domain and access token it should use.

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::instrument;

use crate::config::ShopifyAppConfig;
use crate::models::Installation;

use super::oauth::shop_origin;
use super::{AdminShopifyError, GraphQLError};

mod metafields;
mod products;
pub mod queries;

pub use metafields::MetafieldUserError;
pub use products::{EventProduct, EventVariant};

/// Page size used when walking connections.
const PAGE_SIZE: i64 = 50;

/// Upper bound on pages fetched for a single connection.
pub const MAX_PAGES: usize = 25;

/// Shopify Admin API GraphQL client.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    http: reqwest::Client,
    api_version: String,
    origin_override: Option<String>,
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
}

/// Cursor pagination info of a connection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Whether another page follows.
    pub has_next_page: bool,
    /// Cursor of the last node on this page.
    pub end_cursor: Option<String>,
}

/// A connection page using the `nodes` shorthand.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    /// Nodes on this page.
    pub nodes: Vec<T>,
    /// Pagination info.
    #[serde(default)]
    pub page_info: PageInfo,
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// # Arguments
    ///
    /// * `config` - Shopify app configuration (API version, origin override)
    /// * `http` - Shared HTTP client (carries the request timeout)
    #[must_use]
    pub fn new(config: &ShopifyAppConfig, http: reqwest::Client) -> Self {
        Self {
            inner: Arc::new(AdminClientInner {
                http,
                api_version: config.api_version.clone(),
                origin_override: config.origin_override.clone(),
            }),
        }
    }

    // =========================================================================
    // GraphQL Execution
    // =========================================================================

    /// Execute a GraphQL query against `installation`'s shop.
    ///
    /// # Errors
    ///
    /// - `RateLimited` on 429 (`Retry-After` seconds, default 60)
    /// - `Unauthorized` on 401
    /// - `Status` on any other non-success status
    /// - `GraphQL` if the response carries errors or no data
    #[instrument(skip(self, installation, query, variables), fields(shop = %installation.shop))]
    pub async fn execute<T: DeserializeOwned>(
        &self,
        installation: &Installation,
        query: &str,
        variables: Value,
    ) -> Result<T, AdminShopifyError> {
        let endpoint = format!(
            "{}/admin/api/{}/graphql.json",
            shop_origin(self.inner.origin_override.as_deref(), &installation.shop),
            self.inner.api_version
        );

        let response = self
            .inner
            .http
            .post(&endpoint)
            .header("X-Shopify-Access-Token", installation.access_token.expose_secret())
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        // Check for rate limiting
        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(AdminShopifyError::RateLimited(retry_after));
        }

        // Check for unauthorized
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AdminShopifyError::Unauthorized(
                "Invalid or revoked access token".to_string(),
            ));
        }

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AdminShopifyError::Status(status.as_u16(), text));
        }

        let body = response.bytes().await?;
        let graphql_response: GraphQLResponse<T> = serde_json::from_slice(&body)?;

        // Check for GraphQL errors
        if let Some(errors) = graphql_response.errors
            && !errors.is_empty()
        {
            let converted_errors: Vec<GraphQLError> = errors
                .into_iter()
                .map(|e| GraphQLError::message(e.message))
                .collect();
            return Err(AdminShopifyError::GraphQL(converted_errors));
        }

        graphql_response
            .data
            .ok_or_else(|| AdminShopifyError::GraphQL(vec![GraphQLError::message("No data in response")]))
    }

    /// Walk a cursor-paginated connection.
    ///
    /// `variables` is sent with `first` and `after` filled in for each page;
    /// `extract` pulls the connection out of a page's data. Stops when
    /// `hasNextPage` is false or after [`MAX_PAGES`] pages.
    ///
    /// # Errors
    ///
    /// Returns the first error any page produces.
    pub async fn paginate<D, T, F>(
        &self,
        installation: &Installation,
        query: &str,
        variables: Value,
        extract: F,
    ) -> Result<Vec<T>, AdminShopifyError>
    where
        D: DeserializeOwned,
        F: Fn(D) -> Connection<T>,
    {
        let mut items = Vec::new();
        let mut after: Option<String> = None;

        for page in 1..=MAX_PAGES {
            let mut vars = variables.clone();
            if let Value::Object(map) = &mut vars {
                map.insert("first".to_string(), json!(PAGE_SIZE));
                map.insert("after".to_string(), json!(after));
            }

            let data: D = self.execute(installation, query, vars).await?;
            let connection = extract(data);
            items.extend(connection.nodes);

            match connection.page_info {
                PageInfo {
                    has_next_page: true,
                    end_cursor: Some(cursor),
                } => after = Some(cursor),
                _ => return Ok(items),
            }

            if page == MAX_PAGES {
                tracing::warn!(pages = MAX_PAGES, "Pagination cap reached, results truncated");
            }
        }

        Ok(items)
    }
}
