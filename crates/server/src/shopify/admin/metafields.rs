//! Shop metafield reads and writes.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;

use crate::models::Installation;

use super::{AdminClient, queries};
use crate::shopify::AdminShopifyError;

/// A `userErrors` entry returned by `metafieldsSet`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetafieldUserError {
    /// Path to the offending input field.
    #[serde(default)]
    pub field: Option<Vec<String>>,
    /// Human-readable message.
    pub message: String,
    /// Machine-readable error code.
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Deserialize)]
struct ShopMetafieldData {
    shop: ShopMetafieldShop,
}

#[derive(Deserialize)]
struct ShopMetafieldShop {
    metafield: Option<MetafieldValue>,
}

#[derive(Deserialize)]
struct MetafieldValue {
    value: String,
}

#[derive(Deserialize)]
struct ShopIdData {
    shop: Option<ShopIdShop>,
}

#[derive(Deserialize)]
struct ShopIdShop {
    id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetafieldsSetData {
    metafields_set: Option<MetafieldsSetPayload>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetafieldsSetPayload {
    #[serde(default)]
    user_errors: Vec<MetafieldUserError>,
}

impl AdminClient {
    /// Read the raw value of a shop metafield, if set.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, installation), fields(shop = %installation.shop))]
    pub async fn get_shop_metafield(
        &self,
        installation: &Installation,
        namespace: &str,
        key: &str,
    ) -> Result<Option<String>, AdminShopifyError> {
        let data: ShopMetafieldData = self
            .execute(
                installation,
                queries::SHOP_METAFIELD,
                json!({ "namespace": namespace, "key": key }),
            )
            .await?;

        Ok(data.shop.metafield.map(|m| m.value))
    }

    /// Resolve the shop's GID.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::NotFound` if Shopify returns no ID.
    #[instrument(skip(self, installation), fields(shop = %installation.shop))]
    pub async fn shop_id(&self, installation: &Installation) -> Result<String, AdminShopifyError> {
        let data: ShopIdData = self
            .execute(installation, queries::SHOP_ID, json!({}))
            .await?;

        data.shop
            .and_then(|s| s.id)
            .ok_or_else(|| AdminShopifyError::NotFound("shop id".to_string()))
    }

    /// Write a shop metafield.
    ///
    /// Returns the mutation's `userErrors`; an empty list means the value
    /// was saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, installation, value), fields(shop = %installation.shop))]
    pub async fn set_shop_metafield(
        &self,
        installation: &Installation,
        owner_id: &str,
        namespace: &str,
        key: &str,
        metafield_type: &str,
        value: &str,
    ) -> Result<Vec<MetafieldUserError>, AdminShopifyError> {
        let variables = json!({
            "metafields": [{
                "ownerId": owner_id,
                "namespace": namespace,
                "key": key,
                "type": metafield_type,
                "value": value,
            }]
        });

        let data: MetafieldsSetData = self
            .execute(installation, queries::METAFIELDS_SET, variables)
            .await?;

        Ok(data
            .metafields_set
            .map(|payload| payload.user_errors)
            .unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::super::tests::{GRAPHQL_PATH, client, installation};

    #[tokio::test]
    async fn test_get_shop_metafield() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GRAPHQL_PATH))
            .and(body_partial_json(json!({
                "variables": { "namespace": "custom", "key": "ticket_pricing" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "shop": { "metafield": { "value": "{\"currency\":\"eur\"}" } } }
            })))
            .mount(&server)
            .await;

        let value = client(&server)
            .get_shop_metafield(&installation(), "custom", "ticket_pricing")
            .await
            .unwrap();
        assert_eq!(value.as_deref(), Some("{\"currency\":\"eur\"}"));
    }

    #[tokio::test]
    async fn test_get_shop_metafield_unset() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "shop": { "metafield": null } }
            })))
            .mount(&server)
            .await;

        let value = client(&server)
            .get_shop_metafield(&installation(), "custom", "holidays")
            .await
            .unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_set_shop_metafield_returns_user_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "variables": { "metafields": [{
                    "ownerId": "gid://shopify/Shop/1",
                    "namespace": "custom",
                    "key": "ticket_pricing",
                    "type": "json",
                }] }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "metafieldsSet": {
                    "metafields": [],
                    "userErrors": [{ "field": ["metafields", "0", "value"], "message": "Value is invalid", "code": "INVALID_VALUE" }]
                } }
            })))
            .mount(&server)
            .await;

        let errors = client(&server)
            .set_shop_metafield(
                &installation(),
                "gid://shopify/Shop/1",
                "custom",
                "ticket_pricing",
                "json",
                "{}",
            )
            .await
            .unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "Value is invalid");
        assert_eq!(errors[0].code.as_deref(), Some("INVALID_VALUE"));
    }

    #[tokio::test]
    async fn test_shop_id_missing_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "shop": null } })))
            .mount(&server)
            .await;

        let err = client(&server).shop_id(&installation()).await.unwrap_err();
        assert_eq!(err.to_string(), "Not found: shop id");
    }
}
