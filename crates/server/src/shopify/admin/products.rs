//! Event products and their time-slot variants.

use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::models::Installation;
use crate::shopify::AdminShopifyError;

use super::{AdminClient, Connection, queries};

/// A product representing one event day.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventProduct {
    /// Product handle.
    pub handle: String,
    /// Raw `custom.event_date` metafield value.
    #[serde(default, deserialize_with = "metafield_value")]
    pub event_date: Option<String>,
    /// Time-slot variants.
    #[serde(deserialize_with = "nodes")]
    pub variants: Vec<EventVariant>,
}

/// A product variant representing one time slot.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventVariant {
    /// Variant GID, e.g. `gid://shopify/ProductVariant/123`.
    pub id: String,
    /// Variant title (the slot's start time).
    pub title: String,
    /// Whether Shopify allows the variant to be sold.
    #[serde(default)]
    pub available_for_sale: bool,
    /// Tracked inventory; absent when untracked or not readable.
    #[serde(default)]
    pub inventory_quantity: Option<i64>,
}

#[derive(Deserialize)]
struct ValueNode {
    value: String,
}

#[derive(Deserialize)]
struct Nodes<T> {
    nodes: Vec<T>,
}

fn metafield_value<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<ValueNode>::deserialize(deserializer)?.map(|node| node.value))
}

fn nodes<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Nodes::<T>::deserialize(deserializer)?.nodes)
}

#[derive(Deserialize)]
struct EventProductsData {
    products: Connection<EventProduct>,
}

impl AdminClient {
    /// Fetch every product matching `search`, walking all pages.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    #[instrument(skip(self, installation), fields(shop = %installation.shop))]
    pub async fn event_products(
        &self,
        installation: &Installation,
        search: &str,
    ) -> Result<Vec<EventProduct>, AdminShopifyError> {
        let products = self
            .paginate(
                installation,
                queries::EVENT_PRODUCTS,
                json!({ "query": search }),
                |data: EventProductsData| data.products,
            )
            .await?;

        tracing::debug!(count = products.len(), "Fetched event products");
        Ok(products)
    }
}
