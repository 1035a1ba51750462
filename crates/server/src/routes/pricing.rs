//! Ticket pricing stored in the `custom.ticket_pricing` shop metafield.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{Method, header},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tracing::instrument;
use xmas_events_core::PricingConfig;

use crate::error::AppError;
use crate::state::AppState;

use super::resolve_installation;

const NAMESPACE: &str = "custom";
const KEY: &str = "ticket_pricing";
const METAFIELD_TYPE: &str = "json";

/// Storefront caching for GET responses.
pub const PRICING_CACHE_CONTROL: &str = "public, s-maxage=300, stale-while-revalidate=600";

pub fn router() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/pricing", get(get_pricing).put(put_pricing))
        .layer(cors)
}

#[derive(Debug, Deserialize)]
struct ShopParams {
    shop: Option<String>,
}

/// GET /api/pricing - Normalized pricing for the shop.
#[instrument(skip(state))]
async fn get_pricing(
    State(state): State<AppState>,
    Query(params): Query<ShopParams>,
) -> Result<impl IntoResponse, AppError> {
    let installation = resolve_installation(&state, params.shop.as_deref()).await?;

    let raw = state
        .shopify()
        .get_shop_metafield(&installation, NAMESPACE, KEY)
        .await?;
    let pricing = PricingConfig::from_metafield(raw.as_deref());

    Ok(([(header::CACHE_CONTROL, PRICING_CACHE_CONTROL)], Json(pricing)))
}

/// PUT /api/pricing - Normalize the body and save it to the metafield.
#[instrument(skip(state, body))]
async fn put_pricing(
    State(state): State<AppState>,
    Query(params): Query<ShopParams>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let body: Value = serde_json::from_slice(&body)
        .ok()
        .filter(Value::is_object)
        .ok_or_else(|| AppError::BadRequest("Invalid JSON body".to_string()))?;
    let pricing = PricingConfig::normalize(&body);

    let installation = resolve_installation(&state, params.shop.as_deref()).await?;
    let shopify = state.shopify();
    let owner_id = shopify.shop_id(&installation).await?;

    let value = serde_json::to_string(&pricing).map_err(|e| AppError::Internal(e.to_string()))?;
    let user_errors = shopify
        .set_shop_metafield(&installation, &owner_id, NAMESPACE, KEY, METAFIELD_TYPE, &value)
        .await?;

    if let Some(first) = user_errors.first() {
        tracing::warn!(error = %first.message, "Pricing rejected by Shopify");
        return Err(AppError::UserErrors {
            message: first.message.clone(),
            details: user_errors,
        });
    }

    tracing::info!(shop = %installation.shop, "Pricing saved");
    Ok(Json(json!({ "ok": true, "pricing": pricing })))
}
