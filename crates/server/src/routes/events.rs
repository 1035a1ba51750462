//! Event availability feed.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use xmas_events_core::{EventDay, Month};

use crate::error::AppError;
use crate::services::events::{build_feed, parse_holidays};
use crate::state::AppState;

use super::resolve_installation;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/events-feed", get(events_feed))
}

#[derive(Debug, Deserialize)]
struct FeedParams {
    month: Option<String>,
    shop: Option<String>,
}

#[derive(Debug, Serialize)]
struct FeedResponse {
    month: Month,
    events: Vec<EventDay>,
}

/// GET /api/events-feed?month=YYYY-MM - Event days of a month.
#[instrument(skip(state))]
async fn events_feed(
    State(state): State<AppState>,
    Query(params): Query<FeedParams>,
) -> Result<impl IntoResponse, AppError> {
    let month = match params.month.as_deref().filter(|m| !m.is_empty()) {
        Some(raw) => Month::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))?,
        None => Month::of(chrono::Utc::now().date_naive()),
    };

    let installation = resolve_installation(&state, params.shop.as_deref()).await?;
    let shopify = state.shopify();

    let holidays = shopify
        .get_shop_metafield(&installation, "custom", "holidays")
        .await?;
    let holidays = parse_holidays(holidays.as_deref());

    let products = shopify
        .event_products(&installation, &state.config().events_query)
        .await?;
    let events = build_feed(&products, &holidays, month);

    tracing::debug!(month = %month, days = events.len(), "Built event feed");
    Ok((
        [(header::CACHE_CONTROL, "no-store")],
        Json(FeedResponse { month, events }),
    ))
}
