//! Calendar file download.

use axum::{
    Router,
    extract::Query,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use crate::services::calendar::{
    CalendarEvent, DEFAULT_TITLE, event_uid, parse_duration, parse_start,
};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/ics", get(ics))
}

#[derive(Debug, Deserialize)]
struct IcsParams {
    title: Option<String>,
    date: Option<String>,
    time: Option<String>,
    duration: Option<String>,
    location: Option<String>,
    desc: Option<String>,
    uid: Option<String>,
}

/// GET /api/ics - Download a single event as `evento.ics`.
#[instrument]
async fn ics(Query(params): Query<IcsParams>) -> Response {
    let Ok(start) = parse_start(
        params.date.as_deref().unwrap_or_default(),
        params.time.as_deref().unwrap_or_default(),
    ) else {
        return (
            StatusCode::BAD_REQUEST,
            "Bad Request: use date=YYYY-MM-DD&time=HH:MM",
        )
            .into_response();
    };

    let event = CalendarEvent {
        uid: event_uid(params.uid.as_deref()),
        title: params
            .title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        start,
        duration: parse_duration(params.duration.as_deref()),
        location: params.location.unwrap_or_default(),
        description: params.desc.unwrap_or_default(),
    };

    let body = event.to_ics(chrono::Local::now().naive_local());

    (
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"evento.ics\""),
        ],
        body,
    )
        .into_response()
}
