//! Shopify app install routes.
//!
//! `start` sends the merchant to Shopify's authorize page and remembers the
//! issued state in the `xmas_state` cookie; `callback` completes the install.

use askama::Template;
use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use cookie::{Cookie, SameSite, time::Duration};
use serde::Deserialize;
use tracing::instrument;
use xmas_events_core::ShopDomain;

use crate::services::{InstallError, complete_installation};
use crate::state::AppState;

/// Cookie carrying the OAuth state between start and callback.
pub const STATE_COOKIE: &str = "xmas_state";

/// Lifetime of the state cookie.
const STATE_COOKIE_MAX_AGE_SECS: i64 = 600;

// =============================================================================
// Templates
// =============================================================================

/// Install confirmation page.
#[derive(Template)]
#[template(path = "auth/installed.html")]
struct InstalledTemplate<'a> {
    shop: &'a str,
}

/// Install failure page.
#[derive(Template)]
#[template(path = "auth/error.html")]
struct ErrorTemplate {
    heading: String,
    detail: Option<String>,
}

fn render(template: &impl Template) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

fn error_page(status: StatusCode, heading: impl Into<String>, detail: Option<String>) -> Response {
    let template = ErrorTemplate {
        heading: heading.into(),
        detail,
    };
    (status, render(&template)).into_response()
}

/// Build the install router.
///
/// The short paths are the ones registered in older app configurations.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/start", get(start))
        .route("/authorize-start", get(start))
        .route("/api/auth/callback", get(callback))
        .route("/authorize-callback", get(callback))
}

// =============================================================================
// Cookies
// =============================================================================

fn state_cookie(state: String) -> Cookie<'static> {
    Cookie::build((STATE_COOKIE, state))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
        .max_age(Duration::seconds(STATE_COOKIE_MAX_AGE_SECS))
        .build()
}

fn cleared_state_cookie() -> Cookie<'static> {
    Cookie::build((STATE_COOKIE, ""))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::None)
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Value of cookie `name` from the request's `Cookie` headers.
fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

// =============================================================================
// Route Handlers
// =============================================================================

#[derive(Debug, Deserialize)]
struct StartParams {
    shop: Option<String>,
}

/// GET /api/auth/start - Redirect the merchant to Shopify's authorize page.
#[instrument(skip(state))]
async fn start(State(state): State<AppState>, Query(params): Query<StartParams>) -> Response {
    let shop = params.shop.unwrap_or_default().to_lowercase();
    let Ok(shop) = ShopDomain::parse(&shop) else {
        return error_page(
            StatusCode::BAD_REQUEST,
            "Parametro shop mancante o non valido",
            None,
        );
    };

    let request = match state.oauth().authorization_request(&shop) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build authorize URL");
            return error_page(StatusCode::INTERNAL_SERVER_ERROR, "Errore interno", None);
        }
    };

    tracing::info!(shop = %shop, "Redirecting to Shopify authorize page");
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, request.url.to_string()),
            (header::SET_COOKIE, state_cookie(request.state).to_string()),
        ],
    )
        .into_response()
}

/// GET /api/auth/callback - Verify Shopify's redirect and store the installation.
#[instrument(skip_all)]
async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let expected_state = read_cookie(&headers, STATE_COOKIE);

    let response = match complete_installation(
        state.oauth(),
        state.store(),
        &params,
        expected_state.as_deref(),
    )
    .await
    {
        Ok(installation) => render(&InstalledTemplate {
            shop: installation.shop.as_str(),
        })
        .into_response(),
        Err(e) => install_error_response(&e),
    };

    // The state is single-use whatever the outcome.
    ([(header::SET_COOKIE, cleared_state_cookie().to_string())], response).into_response()
}

fn install_error_response(error: &InstallError) -> Response {
    if !error.is_client_error() {
        let event_id = sentry::capture_error(error);
        tracing::error!(error = %error, sentry_event_id = %event_id, "Installation failed");
    }

    match error {
        InstallError::BadRequest => {
            error_page(StatusCode::BAD_REQUEST, "Parametri mancanti", None)
        }
        InstallError::InvalidSignature => {
            error_page(StatusCode::BAD_REQUEST, "HMAC non valido", None)
        }
        InstallError::InvalidState => {
            error_page(StatusCode::BAD_REQUEST, "State non valido", None)
        }
        InstallError::ExchangeFailed { status: Some(code) } => error_page(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Errore token {code}"),
            None,
        ),
        InstallError::ExchangeFailed { status: None } => error_page(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Errore token",
            Some("Shopify non raggiungibile, riprova.".to_string()),
        ),
        InstallError::Storage(_) => error_page(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Errore salvataggio installazione",
            None,
        ),
    }
}
