//! Integration tests for the OAuth install flow.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::collections::HashMap;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use secrecy::ExposeSecret;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};
use xmas_events_core::ShopDomain;
use xmas_events_integration_tests::{
    APP_URL, CLIENT_ID, CLIENT_SECRET, SCOPES, SHOP, TestContext, query_string, signed_params,
};
use xmas_events_server::db::InstallationStore;

const STATE: &str = "0123456789abcdef0123456789abcdef";

fn callback_params(state: &str) -> Vec<(String, String)> {
    signed_params(&[
        ("code", "auth-code"),
        ("shop", SHOP),
        ("state", state),
        ("timestamp", "1700000000"),
        ("host", "YWRtaW4uc2hvcGlmeS5jb20vc3RvcmUvc2luZmxvcmE"),
    ])
}

async fn callback(
    ctx: &TestContext,
    path: &str,
    params: &[(String, String)],
    cookie: Option<&str>,
) -> xmas_events_integration_tests::TestResponse {
    let mut request = Request::get(format!("{path}?{}", query_string(params)));
    if let Some(state) = cookie {
        request = request.header(header::COOKIE, format!("other=1; xmas_state={state}"));
    }
    ctx.send(request.body(Body::empty()).unwrap()).await
}

async fn mock_exchange(ctx: &TestContext, response: ResponseTemplate, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .and(body_json(json!({
            "client_id": CLIENT_ID,
            "client_secret": CLIENT_SECRET,
            "code": "auth-code",
        })))
        .respond_with(response)
        .expect(expected_calls)
        .mount(&ctx.shopify)
        .await;
}

fn assert_state_cleared(response: &xmas_events_integration_tests::TestResponse) {
    let cookie = response.header("set-cookie").unwrap();
    assert!(cookie.starts_with("xmas_state=;"), "{cookie}");
    assert!(cookie.contains("Max-Age=0"), "{cookie}");
}

fn granted(token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "access_token": token, "scope": "read_products" }))
}

// ============================================================================
// Authorize Start
// ============================================================================

#[tokio::test]
async fn test_start_redirects_with_state_cookie() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/authorize-start?shop=Foo.myshopify.com").await;
    assert_eq!(response.status, StatusCode::FOUND);

    let location = url::Url::parse(response.header("location").unwrap()).unwrap();
    assert_eq!(location.host_str(), Some("foo.myshopify.com"));
    assert_eq!(location.path(), "/admin/oauth/authorize");

    let query: HashMap<_, _> = location.query_pairs().into_owned().collect();
    assert_eq!(query["client_id"], CLIENT_ID);
    assert_eq!(query["scope"], SCOPES);
    assert_eq!(query["redirect_uri"], format!("{APP_URL}/api/auth/callback"));

    let state = &query["state"];
    assert_eq!(state.len(), 32);
    assert!(state.chars().all(|c| c.is_ascii_hexdigit()));

    let cookie = response.header("set-cookie").unwrap();
    assert!(cookie.starts_with(&format!("xmas_state={state}")));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Secure"));
    assert!(cookie.contains("SameSite=None"));
    assert!(cookie.contains("Max-Age=600"));
}

#[tokio::test]
async fn test_start_primary_path() {
    let ctx = TestContext::new().await;
    let response = ctx.get("/api/auth/start?shop=foo.myshopify.com").await;
    assert_eq!(response.status, StatusCode::FOUND);
}

#[tokio::test]
async fn test_start_rejects_invalid_shop() {
    let ctx = TestContext::new().await;

    for uri in [
        "/api/auth/start",
        "/api/auth/start?shop=",
        "/api/auth/start?shop=foo_bar.myshopify.com",
        "/api/auth/start?shop=foo.myshopify.com.evil.com",
    ] {
        let response = ctx.get(uri).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(response.header("set-cookie").is_none());
        assert!(response.text().contains("Parametro shop mancante o non valido"));
    }
}

// ============================================================================
// Callback
// ============================================================================

#[tokio::test]
async fn test_callback_installs_shop_and_clears_cookie() {
    let ctx = TestContext::new().await;
    mock_exchange(&ctx, granted("shpat_first"), 1).await;

    let response = callback(&ctx, "/api/auth/callback", &callback_params(STATE), Some(STATE)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.header("content-type").unwrap().starts_with("text/html"));
    assert!(response.text().contains(SHOP));
    assert_state_cleared(&response);

    let stored = ctx
        .store
        .find(&ShopDomain::parse(SHOP).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.access_token.expose_secret(), "shpat_first");
    assert_eq!(stored.scope, "read_products");
}

#[tokio::test]
async fn test_callback_alias_path() {
    let ctx = TestContext::new().await;
    mock_exchange(&ctx, granted("shpat_first"), 1).await;

    let response = callback(&ctx, "/authorize-callback", &callback_params(STATE), Some(STATE)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_reinstall_overwrites_token() {
    let ctx = TestContext::new().await;
    ctx.install(SHOP, "shpat_old").await;
    mock_exchange(&ctx, granted("shpat_new"), 1).await;

    let response = callback(&ctx, "/api/auth/callback", &callback_params(STATE), Some(STATE)).await;
    assert_eq!(response.status, StatusCode::OK);

    let all = ctx.store.list().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].access_token.expose_secret(), "shpat_new");
}

#[tokio::test]
async fn test_callback_without_cookie_is_invalid_state() {
    let ctx = TestContext::new().await;
    mock_exchange(&ctx, granted("shpat_first"), 0).await;

    let response = callback(&ctx, "/api/auth/callback", &callback_params(STATE), None).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.text().contains("State non valido"));
    assert_state_cleared(&response);
    assert!(ctx.store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_callback_with_other_state_is_invalid_state() {
    let ctx = TestContext::new().await;
    mock_exchange(&ctx, granted("shpat_first"), 0).await;

    let response = callback(
        &ctx,
        "/api/auth/callback",
        &callback_params(STATE),
        Some("ffffffffffffffffffffffffffffffff"),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_callback_with_bad_hmac() {
    let ctx = TestContext::new().await;
    mock_exchange(&ctx, granted("shpat_first"), 0).await;

    let mut params = callback_params(STATE);
    let code = params.iter_mut().find(|(k, _)| k == "code").unwrap();
    code.1 = "forged-code".to_string();

    let response = callback(&ctx, "/api/auth/callback", &params, Some(STATE)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.text().contains("HMAC non valido"));
    assert_state_cleared(&response);
}

#[tokio::test]
async fn test_callback_missing_code() {
    let ctx = TestContext::new().await;
    let params = signed_params(&[("shop", SHOP), ("state", STATE)]);

    let response = callback(&ctx, "/api/auth/callback", &params, Some(STATE)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.text().contains("Parametri mancanti"));
}

#[tokio::test]
async fn test_callback_exchange_failure_shows_status() {
    let ctx = TestContext::new().await;
    mock_exchange(&ctx, ResponseTemplate::new(400), 1).await;

    let response = callback(&ctx, "/api/auth/callback", &callback_params(STATE), Some(STATE)).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.text().contains("Errore token 400"));
    assert_state_cleared(&response);
    assert!(ctx.store.list().await.unwrap().is_empty());
}

// ============================================================================
// Full Round Trip
// ============================================================================

#[tokio::test]
async fn test_start_then_callback() {
    let ctx = TestContext::new().await;
    mock_exchange(&ctx, granted("shpat_roundtrip"), 1).await;

    let start = ctx.get(&format!("/api/auth/start?shop={SHOP}")).await;
    let location = url::Url::parse(start.header("location").unwrap()).unwrap();
    let state = location
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap();

    let response = callback(&ctx, "/api/auth/callback", &callback_params(&state), Some(&state)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(ctx.store.list().await.unwrap().len(), 1);
}
