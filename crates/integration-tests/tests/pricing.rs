//! Integration tests for the pricing endpoints.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, body_string_contains, header as header_eq, method, path};
use wiremock::{Mock, ResponseTemplate};
use xmas_events_integration_tests::{GRAPHQL_PATH, SHOP, TestContext};

async fn mock_pricing_metafield(ctx: &TestContext, value: Option<&str>) {
    let metafield = value.map(|v| json!({ "value": v }));
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("query ShopMetafield"))
        .and(body_partial_json(json!({
            "variables": { "namespace": "custom", "key": "ticket_pricing" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "shop": { "metafield": metafield } }
        })))
        .mount(&ctx.shopify)
        .await;
}

async fn mock_shop_id(ctx: &TestContext) {
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("query ShopId"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "shop": { "id": "gid://shopify/Shop/42" } }
        })))
        .mount(&ctx.shopify)
        .await;
}

async fn mock_metafields_set(ctx: &TestContext, user_errors: Value) {
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(body_string_contains("mutation MetafieldsSet"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "metafieldsSet": {
                    "metafields": [],
                    "userErrors": user_errors,
                }
            }
        })))
        .mount(&ctx.shopify)
        .await;
}

async fn put(ctx: &TestContext, body: &str) -> xmas_events_integration_tests::TestResponse {
    let request = Request::put("/api/pricing")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    ctx.send(request).await
}

// ============================================================================
// GET
// ============================================================================

#[tokio::test]
async fn test_get_returns_normalized_pricing() {
    let ctx = TestContext::new().await;
    ctx.install(SHOP, "shpat_pricing").await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(header_eq("X-Shopify-Access-Token", "shpat_pricing"))
        .and(body_string_contains("query ShopMetafield"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "shop": { "metafield": {
                "value": r#"{"currency":"usd","weekday":{"mode":"single","single":{"price":"12.50"}},"holiday":{"mode":"tiered","tiered":{"Intero":15,"Bambino":8,"VIP":99}}}"#
            } } }
        })))
        .expect(1)
        .mount(&ctx.shopify)
        .await;

    let request = Request::get("/api/pricing")
        .header(header::ORIGIN, "https://sinflora.it")
        .body(Body::empty())
        .unwrap();
    let response = ctx.send(request).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.header("cache-control"),
        Some("public, s-maxage=300, stale-while-revalidate=600")
    );
    assert_eq!(response.header("access-control-allow-origin"), Some("*"));
    assert_eq!(
        response.json(),
        json!({
            "version": 1,
            "currency": "USD",
            "weekday": { "mode": "single", "prices": { "Normale": 12.5 } },
            "holiday": { "mode": "tiered", "prices": { "Bambino": 8, "Intero": 15 } },
        })
    );
}

#[tokio::test]
async fn test_get_without_metafield_returns_defaults() {
    let ctx = TestContext::new().await;
    ctx.install(SHOP, "shpat_pricing").await;
    mock_pricing_metafield(&ctx, None).await;

    let response = ctx.get("/api/pricing").await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["currency"], "EUR");
    assert_eq!(body["weekday"]["mode"], "single");
    assert_eq!(body["holiday"]["prices"]["Normale"], json!(0));
}

#[tokio::test]
async fn test_get_without_installation() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/api/pricing").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json(), json!({ "error": "No installed shop found" }));
}

#[tokio::test]
async fn test_get_for_unknown_shop() {
    let ctx = TestContext::new().await;
    ctx.install(SHOP, "shpat_pricing").await;

    let response = ctx.get("/api/pricing?shop=other.myshopify.com").await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);

    let response = ctx.get("/api/pricing?shop=not%20a%20shop").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_selects_requested_shop() {
    let ctx = TestContext::new().await;
    ctx.install(SHOP, "shpat_first").await;
    ctx.install("second.myshopify.com", "shpat_second").await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(header_eq("X-Shopify-Access-Token", "shpat_second"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "shop": { "metafield": null } }
        })))
        .expect(1)
        .mount(&ctx.shopify)
        .await;

    let response = ctx.get("/api/pricing?shop=Second.myshopify.com").await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_get_shopify_failure_is_bad_gateway() {
    let ctx = TestContext::new().await;
    ctx.install(SHOP, "shpat_pricing").await;

    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&ctx.shopify)
        .await;

    let response = ctx.get("/api/pricing").await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.json(), json!({ "error": "External service error" }));
}

// ============================================================================
// PUT
// ============================================================================

#[tokio::test]
async fn test_put_saves_normalized_pricing() {
    let ctx = TestContext::new().await;
    ctx.install(SHOP, "shpat_pricing").await;
    mock_shop_id(&ctx).await;
    mock_metafields_set(&ctx, json!([])).await;

    let response = put(
        &ctx,
        r#"{"weekday":{"mode":"single","price":10},"holiday":{"mode":"tiered","tiered":{"Intero":"14","Handicap":""}}}"#,
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["ok"], true);
    assert_eq!(body["pricing"]["weekday"]["prices"]["Normale"], json!(10));
    assert_eq!(
        body["pricing"]["holiday"]["prices"],
        json!({ "Handicap": 0, "Intero": 14 })
    );

    let requests = ctx.shopify.received_requests().await.unwrap();
    let mutation = requests
        .iter()
        .map(|r| r.body_json::<Value>().unwrap())
        .find(|b| b["query"].as_str().is_some_and(|q| q.contains("MetafieldsSet")))
        .unwrap();
    let input = &mutation["variables"]["metafields"][0];
    assert_eq!(input["ownerId"], "gid://shopify/Shop/42");
    assert_eq!(input["namespace"], "custom");
    assert_eq!(input["key"], "ticket_pricing");
    assert_eq!(input["type"], "json");

    let saved: Value = serde_json::from_str(input["value"].as_str().unwrap()).unwrap();
    assert_eq!(saved, body["pricing"]);
}

#[tokio::test]
async fn test_put_accepts_normalized_document() {
    let ctx = TestContext::new().await;
    ctx.install(SHOP, "shpat_pricing").await;
    mock_shop_id(&ctx).await;
    mock_metafields_set(&ctx, json!([])).await;

    let document = json!({
        "version": 1,
        "currency": "EUR",
        "weekday": { "mode": "single", "prices": { "Normale": 12 } },
        "holiday": { "mode": "tiered", "prices": { "Bambino": 8, "Intero": 15 } },
    });
    let response = put(&ctx, &document.to_string()).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["pricing"], document);
}

#[tokio::test]
async fn test_put_rejects_non_object_body() {
    let ctx = TestContext::new().await;
    ctx.install(SHOP, "shpat_pricing").await;

    for body in ["", "not json", "[1,2]", "42", "null"] {
        let response = put(&ctx, body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{body:?}");
        assert_eq!(response.json(), json!({ "error": "Invalid JSON body" }));
    }

    assert!(ctx.shopify.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_put_reports_user_errors() {
    let ctx = TestContext::new().await;
    ctx.install(SHOP, "shpat_pricing").await;
    mock_shop_id(&ctx).await;
    mock_metafields_set(
        &ctx,
        json!([{ "field": ["metafields", "0", "value"], "message": "Value is invalid JSON", "code": "INVALID_VALUE" }]),
    )
    .await;

    let response = put(&ctx, "{}").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(body["error"], "Value is invalid JSON");
    assert_eq!(body["details"][0]["code"], "INVALID_VALUE");
}

#[tokio::test]
async fn test_put_without_installation() {
    let ctx = TestContext::new().await;

    let response = put(&ctx, "{}").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json()["error"], "No installed shop found");
}

// ============================================================================
// CORS
// ============================================================================

#[tokio::test]
async fn test_preflight() {
    let ctx = TestContext::new().await;

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/pricing")
        .header(header::ORIGIN, "https://sinflora.it")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let response = ctx.send(request).await;

    assert!(response.status.is_success());
    assert_eq!(response.header("access-control-allow-origin"), Some("*"));
    let methods = response.header("access-control-allow-methods").unwrap();
    assert!(methods.contains("PUT"));
    assert!(methods.contains("GET"));
    assert!(
        response
            .header("access-control-allow-headers")
            .unwrap()
            .contains("content-type")
    );
}
