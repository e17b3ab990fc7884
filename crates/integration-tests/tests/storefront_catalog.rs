//! Integration tests for product listing, product detail and collections.

#![allow(clippy::expect_used)]

use iradah_integration_tests::{FakeStorefront, TestContext, product, variant_gid};
use reqwest::StatusCode;
use serde_json::Value;

async fn get_json(ctx: &TestContext, path: &str) -> (StatusCode, Value) {
    let resp = ctx
        .session()
        .get(ctx.url(path))
        .send()
        .await
        .expect("request failed");
    let status = resp.status();
    let body = resp.json().await.expect("response is not JSON");
    (status, body)
}

fn handles(body: &Value) -> Vec<String> {
    body["products"]
        .as_array()
        .expect("products array")
        .iter()
        .map(|p| p["handle"].as_str().expect("handle").to_string())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::with_catalog().await;
    let resp = ctx
        .session()
        .get(ctx.url("/health"))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(resp.text().await.expect("body"), "ok");
}

#[tokio::test]
async fn test_product_listing_featured_keeps_shopify_order() {
    let ctx = TestContext::with_catalog().await;
    let (status, body) = get_json(&ctx, "/products").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sort"], "featured");
    assert_eq!(body["count"], 4);
    assert_eq!(
        handles(&body),
        ["classic-hoodie", "zip-hoodie", "everyday-sweatshirt", "archive-tee"]
    );
}

#[tokio::test]
async fn test_product_listing_sort_orders() {
    let ctx = TestContext::with_catalog().await;

    let (_, body) = get_json(&ctx, "/products?sort=price-low").await;
    assert_eq!(
        handles(&body),
        ["archive-tee", "everyday-sweatshirt", "classic-hoodie", "zip-hoodie"]
    );

    let (_, body) = get_json(&ctx, "/products?sort=price-high").await;
    assert_eq!(
        handles(&body),
        ["zip-hoodie", "classic-hoodie", "everyday-sweatshirt", "archive-tee"]
    );

    let (_, body) = get_json(&ctx, "/products?sort=name").await;
    assert_eq!(
        handles(&body),
        ["archive-tee", "classic-hoodie", "everyday-sweatshirt", "zip-hoodie"]
    );
}

#[tokio::test]
async fn test_product_listing_summary_fields() {
    let ctx = TestContext::with_catalog().await;
    let (_, body) = get_json(&ctx, "/products?limit=2").await;

    assert_eq!(body["count"], 2);
    let hoodie = &body["products"][0];
    assert_eq!(hoodie["title"], "Classic Hoodie");
    assert_eq!(hoodie["price_display"], "PKR 4,500.00");
    assert_eq!(hoodie["sold_out"], false);
    assert_eq!(hoodie["quick_add_variant_id"], variant_gid(101));
}

#[tokio::test]
async fn test_product_listing_rejects_bad_parameters() {
    let ctx = TestContext::with_catalog().await;

    let (status, body) = get_json(&ctx, "/products?sort=random").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("error").contains("random"));

    let (status, _) = get_json(&ctx, "/products?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(&ctx, "/products?limit=251").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_product_detail_default_selection() {
    let ctx = TestContext::with_catalog().await;
    let (status, body) = get_json(&ctx, "/products/classic-hoodie").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["title"], "Classic Hoodie");
    assert_eq!(body["product"]["variants"].as_array().expect("variants").len(), 3);
    assert_eq!(body["selection"]["variant_id"], variant_gid(101));
    assert_eq!(body["selection"]["options"]["Size"], "S");
    assert_eq!(body["available"], true);
    assert_eq!(body["price_display"], "PKR 4,500.00");
}

#[tokio::test]
async fn test_product_detail_sold_out() {
    let ctx = TestContext::with_catalog().await;
    let (status, body) = get_json(&ctx, "/products/archive-tee").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let ctx = TestContext::with_catalog().await;
    let (status, body) = get_json(&ctx, "/products/does-not-exist").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_collection_matches_titles() {
    let ctx = TestContext::with_catalog().await;

    let (status, body) = get_json(&ctx, "/collections/hoodies").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["collection"]["title"], "Hoodies");
    assert_eq!(handles(&body), ["classic-hoodie", "zip-hoodie"]);

    let (_, body) = get_json(&ctx, "/collections/sweatshirts").await;
    assert_eq!(handles(&body), ["everyday-sweatshirt"]);
}

#[tokio::test]
async fn test_collection_without_matches_falls_back_to_first_products() {
    let products = (1..=10)
        .map(|n| product(&format!("tee-{n}"), &format!("Tee {n}"), "1500", &[(n, "M", true)]))
        .collect();
    let ctx = TestContext::start(FakeStorefront::new(products)).await;

    let (status, body) = get_json(&ctx, "/collections/trousers").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 8);
    assert_eq!(handles(&body).first().map(String::as_str), Some("tee-1"));
}

#[tokio::test]
async fn test_unknown_collection_is_not_found() {
    let ctx = TestContext::with_catalog().await;
    let (status, _) = get_json(&ctx, "/collections/hats").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
