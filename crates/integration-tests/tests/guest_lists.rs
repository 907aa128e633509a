//! Integration tests for the guest cart and wishlist.
//!
//! Run with: cargo test -p marketstall-integration-tests

use reqwest::StatusCode;
use serde_json::{Value, json};

use marketstall_integration_tests::TestContext;

fn no_variant() -> Value {
    json!({})
}

// ============================================================================
// Adding
// ============================================================================

#[tokio::test]
async fn test_new_session_starts_empty() {
    let ctx = TestContext::new().await;

    let (status, cart) = ctx.get("/cart").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["revision"], 0);
    assert_eq!(cart["lines"], json!([]));
    assert_eq!(cart["totalQuantity"], 0);

    let (status, count) = ctx.get("/wishlist/count").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count["count"], 0);
}

#[tokio::test]
async fn test_same_variant_merges_into_one_line() {
    let ctx = TestContext::new().await;
    let variant = json!({"size": "M", "color": "red"});

    ctx.add("cart", "P1", 2, &variant).await;
    let body = ctx.add("cart", "P1", 3, &variant).await;

    assert_eq!(body["line"]["quantity"], 5);
    assert_eq!(body["list"]["lines"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["list"]["totalQuantity"], 5);
    assert_eq!(body["list"]["revision"], 2);
}

#[tokio::test]
async fn test_different_variants_stay_separate() {
    let ctx = TestContext::new().await;

    ctx.add("cart", "P1", 1, &json!({"size": "S"})).await;
    ctx.add("cart", "P1", 1, &json!({"size": "L"})).await;
    ctx.add("cart", "P1", 1, &no_variant()).await;

    let (_, cart) = ctx.get("/cart").await;
    assert_eq!(cart["lines"].as_array().map(Vec::len), Some(3));

    let (_, count) = ctx.get("/cart/count").await;
    assert_eq!(count["count"], 3);
}

#[tokio::test]
async fn test_blank_selector_matches_missing_selector() {
    let ctx = TestContext::new().await;

    ctx.add("cart", "P1", 1, &json!({"color": "  "})).await;
    let body = ctx.add("cart", "P1", 1, &no_variant()).await;

    assert_eq!(body["list"]["lines"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["line"]["quantity"], 2);
}

#[tokio::test]
async fn test_cart_and_wishlist_are_independent() {
    let ctx = TestContext::new().await;

    ctx.add("cart", "P1", 2, &no_variant()).await;
    ctx.add("wishlist", "P2", 1, &no_variant()).await;

    let (_, cart) = ctx.get("/cart").await;
    let (_, wishlist) = ctx.get("/wishlist").await;
    assert_eq!(cart["lines"][0]["itemId"], "P1");
    assert_eq!(wishlist["lines"][0]["itemId"], "P2");
    assert_eq!(wishlist["totalQuantity"], 1);
}

#[tokio::test]
async fn test_separate_clients_do_not_share_lists() {
    let first = TestContext::new().await;
    first.add("cart", "P1", 1, &no_variant()).await;

    let (_, cart) = first.get("/cart").await;
    assert_eq!(cart["totalQuantity"], 1);

    // Same server, fresh cookie jar
    let stranger = reqwest::Client::new();
    let resp = stranger
        .get(format!("{}/cart", first.base_url))
        .send()
        .await
        .expect("GET request failed");
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["totalQuantity"], 0);
}

/// Fetch the cart with an explicit `ms_session` cookie and no cookie jar.
async fn cart_with_cookie(base_url: &str, cookie: &str) -> Value {
    reqwest::Client::new()
        .get(format!("{base_url}/cart"))
        .header("cookie", format!("ms_session={cookie}"))
        .send()
        .await
        .expect("GET request failed")
        .json()
        .await
        .expect("Invalid JSON")
}

#[tokio::test]
async fn test_session_cookie_must_carry_its_signature() {
    let ctx = TestContext::new().await;
    let resp = reqwest::Client::new()
        .post(format!("{}/cart/add", ctx.base_url))
        .json(&json!({"itemId": "P1", "kind": "product", "quantity": 2}))
        .send()
        .await
        .expect("POST request failed");
    let set_cookie = resp
        .headers()
        .get("set-cookie")
        .and_then(|value| value.to_str().ok())
        .expect("No session cookie")
        .to_string();
    let signed = set_cookie
        .strip_prefix("ms_session=")
        .and_then(|rest| rest.split(';').next())
        .expect("Unexpected cookie")
        .to_string();

    let cart = cart_with_cookie(&ctx.base_url, &signed).await;
    assert_eq!(cart["totalQuantity"], 2);

    // The bare session id without its 44-character HMAC prefix
    let bare_id = signed.get(44..).expect("Cookie shorter than its signature");
    let cart = cart_with_cookie(&ctx.base_url, bare_id).await;
    assert_eq!(cart["totalQuantity"], 0);
}

#[tokio::test]
async fn test_invalid_adds_are_rejected() {
    let ctx = TestContext::new().await;

    for body in [
        json!({"itemId": "P1", "kind": "product", "quantity": 0}),
        json!({"itemId": "P1", "kind": "product", "quantity": -2}),
        json!({"itemId": "   ", "kind": "product"}),
    ] {
        let (status, json) = ctx.post("/cart/add", &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {body}");
        assert!(json["error"].is_string());
    }

    let (_, cart) = ctx.get("/cart").await;
    assert_eq!(cart["revision"], 0);
}

// ============================================================================
// Removing
// ============================================================================

#[tokio::test]
async fn test_remove_with_count_decrements() {
    let ctx = TestContext::new().await;
    ctx.add("cart", "P1", 5, &no_variant()).await;

    let (status, body) = ctx
        .post(
            "/cart/remove",
            &json!({"itemId": "P1", "kind": "product", "count": 2}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["decremented"], 1);
    assert_eq!(body["removed"], 0);
    assert_eq!(body["list"]["totalQuantity"], 3);
}

#[tokio::test]
async fn test_remove_count_at_or_above_quantity_drops_line() {
    let ctx = TestContext::new().await;
    ctx.add("cart", "P1", 2, &no_variant()).await;

    let (_, body) = ctx
        .post(
            "/cart/remove",
            &json!({"itemId": "P1", "kind": "product", "count": 9}),
        )
        .await;

    assert_eq!(body["removed"], 1);
    assert_eq!(body["list"]["lines"], json!([]));
}

#[tokio::test]
async fn test_remove_without_variant_drops_every_variant() {
    let ctx = TestContext::new().await;
    ctx.add("wishlist", "P1", 1, &json!({"size": "S"})).await;
    ctx.add("wishlist", "P1", 1, &json!({"size": "M"})).await;
    ctx.add("wishlist", "P2", 1, &no_variant()).await;

    let (_, body) = ctx
        .post("/wishlist/remove", &json!({"itemId": "P1", "kind": "product"}))
        .await;

    assert_eq!(body["removed"], 2);
    assert_eq!(body["list"]["lines"][0]["itemId"], "P2");
}

#[tokio::test]
async fn test_remove_with_variant_only_touches_that_variant() {
    let ctx = TestContext::new().await;
    ctx.add("cart", "P1", 1, &json!({"size": "S"})).await;
    ctx.add("cart", "P1", 1, &json!({"size": "M"})).await;

    let (_, body) = ctx
        .post(
            "/cart/remove",
            &json!({"itemId": "P1", "kind": "product", "variant": {"size": "M"}}),
        )
        .await;

    assert_eq!(body["removed"], 1);
    assert_eq!(body["list"]["lines"][0]["selectors"]["size"], "S");
}

#[tokio::test]
async fn test_remove_missing_item_is_noop() {
    let ctx = TestContext::new().await;
    ctx.add("cart", "P1", 1, &no_variant()).await;

    let (status, body) = ctx
        .post("/cart/remove", &json!({"itemId": "NOPE", "kind": "product"}))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 0);
    assert_eq!(body["list"]["revision"], 1);
}

#[tokio::test]
async fn test_remove_rejects_non_positive_count() {
    let ctx = TestContext::new().await;
    ctx.add("cart", "P1", 3, &no_variant()).await;

    for count in [0, -1] {
        let (status, _) = ctx
            .post(
                "/cart/remove",
                &json!({"itemId": "P1", "kind": "product", "count": count}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (_, count) = ctx.get("/cart/count").await;
    assert_eq!(count["count"], 3);
}

// ============================================================================
// Clearing, Concurrency, Limits
// ============================================================================

#[tokio::test]
async fn test_clear_empties_only_that_list() {
    let ctx = TestContext::new().await;
    ctx.add("cart", "P1", 1, &no_variant()).await;
    ctx.add("wishlist", "P2", 1, &no_variant()).await;

    let (status, _) = ctx.post("/cart/clear", &json!({})).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, cart) = ctx.get("/cart").await;
    let (_, wishlist) = ctx.get("/wishlist").await;
    assert_eq!(cart["lines"], json!([]));
    assert_eq!(wishlist["totalQuantity"], 1);
}

#[tokio::test]
async fn test_stale_revision_is_a_conflict() {
    let ctx = TestContext::new().await;
    let first = ctx.add("cart", "P1", 1, &no_variant()).await;
    let revision = first["list"]["revision"].clone();

    // Another tab writes in between
    ctx.add("cart", "P2", 1, &no_variant()).await;

    let (status, body) = ctx
        .post(
            "/cart/add",
            &json!({"itemId": "P3", "kind": "product", "expectedRevision": revision}),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["expectedRevision"], 1);
    assert_eq!(body["actualRevision"], 2);

    let (_, cart) = ctx.get("/cart").await;
    assert_eq!(cart["lines"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_matching_revision_is_accepted() {
    let ctx = TestContext::new().await;
    ctx.add("cart", "P1", 1, &no_variant()).await;

    let (status, body) = ctx
        .post(
            "/cart/add",
            &json!({"itemId": "P2", "kind": "product", "expectedRevision": 1}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["list"]["revision"], 2);
}

#[tokio::test]
async fn test_quota_exceeded_leaves_list_unchanged() {
    let ctx = TestContext::with_quota(256).await;
    ctx.add("cart", "P1", 1, &no_variant()).await;

    let long_id = "X".repeat(120);
    let (status, body) = ctx
        .post("/cart/add", &json!({"itemId": long_id, "kind": "product"}))
        .await;

    assert_eq!(status, StatusCode::INSUFFICIENT_STORAGE);
    assert!(body["error"].is_string());

    let (_, cart) = ctx.get("/cart").await;
    assert_eq!(cart["revision"], 1);
    assert_eq!(cart["totalQuantity"], 1);
}

// ============================================================================
// Totals
// ============================================================================

#[tokio::test]
async fn test_empty_cart_totals_skip_backend() {
    let ctx = TestContext::new().await;

    let (status, totals) = ctx.get("/cart/totals").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(totals["total"]["amount"], "0");
    assert_eq!(ctx.backend.totals_calls(), 0);
}

#[tokio::test]
async fn test_cart_totals_come_from_backend() {
    let ctx = TestContext::new().await;
    ctx.add("cart", "P1", 3, &no_variant()).await;

    let (status, totals) = ctx.get("/cart/totals").await;
    let (_, again) = ctx.get("/cart/totals").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(totals["subtotal"]["amount"], "3.00");
    assert_eq!(again, totals);
    assert_eq!(ctx.backend.totals_calls(), 1);
}

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await;
    let resp = ctx
        .client
        .get(format!("{}/health", ctx.base_url))
        .send()
        .await
        .expect("GET request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
}
