//! Integration tests for sign-in, the guest list merge and sign-out.
//!
//! Run with: cargo test -p marketstall-integration-tests

#![allow(clippy::indexing_slicing)]

use reqwest::StatusCode;
use serde_json::json;

use marketstall_core::ListKind;
use marketstall_integration_tests::{CUSTOMER_TOKEN, TestContext, VALID_PASSWORD};

// ============================================================================
// Sign-in
// ============================================================================

#[tokio::test]
async fn test_login_merges_both_lists_and_clears_them() {
    let ctx = TestContext::new().await;
    ctx.add("cart", "P1", 2, &json!({"size": "M"})).await;
    ctx.add("cart", "P2", 1, &json!({})).await;
    ctx.add("wishlist", "P3", 1, &json!({})).await;

    let (status, body) = ctx.login(VALID_PASSWORD).await;

    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    assert_eq!(body["customer"]["id"], "cus_1001");
    assert_eq!(body["customer"]["name"], "Test Customer");
    assert_eq!(
        body["merge"]["cart"],
        json!({"status": "synced", "lines": 2, "quantity": 3})
    );
    assert_eq!(
        body["merge"]["wishlist"],
        json!({"status": "synced", "lines": 1, "quantity": 1})
    );

    let carts = ctx.backend.syncs_for(ListKind::Cart);
    assert_eq!(carts.len(), 1);
    assert_eq!(
        carts[0].authorization.as_deref(),
        Some(format!("Bearer {CUSTOMER_TOKEN}").as_str())
    );
    assert_eq!(
        carts[0].payload["items"][0],
        json!({"contentType": "product", "itemId": "P1", "quantity": 2, "sizeId": "M"})
    );

    // Guest copies are gone; the retry has nothing left to send
    let (status, retry) = ctx.post("/account/merge-guest", &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(retry["cart"]["status"], "skipped");
    assert_eq!(retry["wishlist"]["status"], "skipped");
    assert_eq!(ctx.backend.syncs().len(), 2);
}

#[tokio::test]
async fn test_login_with_empty_lists_skips_sync() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.login(VALID_PASSWORD).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["merge"]["cart"]["status"], "skipped");
    assert_eq!(body["merge"]["wishlist"]["status"], "skipped");
    assert!(ctx.backend.syncs().is_empty());
}

#[tokio::test]
async fn test_failed_list_is_kept_for_retry() {
    let ctx = TestContext::new().await;
    ctx.add("cart", "P1", 1, &json!({})).await;
    ctx.add("wishlist", "P2", 4, &json!({})).await;
    ctx.backend.fail_sync(ListKind::Wishlist, true);

    let (status, body) = ctx.login(VALID_PASSWORD).await;

    // Sign-in still succeeds; only the wishlist is reported as failed
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["merge"]["cart"]["status"], "synced");
    assert_eq!(body["merge"]["wishlist"]["status"], "failed");
    assert!(body["merge"]["wishlist"]["reason"].is_string());

    let (status, retry) = ctx.post("/account/merge-guest", &json!({})).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(retry["wishlist"]["status"], "failed");

    ctx.backend.fail_sync(ListKind::Wishlist, false);
    let (status, retry) = ctx.post("/account/merge-guest", &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(retry["cart"]["status"], "skipped");
    assert_eq!(
        retry["wishlist"],
        json!({"status": "synced", "lines": 1, "quantity": 4})
    );

    let wishlists = ctx.backend.syncs_for(ListKind::Wishlist);
    assert_eq!(wishlists.len(), 1);
    assert_eq!(wishlists[0].payload["items"][0]["quantity"], 4);
}

#[tokio::test]
async fn test_invalid_credentials_keep_guest_lists() {
    let ctx = TestContext::new().await;
    ctx.add("cart", "P1", 2, &json!({})).await;

    let (status, body) = ctx.login("wrong password").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
    assert!(ctx.backend.syncs().is_empty());

    let (status, count) = ctx.get("/cart/count").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count["count"], 2);
}

#[tokio::test]
async fn test_login_validates_input() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .post(
            "/auth/login",
            &json!({"email": "not-an-email", "password": VALID_PASSWORD}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .post(
            "/auth/login",
            &json!({"email": "shopper@example.com", "password": ""}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Signed-in Session
// ============================================================================

#[tokio::test]
async fn test_guest_routes_refuse_signed_in_customers() {
    let ctx = TestContext::new().await;
    ctx.login(VALID_PASSWORD).await;

    let (status, _) = ctx.get("/cart").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = ctx
        .post("/wishlist/add", &json!({"itemId": "P1", "kind": "product"}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_account_requires_sign_in() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx.get("/account").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx.post("/account/merge-guest", &json!({})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    ctx.login(VALID_PASSWORD).await;
    let (status, account) = ctx.get("/account").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(account["id"], "cus_1001");
}

#[tokio::test]
async fn test_logout_returns_to_guest() {
    let ctx = TestContext::new().await;
    ctx.backend.fail_sync(ListKind::Cart, true);
    ctx.add("cart", "P1", 1, &json!({})).await;
    ctx.login(VALID_PASSWORD).await;

    let (status, _) = ctx.post("/auth/logout", &json!({})).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx.get("/account").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Leftover guest lines went with the session
    let (status, cart) = ctx.get("/cart").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["totalQuantity"], 0);
}
