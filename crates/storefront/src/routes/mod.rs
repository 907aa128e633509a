//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (session database)
//!
//! # Guest cart (JSON, guests only)
//! GET  /cart                   - Cart snapshot (revision + lines)
//! POST /cart/add               - Add a line, merging same-variant lines
//! POST /cart/remove            - Remove or decrement lines
//! POST /cart/clear             - Empty the cart
//! GET  /cart/count             - Total units (badge)
//! GET  /cart/totals            - Backend-computed totals
//!
//! # Guest wishlist (JSON, guests only)
//! GET  /wishlist               - Wishlist snapshot
//! POST /wishlist/add           - Add a line
//! POST /wishlist/remove        - Remove or decrement lines
//! POST /wishlist/clear         - Empty the wishlist
//! GET  /wishlist/count         - Total units
//!
//! # Auth (rate limited)
//! POST /auth/login             - Sign in and merge guest lists
//! POST /auth/logout            - Sign out
//!
//! # Account (requires auth)
//! GET  /account                - Current customer
//! POST /account/merge-guest    - Retry merging leftover guest lines
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod guest;
pub mod health;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
        .route("/totals", get(cart::totals))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/add", post(wishlist::add))
        .route("/remove", post(wishlist::remove))
        .route("/clear", post(wishlist::clear))
        .route("/count", get(wishlist::count))
}

/// Create the auth routes router.
///
/// With `rate_limit`, every route is limited per client IP.
pub fn auth_routes(rate_limit: bool) -> Router<AppState> {
    let router = Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout));

    if rate_limit {
        router.layer(auth_rate_limiter())
    } else {
        router
    }
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/merge-guest", post(account::merge_guest))
}

/// Create all routes for the storefront.
pub fn routes(rate_limit: bool) -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/auth", auth_routes(rate_limit))
        .nest("/account", account_routes())
}
