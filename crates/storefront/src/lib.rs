//! Marketstall Storefront library.
//!
//! The storefront keeps a guest's cart and wishlist in their server-side
//! session and hands both to the commerce backend when the guest signs in.
//! Everything else (prices, stock, orders) belongs to the backend.
//!
//! This crate provides the storefront as a library so the binary and the
//! integration tests build exactly the same router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod guest;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, extract::Request, middleware::from_fn};
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore, service::SignedCookie};

use state::AppState;

/// Build the complete application router.
///
/// The session store is a parameter so tests can run on
/// `tower_sessions::MemoryStore` while production uses `PostgreSQL`.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S, SignedCookie>) -> Router
where
    S: SessionStore + Clone,
{
    let rate_limit = state.config().rate_limit;

    routes::routes(rate_limit)
        .layer(session_layer)
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
