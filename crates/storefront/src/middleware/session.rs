//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. Guest carts and
//! wishlists live in the session, so its expiry is also the guest lists'
//! lifetime.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore, service::SignedCookie};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::{ConfigError, StorefrontConfig};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "ms_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the `PostgreSQL` session store and bring its schema up to date.
///
/// # Errors
///
/// Returns an error if the session table migration fails.
pub async fn create_session_store(pool: &PgPool) -> Result<PostgresStore, sqlx::Error> {
    let store = PostgresStore::new(pool.clone());
    store.migrate().await?;
    Ok(store)
}

/// Create the session layer over `store`.
///
/// Session cookies are signed with the key derived from the configured
/// session secret; a tampered cookie starts a fresh session.
///
/// # Arguments
///
/// * `store` - Session store (`PostgresStore` in production)
/// * `config` - Storefront configuration (for cookie security and signing)
///
/// # Errors
///
/// Returns an error if the session secret cannot form a signing key.
pub fn create_session_layer<S: SessionStore + Clone>(
    store: S,
    config: &StorefrontConfig,
) -> Result<SessionManagerLayer<S, SignedCookie>, ConfigError> {
    // Determine if we're in production (HTTPS)
    let is_secure = config.base_url.starts_with("https://");
    let key = config.session_key()?;

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key))
}
