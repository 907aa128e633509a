//! Authentication extractors and session helpers.
//!
//! Signed-in customers keep their cart and wishlist in the backend; guests
//! keep theirs in the session. `RequireAuth` guards customer routes and
//! `RequireGuest` guards the guest list routes.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{CurrentCustomer, CustomerToken, session_keys};

/// Extractor that requires a signed-in customer.
///
/// Rejects with 401 if nobody is signed in.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(customer): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", customer.email)
/// }
/// ```
#[derive(Debug)]
pub struct RequireAuth(pub CurrentCustomer);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts)?;

        session
            .get::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
            .await?
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("Sign in required".to_string()))
    }
}

/// Extractor that optionally gets the current customer.
///
/// Unlike `RequireAuth`, this does not reject the request if the customer is
/// not signed in. An unreadable session counts as signed out.
#[derive(Debug)]
pub struct OptionalAuth(pub Option<CurrentCustomer>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let customer = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(customer))
    }
}

/// Extractor that requires a guest (nobody signed in).
///
/// Rejects with 409: once signed in, the cart and wishlist live in the
/// backend and the guest lists are no longer used.
#[derive(Debug)]
pub struct RequireGuest;

impl<S> FromRequestParts<S> for RequireGuest
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts)?;

        match session
            .get::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
            .await?
        {
            Some(_) => Err(AppError::Conflict(
                "Signed-in customers manage their lists through their account".to_string(),
            )),
            None => Ok(Self),
        }
    }
}

fn session_from_parts(parts: &Parts) -> Result<&Session, AppError> {
    parts
        .extensions
        .get::<Session>()
        .ok_or_else(|| AppError::Internal("session layer missing".to_string()))
}

/// Helper to store the signed-in customer and their backend token.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_customer(
    session: &Session,
    customer: &CurrentCustomer,
    token: &CustomerToken,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::CURRENT_CUSTOMER, customer)
        .await?;
    session.insert(session_keys::CUSTOMER_TOKEN, token).await
}

/// Helper to get the backend token of the signed-in customer.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn current_token(
    session: &Session,
) -> Result<Option<CustomerToken>, tower_sessions::session::Error> {
    session.get(session_keys::CUSTOMER_TOKEN).await
}
