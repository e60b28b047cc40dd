//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a logged-in account (and optionally
//! staff) in route handlers.
//!
//! The session holds a copy of the account taken at login. Staff routes
//! re-read the account from the store, so a demoted or deleted account loses
//! catalog access on its next request.

use axum::{
    extract::FromRequestParts,
    http::{Method, StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::db::AccountRepository;
use crate::models::{CurrentAccount, session_keys};
use crate::state::AppState;

/// Extractor that requires a logged-in account.
///
/// Mutating requests without a session get `401`; page views are redirected
/// to the login form at `/`.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(account): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", account.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentAccount);

/// Extractor that requires a logged-in staff account.
///
/// The role comes from the store, not the session. Non-staff accounts get
/// `403`; a session whose account no longer exists is ended and treated as
/// logged out.
pub struct RequireStaff(pub CurrentAccount);

/// Error returned when authentication is required but the account is not logged in.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page (for page views).
    RedirectToLogin,
    /// Unauthorized response (for mutating requests).
    Unauthorized,
    /// Logged in without the required role.
    Forbidden,
    /// The account could not be re-read.
    Unavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden => StatusCode::FORBIDDEN.into_response(),
            Self::Unavailable => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

/// Paths that change the cart or wishlist even when reached with `GET`.
const MUTATING_PREFIXES: &[&str] = &[
    "/add-to-cart/",
    "/remove-from-cart/",
    "/add-to-wishlist/",
    "/remove-from-wishlist/",
];

fn rejection_for(parts: &Parts) -> AuthRejection {
    let path = parts.uri.path();
    if parts.method != Method::GET
        || MUTATING_PREFIXES
            .iter()
            .any(|prefix| path.starts_with(prefix))
    {
        AuthRejection::Unauthorized
    } else {
        AuthRejection::RedirectToLogin
    }
}

async fn current_account(parts: &Parts) -> Option<CurrentAccount> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentAccount>(session_keys::CURRENT_ACCOUNT)
        .await
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_account(parts)
            .await
            .map(Self)
            .ok_or_else(|| rejection_for(parts))
    }
}

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session_account = current_account(parts)
            .await
            .ok_or_else(|| rejection_for(parts))?;

        let stored = state
            .store()
            .get_account(session_account.id)
            .await
            .map_err(|e| {
                tracing::error!(account_id = %session_account.id, error = %e, "failed to load account");
                AuthRejection::Unavailable
            })?;

        let Some(stored) = stored else {
            tracing::warn!(account_id = %session_account.id, "session for deleted account");
            if let Some(session) = parts.extensions.get::<Session>()
                && let Err(e) = clear_current_account(session).await
            {
                tracing::warn!(error = %e, "failed to end stale session");
            }
            return Err(rejection_for(parts));
        };

        let account = CurrentAccount::from(&stored);
        if !account.is_staff {
            tracing::warn!(account_id = %account.id, path = %parts.uri.path(), "non-staff on staff route");
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(account))
    }
}

/// Extractor that optionally gets the current account.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is logged in.
pub struct OptionalAuth(pub Option<CurrentAccount>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_account(parts).await))
    }
}

/// Helper to set the current account in the session.
///
/// The session id is cycled first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_account(
    session: &Session,
    account: &CurrentAccount,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ACCOUNT, account).await
}

/// Helper to end the session (logout).
///
/// # Errors
///
/// Returns an error if the session store cannot be updated.
pub async fn clear_current_account(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
