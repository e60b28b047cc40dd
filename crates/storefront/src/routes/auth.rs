//! Authentication route handlers.
//!
//! The login form lives at `/`. Accounts are created with `cs-cli account
//! create`; there is no self-service registration.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use super::MessageQuery;
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::forms::{FieldErrors, LoginForm};
use crate::middleware::{OptionalAuth, clear_current_account, set_current_account};
use crate::models::CurrentAccount;
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

const INVALID_LOGIN: &str = "Invalid username or password.";

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub account: Option<CurrentAccount>,
    pub error: Option<String>,
    pub success: Option<String>,
    pub username: String,
    pub errors: FieldErrors,
}

impl LoginTemplate {
    fn new(error: Option<String>, success: Option<String>) -> Self {
        Self {
            account: None,
            error,
            success,
            username: String::new(),
            errors: FieldErrors::new(),
        }
    }
}

/// Display the login page, or send a logged-in account to the products.
pub async fn login_page(
    OptionalAuth(account): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if account.is_some() {
        return Redirect::to("/products/").into_response();
    }
    LoginTemplate::new(query.error_message(), query.success_message()).into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if let Err(errors) = form.clean() {
        let page = LoginTemplate {
            username: form.username,
            errors,
            ..LoginTemplate::new(None, None)
        };
        return Ok((StatusCode::BAD_REQUEST, page).into_response());
    }

    let account = match AuthService::new(state.store())
        .login(&form.username, &form.password)
        .await
    {
        Ok(account) => account,
        Err(AuthError::InvalidCredentials | AuthError::InvalidUsername(_)) => {
            tracing::warn!("Login failed");
            let page = LoginTemplate {
                username: form.username,
                ..LoginTemplate::new(Some(INVALID_LOGIN.to_string()), None)
            };
            return Ok((StatusCode::UNAUTHORIZED, page).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let current = CurrentAccount::from(&account);
    if let Err(e) = set_current_account(&session, &current).await {
        tracing::error!("Failed to set session: {}", e);
        return Ok(Redirect::to("/?error=session").into_response());
    }
    set_sentry_user(&current.id, &current.username);
    tracing::info!(account_id = %current.id, "Logged in");

    Ok(Redirect::to("/products/?success=logged_in").into_response())
}

/// Log out and return to the login form.
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_current_account(&session).await {
        tracing::error!("Failed to clear session: {}", e);
    }
    clear_sentry_user();
    Redirect::to("/?success=logged_out")
}
