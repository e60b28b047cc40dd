//! Customer profile route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use super::MessageQuery;
use crate::error::AppError;
use crate::filters;
use crate::forms::{FieldErrors, ProfileForm};
use crate::middleware::RequireAuth;
use crate::models::CurrentAccount;
use crate::services::{ProfileService, ServiceError};
use crate::state::AppState;

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub account: Option<CurrentAccount>,
    pub error: Option<String>,
    pub success: Option<String>,
    pub form: ProfileForm,
    pub errors: FieldErrors,
}

/// Display the profile, creating an empty one on first visit.
#[instrument(skip(state, account, query), fields(account_id = %account.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(account): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let customer = ProfileService::new(state.store())
        .get_or_create_profile(account.id)
        .await?;

    Ok(ProfileTemplate {
        account: Some(account),
        error: query.error_message(),
        success: query.success_message(),
        form: ProfileForm::from_customer(&customer),
        errors: FieldErrors::new(),
    })
}

/// Save profile edits.
#[instrument(skip(state, account, form), fields(account_id = %account.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(account): RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Result<Response, AppError> {
    match ProfileService::new(state.store())
        .update_profile(account.id, &form)
        .await
    {
        Ok(_) => Ok(Redirect::to("/profile/?success=profile_updated").into_response()),
        Err(ServiceError::Validation(errors)) => {
            let page = ProfileTemplate {
                account: Some(account),
                error: None,
                success: None,
                form,
                errors,
            };
            Ok((StatusCode::BAD_REQUEST, page).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
