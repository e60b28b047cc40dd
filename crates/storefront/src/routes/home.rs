//! Landing page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentAccount;

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub account: Option<CurrentAccount>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the landing page.
pub async fn index(OptionalAuth(account): OptionalAuth) -> impl IntoResponse {
    IndexTemplate {
        account,
        error: None,
        success: None,
    }
}
