//! Product listing route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use tracing::instrument;

use super::MessageQuery;
use crate::error::AppError;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{CurrentAccount, Product};
use crate::services::CatalogService;
use crate::state::AppState;

/// Product listing template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub account: Option<CurrentAccount>,
    pub error: Option<String>,
    pub success: Option<String>,
    pub products: Vec<Product>,
}

impl ProductsIndexTemplate {
    /// Staff see edit and delete controls.
    fn is_staff(&self) -> bool {
        self.account.as_ref().is_some_and(|a| a.is_staff)
    }
}

/// Display all products.
#[instrument(skip(state, account, query))]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(account): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let products = CatalogService::new(state.store()).list_products().await?;

    Ok(ProductsIndexTemplate {
        account,
        error: query.error_message(),
        success: query.success_message(),
        products,
    })
}
