//! Wishlist route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};
use tracing::instrument;

use corner_store_core::ProductId;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CurrentAccount, WishlistItem};
use crate::services::WishlistService;
use crate::state::AppState;

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist.html")]
pub struct WishlistTemplate {
    pub account: Option<CurrentAccount>,
    pub error: Option<String>,
    pub success: Option<String>,
    pub items: Vec<WishlistItem>,
}

/// Save a product to the wishlist.
#[instrument(skip(state, account), fields(account_id = %account.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(account): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Redirect, AppError> {
    WishlistService::new(state.store())
        .add_to_wishlist(account.id, product_id)
        .await?;
    Ok(Redirect::to("/wishlist/"))
}

/// Remove a product from the wishlist.
#[instrument(skip(state, account), fields(account_id = %account.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(account): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Redirect, AppError> {
    WishlistService::new(state.store())
        .remove_from_wishlist(account.id, product_id)
        .await?;
    Ok(Redirect::to("/wishlist/"))
}

/// Display the wishlist.
#[instrument(skip(state, account), fields(account_id = %account.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(account): RequireAuth,
) -> Result<impl IntoResponse, AppError> {
    let items = WishlistService::new(state.store())
        .list_wishlist(account.id)
        .await?;

    Ok(WishlistTemplate {
        account: Some(account),
        error: None,
        success: None,
        items,
    })
}
