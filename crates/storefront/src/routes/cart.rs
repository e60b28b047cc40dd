//! Cart route handlers.
//!
//! Add and remove accept `GET` as well as `POST` so plain links work.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
};
use tracing::instrument;

use corner_store_core::ProductId;

use super::MessageQuery;
use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{Cart, CurrentAccount};
use crate::services::CartService;
use crate::state::AppState;

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub account: Option<CurrentAccount>,
    pub error: Option<String>,
    pub success: Option<String>,
    pub cart: Cart,
}

/// Add one unit of a product and show the cart.
#[instrument(skip(state, account), fields(account_id = %account.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(account): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Redirect, AppError> {
    CartService::new(state.store())
        .add_to_cart(account.id, product_id)
        .await?;

    let product_id = product_id.to_string();
    add_breadcrumb("cart", "Added product", Some(&[("product_id", &product_id)]));

    Ok(Redirect::to(&format!("/cart/?added={product_id}")))
}

/// Remove a product's line from the cart.
#[instrument(skip(state, account), fields(account_id = %account.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(account): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Redirect, AppError> {
    CartService::new(state.store())
        .remove_from_cart(account.id, product_id)
        .await?;
    Ok(Redirect::to("/cart/"))
}

/// Display the cart.
#[instrument(skip(state, account, query), fields(account_id = %account.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(account): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let cart = CartService::new(state.store())
        .list_cart(account.id)
        .await?;

    let success = added_notice(&cart, query.added.as_deref()).or_else(|| query.success_message());

    Ok(CartTemplate {
        account: Some(account),
        error: query.error_message(),
        success,
        cart,
    })
}

/// "<name> has been added" for an `?added=` id that is actually in the cart.
fn added_notice(cart: &Cart, added: Option<&str>) -> Option<String> {
    let product_id: ProductId = added?.parse().ok()?;
    cart.items
        .iter()
        .find(|item| item.product.id == product_id)
        .map(|item| format!("{} has been added to your cart.", item.product.name))
}
