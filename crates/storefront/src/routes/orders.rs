//! Checkout and order detail route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use corner_store_core::OrderId;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{Cart, CurrentAccount, Order, OrderDetail};
use crate::services::OrderService;
use crate::state::AppState;

/// Checkout confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub account: Option<CurrentAccount>,
    pub error: Option<String>,
    pub success: Option<String>,
    pub cart: Cart,
    /// Earlier orders, for links to their detail pages.
    pub orders: Vec<Order>,
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "order_detail.html")]
pub struct OrderDetailTemplate {
    pub account: Option<CurrentAccount>,
    pub error: Option<String>,
    pub success: Option<String>,
    pub detail: OrderDetail,
}

/// Display the checkout confirmation. Writes nothing.
#[instrument(skip(state, account), fields(account_id = %account.id))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(account): RequireAuth,
) -> Result<impl IntoResponse, AppError> {
    let orders = OrderService::new(state.store());
    let cart = orders.checkout(account.id).await?;
    let history = orders.list_orders(account.id).await?;

    Ok(CheckoutTemplate {
        account: Some(account),
        error: None,
        success: None,
        cart,
        orders: history,
    })
}

/// Display one order with its items, payments and shipments.
#[instrument(skip(state, account), fields(account_id = %account.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(account): RequireAuth,
    Path(order_id): Path<OrderId>,
) -> Result<impl IntoResponse, AppError> {
    let detail = OrderService::new(state.store())
        .view_order(account.id, account.is_staff, order_id)
        .await?;

    Ok(OrderDetailTemplate {
        account: Some(account),
        error: None,
        success: None,
        detail,
    })
}
