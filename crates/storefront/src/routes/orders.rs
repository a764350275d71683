//! Order route handlers.

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use ironmonger_core::OrderId;

use super::{ApiJson, ApiPath, Reply};
use crate::error::Result;
use crate::middleware::{RequireAdmin, RequireShopper};
use crate::models::OrderView;
use crate::services::{OrderService, PlaceOrder};
use crate::state::AppState;

/// Status update request body. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateStatus {
    pub status: Option<String>,
    pub payment_status: Option<String>,
}

/// Place an order from the cart or from explicit items.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireShopper(identity): RequireShopper,
    ApiJson(body): ApiJson<PlaceOrder>,
) -> Result<(StatusCode, Reply<OrderView>)> {
    let order = OrderService::new(state.store())
        .place_order(identity.shopper, body)
        .await?;
    Ok(Reply::new("Order created successfully", order).created())
}

/// The shopper's orders, newest first.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireShopper(identity): RequireShopper,
) -> Result<Reply<Vec<OrderView>>> {
    let orders = OrderService::new(state.store())
        .list_for_shopper(identity.shopper)
        .await?;
    Ok(Reply::new("Orders fetched successfully", orders))
}

/// One of the shopper's orders.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireShopper(identity): RequireShopper,
    ApiPath(id): ApiPath<OrderId>,
) -> Result<Reply<OrderView>> {
    let order = OrderService::new(state.store())
        .get_one(identity.shopper, id)
        .await?;
    Ok(Reply::new("Order fetched successfully", order))
}

/// Update an order's status fields (admin).
#[instrument(skip_all)]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(identity): RequireAdmin,
    ApiPath(id): ApiPath<OrderId>,
    ApiJson(body): ApiJson<UpdateStatus>,
) -> Result<Reply<OrderView>> {
    let order = OrderService::new(state.store())
        .update_status(
            &identity,
            id,
            body.status.as_deref(),
            body.payment_status.as_deref(),
        )
        .await?;
    Ok(Reply::new("Order status updated successfully", order))
}

/// Every order with shopper summaries (admin).
#[instrument(skip_all)]
pub async fn all(
    State(state): State<AppState>,
    RequireAdmin(identity): RequireAdmin,
) -> Result<Reply<Vec<OrderView>>> {
    let orders = OrderService::new(state.store()).list_all(&identity).await?;
    Ok(Reply::new("Orders fetched successfully", orders))
}
