//! Cart route handlers.

use axum::extract::State;
use serde::Deserialize;
use tracing::instrument;

use ironmonger_core::{LineTarget, ProductId, SizeSelector};

use super::{ApiJson, ApiPath, Reply};
use crate::error::{AppError, Result};
use crate::middleware::RequireShopper;
use crate::models::CartView;
use crate::services::{CartService, Removal};
use crate::state::AppState;

/// Add to cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub product_id: Option<ProductId>,
    pub quantity: Option<i64>,
    #[serde(default, alias = "size")]
    pub selected_size: Option<SizeSelector>,
}

/// Update cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCart {
    pub product_id: Option<ProductId>,
    pub quantity: Option<i64>,
    #[serde(default, alias = "size")]
    pub selected_size: Option<SizeSelector>,
}

/// Show the shopper's cart, creating it on first visit.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireShopper(identity): RequireShopper,
) -> Result<Reply<CartView>> {
    let cart = CartService::new(state.store()).get(identity.shopper).await?;
    Ok(Reply::new("Cart fetched successfully", cart))
}

/// Add an item to the cart.
#[instrument(skip_all)]
pub async fn add(
    State(state): State<AppState>,
    RequireShopper(identity): RequireShopper,
    ApiJson(body): ApiJson<AddToCart>,
) -> Result<Reply<CartView>> {
    let product_id = body
        .product_id
        .ok_or_else(|| AppError::BadRequest("Product ID is required".to_string()))?;

    let cart = CartService::new(state.store())
        .add_item(
            identity.shopper,
            product_id,
            body.quantity,
            body.selected_size.as_ref(),
        )
        .await?;
    Ok(Reply::new("Item added to cart successfully", cart))
}

/// Overwrite the quantity of a cart line.
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    RequireShopper(identity): RequireShopper,
    ApiJson(body): ApiJson<UpdateCart>,
) -> Result<Reply<CartView>> {
    let (Some(product_id), Some(quantity)) = (body.product_id, body.quantity) else {
        return Err(AppError::BadRequest(
            "Product ID and valid quantity are required".to_string(),
        ));
    };

    let cart = CartService::new(state.store())
        .update_quantity(
            identity.shopper,
            product_id,
            quantity,
            body.selected_size.as_ref(),
        )
        .await?;
    Ok(Reply::new("Cart updated successfully", cart))
}

/// Remove lines by product id or line id.
///
/// A target that matches nothing still succeeds, with the cart unchanged.
#[instrument(skip_all)]
pub async fn remove(
    State(state): State<AppState>,
    RequireShopper(identity): RequireShopper,
    ApiPath(target): ApiPath<String>,
) -> Result<Reply<CartView>> {
    let target: LineTarget = target.parse().map_err(AppError::BadRequest)?;

    let (cart, outcome) = CartService::new(state.store())
        .remove_item(identity.shopper, target)
        .await?;

    let message = match outcome {
        Removal::Removed(_) => "Item removed from cart successfully",
        Removal::NothingMatched => "Item not found in cart",
    };
    Ok(Reply::new(message, cart))
}

/// Empty the cart.
#[instrument(skip_all)]
pub async fn clear(
    State(state): State<AppState>,
    RequireShopper(identity): RequireShopper,
) -> Result<Reply<CartView>> {
    let cart = CartService::new(state.store()).clear(identity.shopper).await?;
    Ok(Reply::new("Cart cleared successfully", cart))
}
