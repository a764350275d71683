//! Wishlist route handlers.

use axum::extract::State;
use serde::Deserialize;
use tracing::instrument;

use ironmonger_core::ProductId;

use super::{ApiJson, ApiPath, Reply};
use crate::error::{AppError, Result};
use crate::middleware::RequireShopper;
use crate::models::WishlistView;
use crate::services::WishlistService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToWishlist {
    pub product_id: Option<ProductId>,
}

#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireShopper(identity): RequireShopper,
) -> Result<Reply<WishlistView>> {
    let wishlist = WishlistService::new(state.store())
        .get(identity.shopper)
        .await?;
    Ok(Reply::new("Wishlist fetched successfully", wishlist))
}

#[instrument(skip_all)]
pub async fn add(
    State(state): State<AppState>,
    RequireShopper(identity): RequireShopper,
    ApiJson(body): ApiJson<AddToWishlist>,
) -> Result<Reply<WishlistView>> {
    let product_id = body
        .product_id
        .ok_or_else(|| AppError::BadRequest("Product ID is required".to_string()))?;

    let wishlist = WishlistService::new(state.store())
        .add(identity.shopper, product_id)
        .await?;
    Ok(Reply::new("Product added to wishlist successfully", wishlist))
}

#[instrument(skip_all)]
pub async fn remove(
    State(state): State<AppState>,
    RequireShopper(identity): RequireShopper,
    ApiPath(product_id): ApiPath<ProductId>,
) -> Result<Reply<WishlistView>> {
    let wishlist = WishlistService::new(state.store())
        .remove(identity.shopper, product_id)
        .await?;
    Ok(Reply::new("Product removed from wishlist successfully", wishlist))
}
