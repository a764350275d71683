//! Address book route handlers.

use axum::extract::State;
use tracing::instrument;

use ironmonger_core::AddressId;

use super::{ApiJson, ApiPath, Reply};
use crate::error::Result;
use crate::middleware::RequireShopper;
use crate::models::{Address, AddressInput};
use crate::services::AddressService;
use crate::state::AppState;

/// List the shopper's addresses, default first.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireShopper(identity): RequireShopper,
) -> Result<Reply<Vec<Address>>> {
    let addresses = AddressService::new(state.store())
        .list(identity.shopper)
        .await?;
    Ok(Reply::new("Addresses fetched successfully", addresses))
}

#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireShopper(identity): RequireShopper,
    ApiPath(id): ApiPath<AddressId>,
) -> Result<Reply<Address>> {
    let address = AddressService::new(state.store())
        .get(identity.shopper, id)
        .await?;
    Ok(Reply::new("Address fetched successfully", address))
}

#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireShopper(identity): RequireShopper,
    ApiJson(body): ApiJson<AddressInput>,
) -> Result<Reply<Address>> {
    let address = AddressService::new(state.store())
        .add(identity.shopper, body)
        .await?;
    Ok(Reply::new("Address added successfully", address))
}

#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    RequireShopper(identity): RequireShopper,
    ApiPath(id): ApiPath<AddressId>,
    ApiJson(body): ApiJson<AddressInput>,
) -> Result<Reply<Address>> {
    let address = AddressService::new(state.store())
        .update(identity.shopper, id, &body)
        .await?;
    Ok(Reply::new("Address updated successfully", address))
}

#[instrument(skip_all)]
pub async fn destroy(
    State(state): State<AppState>,
    RequireShopper(identity): RequireShopper,
    ApiPath(id): ApiPath<AddressId>,
) -> Result<Reply<Address>> {
    let address = AddressService::new(state.store())
        .remove(identity.shopper, id)
        .await?;
    Ok(Reply::new("Address deleted successfully", address))
}

#[instrument(skip_all)]
pub async fn set_default(
    State(state): State<AppState>,
    RequireShopper(identity): RequireShopper,
    ApiPath(id): ApiPath<AddressId>,
) -> Result<Reply<Address>> {
    let address = AddressService::new(state.store())
        .set_default(identity.shopper, id)
        .await?;
    Ok(Reply::new("Default address updated successfully", address))
}
