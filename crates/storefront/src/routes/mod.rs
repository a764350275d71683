//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                    - Liveness
//! GET    /health/ready              - Store reachable
//!
//! # Cart (shopper)
//! GET    /cart                      - Current cart
//! POST   /cart/add                  - Add item {productId, quantity?, selectedSize?}
//! PUT    /cart/update               - Set quantity {productId, quantity, selectedSize?}
//! DELETE /cart/remove/{target}      - Remove by product id or line id
//! GET    /cart/remove/{target}      - Same as above
//! DELETE /cart/clear                - Empty the cart
//!
//! # Orders
//! POST   /orders/create             - Place order (201)
//! GET    /orders                    - Own orders, newest first
//! GET    /orders/all                - Every order (admin)
//! GET    /orders/{id}               - One own order
//! PUT    /orders/{id}/status        - Update status fields (admin)
//!
//! # Address book (shopper)
//! GET    /address                   - List, default first
//! GET    /address/{id}              - One address
//! POST   /address/add               - Add
//! PUT    /address/update/{id}       - Partial update
//! DELETE /address/delete/{id}       - Delete
//! PUT    /address/default/{id}      - Make default
//!
//! # Wishlist (shopper)
//! GET    /wishlist                  - Wishlist with products
//! POST   /wishlist/add              - Add {productId}
//! DELETE /wishlist/remove/{productId} - Remove
//! ```
//!
//! Every response body is `{"message": ...}`; successes add `"data"`.

pub mod address;
pub mod cart;
pub mod health;
pub mod orders;
pub mod wishlist;

use axum::{
    Json, Router,
    extract::{FromRequest, FromRequestParts},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::middleware::{
    error_detail_middleware, request_id_middleware, security_headers_middleware,
};
use crate::state::AppState;

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct Reply<T> {
    pub message: &'static str,
    pub data: T,
}

impl<T> Reply<T> {
    pub const fn new(message: &'static str, data: T) -> Self {
        Self { message, data }
    }

    /// Respond with 201 instead of 200.
    pub const fn created(self) -> (StatusCode, Self) {
        (StatusCode::CREATED, self)
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// JSON body extractor whose rejections use the API error envelope.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path extractor whose rejections use the API error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", put(cart::update))
        .route("/remove/{target}", delete(cart::remove).get(cart::remove))
        .route("/clear", delete(cart::clear))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/create", post(orders::create))
        .route("/all", get(orders::all))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", put(orders::update_status))
}

/// Create the address routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(address::index))
        .route("/{id}", get(address::show))
        .route("/add", post(address::create))
        .route("/update/{id}", put(address::update))
        .route("/delete/{id}", delete(address::destroy))
        .route("/default/{id}", put(address::set_default))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/add", post(wishlist::add))
        .route("/remove/{product_id}", delete(wishlist::remove))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/cart", cart_routes())
        .nest("/orders", order_routes())
        .nest("/address", address_routes())
        .nest("/wishlist", wishlist_routes())
        .fallback(not_found)
}

/// The complete application with its per-request layers.
///
/// Rate limiting and Sentry are added by the binary.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            error_detail_middleware,
        ))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<axum::body::Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                    shopper_id = tracing::field::Empty,
                )
            },
        ))
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}
