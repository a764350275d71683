//! Authentication extractors.
//!
//! Shoppers authenticate with `Authorization: Bearer <token>`. The token is
//! hashed with the configured pepper and looked up in the store; the
//! resulting [`Identity`] is handed to the handler and passed explicitly to
//! every service call.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::Span;

use crate::error::{AppError, set_sentry_user};
use crate::models::Identity;
use crate::services::tokens::hash_token;
use crate::state::AppState;

/// Extractor that requires an authenticated shopper.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireShopper(identity): RequireShopper,
/// ) -> impl IntoResponse {
///     format!("Hello, shopper {}!", identity.shopper)
/// }
/// ```
pub struct RequireShopper(pub Identity);

/// Extractor that requires an authenticated admin.
///
/// Rejects regular shoppers with 403.
pub struct RequireAdmin(pub Identity);

/// Pull the token out of a `Bearer` authorization header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

async fn authenticate(parts: &Parts, state: &AppState) -> Result<Identity, AppError> {
    let token = bearer_token(parts)
        .ok_or_else(|| AppError::Unauthorized("Access Denied: No Token Provided!".to_string()))?;

    let hash = hash_token(&state.config().token_pepper, token);
    let identity = state
        .store()
        .resolve_token(&hash)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid Token".to_string()))?;

    Span::current().record("shopper_id", identity.shopper.to_string());
    set_sentry_user(&identity.shopper);

    Ok(identity)
}

impl FromRequestParts<AppState> for RequireShopper {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).await.map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = authenticate(parts, state).await?;
        if !identity.is_admin() {
            tracing::warn!(shopper_id = %identity.shopper, "Admin route refused");
            return Err(AppError::Forbidden("Access denied. Admin only.".to_string()));
        }
        Ok(Self(identity))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/cart");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc123"))), Some("abc123"));
        assert_eq!(bearer_token(&parts(Some("bearer  abc123 "))), Some("abc123"));
        assert_eq!(bearer_token(&parts(Some("Basic abc123"))), None);
        assert_eq!(bearer_token(&parts(Some("Bearer"))), None);
        assert_eq!(bearer_token(&parts(Some("Bearer  "))), None);
        assert_eq!(bearer_token(&parts(None)), None);
    }
}
