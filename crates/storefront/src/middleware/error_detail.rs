//! Server error detail in response bodies, outside production.

use axum::{
    body::Body,
    extract::{Request, State},
    http::header::CONTENT_LENGTH,
    middleware::Next,
    response::Response,
};
use serde_json::Value;

use crate::error::ErrorDetail;
use crate::state::AppState;

/// Error bodies larger than this are left untouched.
const MAX_ERROR_BODY: usize = 64 * 1024;

/// Add `"error": <detail>` to server error bodies when not in production.
///
/// Only responses carrying an [`ErrorDetail`] extension are rewritten, and
/// only when the detail adds something beyond the client message.
pub async fn error_detail_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    if state.config().environment.is_production() {
        return response;
    }
    let Some(ErrorDetail(detail)) = response.extensions().get::<ErrorDetail>().cloned() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_ERROR_BODY).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(error = %err, "Could not buffer error body");
            return Response::from_parts(parts, Body::empty());
        }
    };

    let body = match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(mut map)) if map.get("message") != Some(&Value::String(detail.clone())) => {
            map.insert("error".to_owned(), Value::String(detail));
            parts.headers.remove(CONTENT_LENGTH);
            Body::from(Value::Object(map).to_string())
        }
        _ => Body::from(bytes),
    };

    Response::from_parts(parts, body)
}
