//! HTTP middleware stack for the storefront API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, one hub per request)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded on the span, echoed in the response)
//! 4. Security headers
//! 5. Error detail (non-production only)
//! 6. Rate limiting (governor, applied by the binary)
//!
//! Authentication is not a layer: handlers opt in through the
//! [`RequireShopper`] and [`RequireAdmin`] extractors.

pub mod auth;
pub mod error_detail;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use auth::{RequireAdmin, RequireShopper};
pub use error_detail::error_detail_middleware;
pub use rate_limit::api_rate_limiter;
pub use request_id::{RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
