//! Black-box tests for the Ironmonger storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo run -p ironmonger-cli -- migrate
//! cargo run -p ironmonger-cli -- seed products catalog.yaml
//! cargo run -p ironmonger-storefront &
//!
//! export IM_TEST_SHOPPER_TOKEN=$(cargo run -q -p ironmonger-cli -- token issue -e shopper@example.com)
//! export IM_TEST_ADMIN_TOKEN=$(cargo run -q -p ironmonger-cli -- token issue -e admin@example.com)
//! export IM_TEST_PRODUCT_ID=1
//! cargo test -p ironmonger-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - Server under test (default: `http://localhost:3000`)
//! - `IM_TEST_SHOPPER_TOKEN` - Bearer token of a customer
//! - `IM_TEST_ADMIN_TOKEN` - Bearer token of an admin
//! - `IM_TEST_PRODUCT_ID` - A product with stock to spare

use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

/// Connection details for the server under test.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .build()
                .expect("Failed to create HTTP client"),
            base_url: std::env::var("STOREFRONT_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        }
    }

    /// Send a request and decode the JSON envelope.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the body is not JSON.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> (StatusCode, Value) {
        let mut request = self
            .client
            .request(method, format!("{}{path}", self.base_url));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.expect("request failed");
        let status = response.status();
        let json = response.json().await.expect("response was not JSON");
        (status, json)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a required test variable.
///
/// # Panics
///
/// Panics with a hint when the variable is unset.
#[must_use]
pub fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| panic!("{key} must be set for integration tests"))
}
