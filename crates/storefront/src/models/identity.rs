//! Who is calling.

use serde::Serialize;

use ironmonger_core::{Role, UserId};

/// The resolved caller of a request.
///
/// Produced by the token extractor and passed explicitly into every
/// service call; nothing reads the caller from ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub shopper: UserId,
    pub role: Role,
}

impl Identity {
    #[must_use]
    pub const fn new(shopper: UserId, role: Role) -> Self {
        Self { shopper, role }
    }

    /// Whether the caller may act across shoppers.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_privileged()
    }
}

/// Public shopper summary attached to orders in the admin listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shopper {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Fields for creating a shopper account from the CLI.
#[derive(Debug, Clone)]
pub struct NewShopper {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
}
