//! Address book types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ironmonger_core::{AddressId, UserId};

/// A saved shopper address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub name: String,
    pub phone: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// Validated fields of a new address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressFields {
    pub name: String,
    pub phone: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// Address request body, used for both creation and partial updates.
///
/// Accepts the legacy `pincode` spelling for the postal code.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(alias = "pincode")]
    pub postal_code: Option<String>,
    pub is_default: Option<bool>,
}

fn present(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

impl AddressInput {
    /// Turn a creation request into complete fields.
    ///
    /// Returns the names of the missing required fields on failure.
    ///
    /// # Errors
    ///
    /// Returns the list of missing field names.
    pub fn into_fields(self) -> Result<AddressFields, Vec<&'static str>> {
        let mut missing = Vec::new();
        let mut take = |value: Option<&String>, field: &'static str| {
            present(value).unwrap_or_else(|| {
                missing.push(field);
                String::new()
            })
        };

        let name = take(self.name.as_ref(), "name");
        let phone = take(self.phone.as_ref(), "phone");
        let address_line1 = take(self.address_line1.as_ref(), "addressLine1");
        let city = take(self.city.as_ref(), "city");
        let state = take(self.state.as_ref(), "state");
        let postal_code = take(self.postal_code.as_ref(), "postalCode");

        if !missing.is_empty() {
            return Err(missing);
        }

        Ok(AddressFields {
            name,
            phone,
            address_line1,
            address_line2: present(self.address_line2.as_ref()),
            city,
            state,
            postal_code,
        })
    }

    /// Apply a partial update. Omitted or blank fields keep their old value;
    /// `addressLine2` may be cleared by sending an empty string.
    pub fn apply_to(&self, address: &mut Address) {
        if let Some(name) = present(self.name.as_ref()) {
            address.name = name;
        }
        if let Some(phone) = present(self.phone.as_ref()) {
            address.phone = phone;
        }
        if let Some(line1) = present(self.address_line1.as_ref()) {
            address.address_line1 = line1;
        }
        if self.address_line2.is_some() {
            address.address_line2 = present(self.address_line2.as_ref());
        }
        if let Some(city) = present(self.city.as_ref()) {
            address.city = city;
        }
        if let Some(state) = present(self.state.as_ref()) {
            address.state = state;
        }
        if let Some(postal_code) = present(self.postal_code.as_ref()) {
            address.postal_code = postal_code;
        }
    }
}
