//! Declared payment method for an order.

use serde::{Deserialize, Serialize};

/// How the shopper says they will pay.
///
/// No payment is processed; the method only decides whether payment
/// evidence (e.g. a transfer screenshot reference) is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    Cod,
    /// QR code bank transfer; evidence reference required.
    Qr,
}

impl PaymentMethod {
    /// Normalize a free-form method name.
    ///
    /// `"qr"` (any case, surrounding whitespace ignored) is QR transfer;
    /// everything else, including a missing value, is cash on delivery.
    #[must_use]
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("qr") => Self::Qr,
            _ => Self::Cod,
        }
    }

    /// Stored/wire spelling.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cod => "cod",
            Self::Qr => "qr",
        }
    }

    /// Whether an order with this method must carry payment evidence.
    #[must_use]
    pub const fn requires_evidence(&self) -> bool {
        matches!(self, Self::Qr)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse of the stored spelling. Use [`PaymentMethod::normalize`] for
/// client input.
impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cod" => Ok(Self::Cod),
            "qr" => Ok(Self::Qr),
            other => Err(format!("invalid payment method: {other}")),
        }
    }
}
