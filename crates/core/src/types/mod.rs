//! Core types for Ironmonger.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod payment;
pub mod price;
pub mod size;
pub mod status;

pub use id::*;
pub use payment::PaymentMethod;
pub use price::{MAX_AMOUNT, MAX_SCALE, PriceError, line_total, sum_lines, validate_price};
pub use size::SizeSelector;
pub use status::*;
