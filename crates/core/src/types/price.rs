//! Decimal money arithmetic for line items and totals.
//!
//! Prices are plain [`Decimal`] amounts in the store currency. Totals are
//! always derived from lines; nothing here stores a total on its own.

use rust_decimal::Decimal;

/// Errors for caller-supplied amounts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    /// Amount below zero.
    #[error("{field} must not be negative (got {amount})")]
    Negative {
        /// Field the amount came from.
        field: &'static str,
        /// Offending amount.
        amount: Decimal,
    },

    /// More decimal places than stored amounts keep.
    #[error("{field} must have at most {MAX_SCALE} decimal places (got {amount})")]
    TooPrecise {
        /// Field the amount came from.
        field: &'static str,
        /// Offending amount.
        amount: Decimal,
    },

    /// Larger than a stored amount can hold.
    #[error("{field} is too large (got {amount})")]
    TooLarge {
        /// Field the amount came from.
        field: &'static str,
        /// Offending amount.
        amount: Decimal,
    },
}

/// Decimal places kept for stored amounts (`NUMERIC(12, 2)`).
pub const MAX_SCALE: u32 = 2;

/// Largest amount a `NUMERIC(12, 2)` column holds: `9999999999.99`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// `unit_price × quantity`.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Σ(price × quantity) over `(price, quantity)` pairs.
///
/// # Example
///
/// ```rust
/// use ironmonger_core::sum_lines;
/// use rust_decimal::Decimal;
///
/// let total = sum_lines([(Decimal::new(10, 0), 2), (Decimal::new(5, 0), 1)]);
/// assert_eq!(total, Decimal::new(25, 0));
/// ```
pub fn sum_lines<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (Decimal, u32)>,
{
    lines
        .into_iter()
        .map(|(price, quantity)| line_total(price, quantity))
        .sum()
}

/// Check a caller-supplied amount fits what is stored.
///
/// Trailing zeros are dropped, so `3.300` is accepted as `3.3`.
///
/// # Errors
///
/// Returns [`PriceError::Negative`] when `amount < 0`,
/// [`PriceError::TooPrecise`] with more than [`MAX_SCALE`] decimal places and
/// [`PriceError::TooLarge`] above [`MAX_AMOUNT`].
pub fn validate_price(field: &'static str, amount: Decimal) -> Result<Decimal, PriceError> {
    let amount = amount.normalize();
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(PriceError::Negative { field, amount });
    }
    if amount.scale() > MAX_SCALE {
        return Err(PriceError::TooPrecise { field, amount });
    }
    if amount > MAX_AMOUNT {
        return Err(PriceError::TooLarge { field, amount });
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(Decimal::new(1999, 2), 3), Decimal::new(5997, 2));
        assert_eq!(line_total(Decimal::new(1999, 2), 0), Decimal::ZERO);
    }

    #[test]
    fn test_sum_lines_empty() {
        assert_eq!(sum_lines(std::iter::empty()), Decimal::ZERO);
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price("price", Decimal::ZERO).is_ok());
        assert!(validate_price("price", Decimal::new(5, 1)).is_ok());
        assert_eq!(
            validate_price("total", Decimal::new(-1, 0)),
            Err(PriceError::Negative {
                field: "total",
                amount: Decimal::new(-1, 0)
            })
        );
    }

    #[test]
    fn test_validate_price_precision() {
        assert_eq!(
            validate_price("price", Decimal::new(3333, 3)),
            Err(PriceError::TooPrecise {
                field: "price",
                amount: Decimal::new(3333, 3)
            })
        );
        assert_eq!(
            validate_price("price", Decimal::new(3300, 3)),
            Ok(Decimal::new(33, 1))
        );
        assert_eq!(MAX_AMOUNT.to_string(), "9999999999.99");
        assert_eq!(validate_price("total", MAX_AMOUNT), Ok(MAX_AMOUNT));
        assert!(matches!(
            validate_price("total", MAX_AMOUNT + Decimal::ONE),
            Err(PriceError::TooLarge { .. })
        ));
    }
}
