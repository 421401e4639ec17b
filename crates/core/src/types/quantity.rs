//! Line-item quantity bounded by the quantity picker.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("quantity must be between {min} and {max} (got {value})", min = Quantity::MIN, max = Quantity::MAX)]
pub struct QuantityError {
    /// The rejected value.
    pub value: u32,
}

/// Number of units of one variant in a cart line, always in `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// Smallest accepted quantity.
    pub const MIN: u32 = 1;
    /// Largest accepted quantity.
    pub const MAX: u32 = 10;
    /// A single unit.
    pub const ONE: Self = Self(1);

    /// Create a quantity, validating the bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is outside `1..=10`.
    pub const fn new(value: u32) -> Result<Self, QuantityError> {
        if value < Self::MIN || value > Self::MAX {
            return Err(QuantityError { value });
        }
        Ok(Self(value))
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// One more unit, saturating at the maximum.
    #[must_use]
    pub const fn incremented(self) -> Self {
        if self.0 < Self::MAX {
            Self(self.0 + 1)
        } else {
            self
        }
    }

    /// One less unit, saturating at the minimum.
    #[must_use]
    pub const fn decremented(self) -> Self {
        if self.0 > Self::MIN {
            Self(self.0 - 1)
        } else {
            self
        }
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(Quantity::new(0).is_err());
        assert!(Quantity::new(1).is_ok());
        assert!(Quantity::new(10).is_ok());
        assert_eq!(Quantity::new(11), Err(QuantityError { value: 11 }));
    }

    #[test]
    fn test_increment_saturates() {
        let max = Quantity::new(10).unwrap();
        assert_eq!(max.incremented(), max);
        assert_eq!(Quantity::ONE.incremented().get(), 2);
    }

    #[test]
    fn test_decrement_saturates() {
        assert_eq!(Quantity::ONE.decremented(), Quantity::ONE);
        assert_eq!(Quantity::new(5).unwrap().decremented().get(), 4);
    }

    #[test]
    fn test_deserialize_rejects_zero() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert_eq!(serde_json::from_str::<Quantity>("2").unwrap().get(), 2);
    }

    #[test]
    fn test_error_message() {
        let err = Quantity::new(42).unwrap_err();
        assert_eq!(err.to_string(), "quantity must be between 1 and 10 (got 42)");
    }
}
