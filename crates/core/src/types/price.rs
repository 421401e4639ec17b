//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., reais, not centavos).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price from the smallest currency unit (e.g., centavos).
    #[must_use]
    pub fn from_cents(cents: i64, currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::new(cents, 2), currency_code)
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Multiply by a quantity (line total).
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency_code)
    }

    /// Add another amount in the same currency.
    ///
    /// Amounts in a different currency are not converted; the caller is
    /// expected to keep a cart in one currency.
    #[must_use]
    pub fn plus(self, other: Self) -> Self {
        Self::new(self.amount + other.amount, self.currency_code)
    }

    /// Value of one installment when the price is split `count` ways.
    ///
    /// Rounded half-up to two decimal places. A zero count returns the
    /// full price.
    #[must_use]
    pub fn installment(self, count: u32) -> Self {
        if count == 0 {
            return self;
        }
        let each = (self.amount / Decimal::from(count))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        Self::new(each, self.currency_code)
    }

    /// Format for display in the currency's locale (e.g., `R$ 1.234,56`).
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let text = format!("{:.2}", rounded.abs());
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let (group_sep, decimal_sep) = self.currency_code.separators();
        let grouped = group_thousands(whole, group_sep);
        let sign = if negative { "-" } else { "" };

        format!(
            "{sign}{} {grouped}{decimal_sep}{fraction}",
            self.currency_code.symbol()
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Insert a separator between every group of three digits, from the right.
fn group_thousands(digits: &str, separator: char) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    BRL,
    USD,
    EUR,
}

impl CurrencyCode {
    /// Currency symbol used in display strings.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::BRL => "R$",
            Self::USD => "US$",
            Self::EUR => "€",
        }
    }

    /// ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::BRL => "BRL",
            Self::USD => "USD",
            Self::EUR => "EUR",
        }
    }

    /// Thousands and decimal separators.
    const fn separators(self) -> (char, char) {
        match self {
            Self::BRL | Self::EUR => ('.', ','),
            Self::USD => (',', '.'),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brl(cents: i64) -> Price {
        Price::from_cents(cents, CurrencyCode::BRL)
    }

    #[test]
    fn test_display_brl() {
        assert_eq!(brl(6990).display(), "R$ 69,90");
        assert_eq!(brl(0).display(), "R$ 0,00");
        assert_eq!(brl(5).display(), "R$ 0,05");
    }

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(brl(123_456).display(), "R$ 1.234,56");
        assert_eq!(brl(100_000_000).display(), "R$ 1.000.000,00");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(brl(-1990).display(), "-R$ 19,90");
    }

    #[test]
    fn test_times_and_plus() {
        let line = brl(6990).times(3);
        assert_eq!(line.display(), "R$ 209,70");
        assert_eq!(line.plus(brl(1290)).display(), "R$ 222,60");
    }

    #[test]
    fn test_installment() {
        assert_eq!(brl(6990).installment(10).display(), "R$ 6,99");
        assert_eq!(brl(1000).installment(3).display(), "R$ 3,33");
        assert_eq!(brl(1000).installment(0), brl(1000));
    }

    #[test]
    fn test_display_trait_matches_display() {
        let price = brl(2990);
        assert_eq!(format!("{price}"), price.display());
    }
}
