//! Display formatting for the product page.

use vitrine_core::Price;
use vitrine_core::types::postal_code::digits_only;

/// Format postal-code input as the shopper types it.
///
/// Non-digits are dropped. Up to five digits come back as-is; longer input
/// becomes `NNNNN-NNN`, ignoring digits past the eighth. `None` formats as
/// an empty string.
#[must_use]
pub fn format_postal_code(input: Option<&str>) -> String {
    let Some(input) = input else {
        return String::new();
    };

    let digits = digits_only(input);
    if digits.len() <= 5 {
        return digits;
    }

    let (head, tail) = digits.split_at(5);
    let tail = tail.get(..3).unwrap_or(tail);
    format!("{head}-{tail}")
}

/// Format a price as `R$ 1.234,56`.
#[must_use]
pub fn format_price(price: Price) -> String {
    price.display()
}

/// The interest-free installment line, e.g. `Em até 10x de R$ 6,99 sem juros`.
#[must_use]
pub fn installment_label(price: Price, count: u32) -> String {
    format!(
        "Em até {count}x de {} sem juros",
        price.installment(count).display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::CurrencyCode;

    #[test]
    fn test_format_postal_code() {
        assert_eq!(format_postal_code(None), "");
        assert_eq!(format_postal_code(Some("")), "");
        assert_eq!(format_postal_code(Some("013")), "013");
        assert_eq!(format_postal_code(Some("01310")), "01310");
        assert_eq!(format_postal_code(Some("013109")), "01310-9");
        assert_eq!(format_postal_code(Some("01310930")), "01310-930");
        assert_eq!(format_postal_code(Some("01310-930")), "01310-930");
        assert_eq!(format_postal_code(Some("0131093012")), "01310-930");
        assert_eq!(format_postal_code(Some("ab1c2")), "12");
    }

    #[test]
    fn test_price_labels() {
        let price = Price::from_cents(6990, CurrencyCode::BRL);
        assert_eq!(format_price(price), "R$ 69,90");
        assert_eq!(installment_label(price, 10), "Em até 10x de R$ 6,99 sem juros");
    }
}
