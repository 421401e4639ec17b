//! Shipping address and delivery options.

use serde::{Deserialize, Serialize};

use super::{CurrencyCode, PostalCode, Price};

/// Address resolved from a postal code.
///
/// Persisted under the `shippingInfo` storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    /// The postal code that was looked up.
    pub postal_code: PostalCode,
    /// Street (logradouro).
    #[serde(default)]
    pub street: String,
    /// Neighborhood (bairro).
    #[serde(default)]
    pub district: String,
    /// City (localidade).
    #[serde(default)]
    pub city: String,
    /// Two-letter state code (UF).
    #[serde(default)]
    pub state: String,
}

impl ShippingInfo {
    /// One-line address summary, skipping empty parts.
    #[must_use]
    pub fn summary(&self) -> String {
        let locality = match (self.city.is_empty(), self.state.is_empty()) {
            (false, false) => format!("{}/{}", self.city, self.state),
            (false, true) => self.city.clone(),
            (true, false) => self.state.clone(),
            (true, true) => String::new(),
        };

        [self.street.as_str(), self.district.as_str(), locality.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A delivery option offered once the address is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingOption {
    /// Display name.
    pub name: &'static str,
    /// Delivery estimate.
    pub estimate: &'static str,
    /// Cost, or `None` when free.
    pub price: Option<Price>,
}

impl ShippingOption {
    /// The fixed set of options shown for any resolved address.
    #[must_use]
    pub fn standard_options() -> Vec<Self> {
        vec![
            Self {
                name: "Expressa",
                estimate: "1-2 dias úteis",
                price: Some(Price::from_cents(2990, CurrencyCode::BRL)),
            },
            Self {
                name: "Padrão",
                estimate: "3-5 dias úteis",
                price: Some(Price::from_cents(1290, CurrencyCode::BRL)),
            },
            Self {
                name: "Retirar na loja",
                estimate: "Disponível em 24h",
                price: None,
            },
        ]
    }

    /// Cost for display, `Grátis` when free.
    #[must_use]
    pub fn price_label(&self) -> String {
        self.price
            .map_or_else(|| "Grátis".to_string(), |price| price.display())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn info() -> ShippingInfo {
        ShippingInfo {
            postal_code: PostalCode::parse("01310-930").unwrap(),
            street: "Avenida Paulista".to_string(),
            district: "Bela Vista".to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
        }
    }

    #[test]
    fn test_summary() {
        assert_eq!(
            info().summary(),
            "Avenida Paulista, Bela Vista, São Paulo/SP"
        );
    }

    #[test]
    fn test_summary_skips_empty_parts() {
        let mut partial = info();
        partial.street.clear();
        partial.district.clear();
        assert_eq!(partial.summary(), "São Paulo/SP");
    }

    #[test]
    fn test_standard_option_labels() {
        let labels: Vec<String> = ShippingOption::standard_options()
            .iter()
            .map(ShippingOption::price_label)
            .collect();
        assert_eq!(labels, ["R$ 29,90", "R$ 12,90", "Grátis"]);
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(info()).unwrap();
        assert_eq!(json["postalCode"], "01310930");
        assert_eq!(json["district"], "Bela Vista");
    }
}
