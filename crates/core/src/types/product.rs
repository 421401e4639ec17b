//! Product and variant catalog types.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId, VariantId};

/// A product as shown on the product page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    /// Gallery images, grouped by color in variant order.
    pub images: Vec<String>,
    pub variants: ProductVariants,
}

/// The selectable variant axes of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProductVariants {
    pub colors: Vec<ProductVariant>,
    pub sizes: Vec<ProductVariant>,
}

/// One selectable option on a variant axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub id: VariantId,
    /// Display name (e.g. "Preto", "M").
    pub name: String,
    /// Presentation value (hex color for colors, label for sizes).
    pub value: String,
}

/// Which variant axis an option belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Color,
    Size,
}

impl ProductVariants {
    /// Options on the given axis.
    #[must_use]
    pub fn options(&self, kind: VariantKind) -> &[ProductVariant] {
        match kind {
            VariantKind::Color => &self.colors,
            VariantKind::Size => &self.sizes,
        }
    }

    /// Find an option by ID or by name (case-insensitive).
    #[must_use]
    pub fn find(&self, kind: VariantKind, id_or_name: &str) -> Option<&ProductVariant> {
        self.options(kind).iter().find(|variant| {
            variant.id.as_str() == id_or_name || variant.name.eq_ignore_ascii_case(id_or_name)
        })
    }

    /// Position of an option on its axis.
    #[must_use]
    pub fn position(&self, kind: VariantKind, id: &VariantId) -> Option<usize> {
        self.options(kind).iter().position(|variant| &variant.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variants() -> ProductVariants {
        ProductVariants {
            colors: vec![
                ProductVariant {
                    id: VariantId::new("color-1"),
                    name: "Preto".to_string(),
                    value: "#000000".to_string(),
                },
                ProductVariant {
                    id: VariantId::new("color-2"),
                    name: "Branco".to_string(),
                    value: "#FFFFFF".to_string(),
                },
            ],
            sizes: vec![ProductVariant {
                id: VariantId::new("size-3"),
                name: "M".to_string(),
                value: "M".to_string(),
            }],
        }
    }

    #[test]
    fn test_find_by_id_or_name() {
        let v = variants();
        assert_eq!(
            v.find(VariantKind::Color, "color-2").map(|c| c.name.as_str()),
            Some("Branco")
        );
        assert_eq!(
            v.find(VariantKind::Color, "preto").map(|c| c.id.as_str()),
            Some("color-1")
        );
        assert!(v.find(VariantKind::Size, "GG").is_none());
    }

    #[test]
    fn test_position() {
        let v = variants();
        assert_eq!(
            v.position(VariantKind::Color, &VariantId::new("color-2")),
            Some(1)
        );
        assert_eq!(v.position(VariantKind::Size, &VariantId::new("color-2")), None);
    }
}
