//! The product sold on the page.

use vitrine_core::{
    CurrencyCode, Price, Product, ProductId, ProductVariant, ProductVariants, VariantId,
};

/// Gallery images per color; images are grouped by color in variant order.
pub const IMAGES_PER_COLOR: usize = 2;

/// The single product on the page.
#[must_use]
pub fn default_product() -> Product {
    Product {
        id: ProductId::new("1"),
        name: "Camiseta Básica Premium".to_string(),
        description: "Camiseta de algodão 100% com acabamento premium, caimento \
                      regular e gola reforçada. Confortável para o dia a dia."
            .to_string(),
        price: Price::from_cents(6990, CurrencyCode::BRL),
        images: [
            "black-tshirt-1",
            "black-tshirt-2",
            "white-tshirt-1",
            "white-tshirt-3",
            "blue-tshirt-1",
            "blue-tshirt-2",
        ]
        .into_iter()
        .map(|name| format!("/images/{name}.jpg"))
        .collect(),
        variants: ProductVariants {
            colors: vec![
                variant("color-1", "Preto", "#000000"),
                variant("color-2", "Branco", "#FFFFFF"),
                variant("color-3", "Azul", "#0047AB"),
            ],
            sizes: ["PP", "P", "M", "G", "GG", "XG"]
                .into_iter()
                .enumerate()
                .map(|(i, size)| variant(&format!("size-{}", i + 1), size, size))
                .collect(),
        },
    }
}

/// Gallery images for a color, or the first color's images when the color is
/// not in the catalog.
#[must_use]
pub fn images_for_color<'a>(product: &'a Product, color: &VariantId) -> &'a [String] {
    let position = product
        .variants
        .position(vitrine_core::VariantKind::Color, color)
        .unwrap_or(0);
    let start = (position * IMAGES_PER_COLOR).min(product.images.len());
    let end = (start + IMAGES_PER_COLOR).min(product.images.len());
    product.images.get(start..end).unwrap_or(&[])
}

fn variant(id: &str, name: &str, value: &str) -> ProductVariant {
    ProductVariant {
        id: VariantId::new(id),
        name: name.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let product = default_product();
        assert_eq!(product.price.display(), "R$ 69,90");
        assert_eq!(product.images.len(), 6);
        assert_eq!(product.variants.colors.len(), 3);
        let sizes: Vec<_> = product.variants.sizes.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(sizes, ["PP", "P", "M", "G", "GG", "XG"]);
        assert_eq!(product.variants.sizes[2].id.as_str(), "size-3");
    }

    #[test]
    fn test_images_filtered_by_color() {
        let product = default_product();
        let white = images_for_color(&product, &VariantId::new("color-2"));
        assert_eq!(white, &product.images[2..4]);
        let blue = images_for_color(&product, &VariantId::new("color-3"));
        assert_eq!(blue, &product.images[4..6]);
        let unknown = images_for_color(&product, &VariantId::new("color-9"));
        assert_eq!(unknown, &product.images[0..2]);
    }
}
