//! Variant, image and quantity choices persisted in the local store.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;
use vitrine_core::{
    NewCartItem, Product, ProductVariant, Quantity, QuantityError, ShippingInfo, VariantId,
    VariantKind,
};

use super::catalog::images_for_color;
use crate::storage::{ExpiringStore, keys};

const DEFAULT_COLOR: &str = "color-1";
const DEFAULT_COLOR_NAME: &str = "Preto";
const DEFAULT_SIZE: &str = "M";

/// Errors from the product page's pickers.
#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("Cor indisponível: {0}")]
    UnknownColor(String),

    #[error("Tamanho indisponível: {0}")]
    UnknownSize(String),

    #[error("Imagem {index} não existe (a galeria tem {count})")]
    ImageOutOfRange { index: usize, count: usize },

    #[error("Quantidade inválida: {input:?}")]
    InvalidQuantity {
        input: String,
        #[source]
        source: Option<QuantityError>,
    },
}

/// The shopper's current choices on the product page.
///
/// Reads go to the store every time, so choices expire with their keys and
/// changes made by another page instance are picked up.
#[derive(Debug, Clone)]
pub struct ProductSelection {
    store: Arc<ExpiringStore>,
    product: Product,
}

impl ProductSelection {
    /// Create a selection for `product`.
    #[must_use]
    pub const fn new(store: Arc<ExpiringStore>, product: Product) -> Self {
        Self { store, product }
    }

    /// The selected color, falling back to the first color.
    #[must_use]
    pub fn color(&self) -> Option<&ProductVariant> {
        let id: String = self
            .store
            .get(keys::SELECTED_COLOR, DEFAULT_COLOR.to_string());
        self.product
            .variants
            .find(VariantKind::Color, &id)
            .or_else(|| self.product.variants.colors.first())
    }

    /// Display name stored for the selected color.
    #[must_use]
    pub fn color_name(&self) -> String {
        self.store
            .get(keys::SELECTED_COLOR_NAME, DEFAULT_COLOR_NAME.to_string())
    }

    /// The selected size, falling back to `M`.
    #[must_use]
    pub fn size(&self) -> Option<&ProductVariant> {
        let id: String = self.store.get(keys::SELECTED_SIZE, DEFAULT_SIZE.to_string());
        self.product
            .variants
            .find(VariantKind::Size, &id)
            .or_else(|| self.product.variants.find(VariantKind::Size, DEFAULT_SIZE))
    }

    /// Display name stored for the selected size.
    #[must_use]
    pub fn size_name(&self) -> String {
        self.store
            .get(keys::SELECTED_SIZE_NAME, DEFAULT_SIZE.to_string())
    }

    /// Select a color by ID or name. Resets the gallery to its first image.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError::UnknownColor` if the product has no such color.
    pub fn select_color(&self, id_or_name: &str) -> Result<ProductVariant, SelectionError> {
        let color = self
            .product
            .variants
            .find(VariantKind::Color, id_or_name)
            .cloned()
            .ok_or_else(|| SelectionError::UnknownColor(id_or_name.to_string()))?;

        let _ = self.store.set(keys::SELECTED_COLOR_NAME, &color.name);
        let _ = self.store.set(keys::SELECTED_COLOR, color.id.as_str());
        let _ = self.store.set(keys::SELECTED_IMAGE_INDEX, &0usize);
        debug!(color = %color.id, "Selected color");
        Ok(color)
    }

    /// Select a size by ID or name.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError::UnknownSize` if the product has no such size.
    pub fn select_size(&self, id_or_name: &str) -> Result<ProductVariant, SelectionError> {
        let size = self
            .product
            .variants
            .find(VariantKind::Size, id_or_name)
            .cloned()
            .ok_or_else(|| SelectionError::UnknownSize(id_or_name.to_string()))?;

        let _ = self.store.set(keys::SELECTED_SIZE_NAME, &size.name);
        let _ = self.store.set(keys::SELECTED_SIZE, size.id.as_str());
        debug!(size = %size.id, "Selected size");
        Ok(size)
    }

    /// Gallery images for the selected color.
    #[must_use]
    pub fn images(&self) -> &[String] {
        let color = self
            .color()
            .map_or_else(|| VariantId::new(DEFAULT_COLOR), |c| c.id.clone());
        images_for_color(&self.product, &color)
    }

    /// Position of the shown image within [`images`](Self::images), kept in
    /// bounds.
    #[must_use]
    pub fn image_index(&self) -> usize {
        let index: usize = self.store.get(keys::SELECTED_IMAGE_INDEX, 0);
        index.min(self.images().len().saturating_sub(1))
    }

    /// Show the image at `index` of the filtered gallery.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError::ImageOutOfRange` past the last image.
    pub fn select_image(&self, index: usize) -> Result<&str, SelectionError> {
        let images = self.images();
        let image = images.get(index).ok_or(SelectionError::ImageOutOfRange {
            index,
            count: images.len(),
        })?;
        let _ = self.store.set(keys::SELECTED_IMAGE_INDEX, &index);
        Ok(image.as_str())
    }

    /// The quantity picker value; 1 when unset or out of range.
    #[must_use]
    pub fn quantity(&self) -> Quantity {
        self.store.get(keys::PRODUCT_QUANTITY, Quantity::ONE)
    }

    /// Add one unit, stopping at 10.
    pub fn increment_quantity(&self) -> Quantity {
        self.store_quantity(self.quantity().incremented())
    }

    /// Remove one unit, stopping at 1.
    pub fn decrement_quantity(&self) -> Quantity {
        self.store_quantity(self.quantity().decremented())
    }

    /// Set the quantity from typed input.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError::InvalidQuantity` unless the input is an
    /// integer in `1..=10`; the stored quantity is left unchanged.
    pub fn set_quantity_input(&self, input: &str) -> Result<Quantity, SelectionError> {
        let invalid = |source| SelectionError::InvalidQuantity {
            input: input.to_string(),
            source,
        };
        let value: u32 = input.trim().parse().map_err(|_| invalid(None))?;
        let quantity = Quantity::new(value).map_err(|e| invalid(Some(e)))?;
        Ok(self.store_quantity(quantity))
    }

    /// The line item the current choices describe.
    #[must_use]
    pub fn new_cart_item(&self, shipping: Option<&ShippingInfo>) -> NewCartItem {
        NewCartItem {
            product_name: self.product.name.clone(),
            color: self.color_name(),
            size: self.size_name(),
            quantity: self.quantity(),
            postal_code: shipping.map(|info| info.postal_code.clone()),
        }
    }

    fn store_quantity(&self, quantity: Quantity) -> Quantity {
        let _ = self.store.set(keys::PRODUCT_QUANTITY, &quantity);
        quantity
    }
}
