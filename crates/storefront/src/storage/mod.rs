//! Local key-value storage.
//!
//! A single flat namespace of string keys mapped to JSON text, the way a
//! browser's local storage works. Backends only move strings around;
//! [`ExpiringStore`] adds JSON encoding and per-key expiration on top.
//!
//! # Storage layout
//!
//! | Key | Value |
//! |-----|-------|
//! | `cartItems` | array of cart line items |
//! | `cartItem` | last item added by the confirmation popup |
//! | `shippingInfo` | resolved address or `null` |
//! | `selectedColor` / `selectedColorName` | color variant ID / name |
//! | `selectedSize` / `selectedSizeName` | size variant ID / name |
//! | `selectedImageIndex` | gallery position |
//! | `productQuantity` | quantity picker value |
//!
//! Each key has an `<key>_expiration` sibling holding the epoch-millisecond
//! instant after which the value is treated as absent.

mod expiring;
mod file;
mod memory;

pub use expiring::{DEFAULT_TTL_MINUTES, EXPIRATION_SUFFIX, ExpiringStore};
pub use file::FileStorage;
pub use memory::{MemoryStorage, StorageArea};

use crate::error::StoreError;

/// Storage keys shared by the widgets.
pub mod keys {
    /// Cart line items.
    pub const CART_ITEMS: &str = "cartItems";

    /// Item most recently added by the cart confirmation popup.
    pub const CART_ITEM: &str = "cartItem";

    /// Resolved shipping address.
    pub const SHIPPING_INFO: &str = "shippingInfo";

    /// Selected color variant ID.
    pub const SELECTED_COLOR: &str = "selectedColor";

    /// Selected color display name.
    pub const SELECTED_COLOR_NAME: &str = "selectedColorName";

    /// Selected size variant ID.
    pub const SELECTED_SIZE: &str = "selectedSize";

    /// Selected size display name.
    pub const SELECTED_SIZE_NAME: &str = "selectedSizeName";

    /// Selected gallery image.
    pub const SELECTED_IMAGE_INDEX: &str = "selectedImageIndex";

    /// Quantity picker value.
    pub const PRODUCT_QUANTITY: &str = "productQuantity";
}

/// Raw string storage, one flat namespace.
///
/// Each call is atomic: a batch either lands completely or leaves storage as
/// it was, and other browsing contexts see it as one change.
pub trait StorageBackend: Send + Sync {
    /// Read the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the backing medium cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write every `(key, value)` pair, replacing previous values.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::QuotaExceeded` or `StoreError::Io` when the batch
    /// cannot be persisted. Nothing is written in that case.
    fn set_items(&self, entries: &[(&str, &str)]) -> Result<(), StoreError>;

    /// Delete every key in `keys`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the deletion cannot be persisted.
    fn remove_items(&self, keys: &[&str]) -> Result<(), StoreError>;

    /// All keys currently stored, in sorted order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the backing medium cannot be read.
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Write `value` under `key`.
    ///
    /// # Errors
    ///
    /// See [`set_items`](Self::set_items).
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_items(&[(key, value)])
    }

    /// Delete `key`.
    ///
    /// # Errors
    ///
    /// See [`remove_items`](Self::remove_items).
    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.remove_items(&[key])
    }
}
