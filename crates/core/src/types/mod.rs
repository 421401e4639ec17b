//! Core types for Vitrine.
//!
//! This module provides type-safe wrappers for the storefront's domain concepts.

pub mod cart;
pub mod id;
pub mod notification;
pub mod postal_code;
pub mod price;
pub mod product;
pub mod quantity;
pub mod shipping;

pub use cart::{CartLineItem, NewCartItem};
pub use id::*;
pub use notification::{CART_UPDATED_EVENT, CartAction, ChangeNotification, WidgetId};
pub use postal_code::{PostalCode, PostalCodeError};
pub use price::{CurrencyCode, Price};
pub use product::{Product, ProductVariant, ProductVariants, VariantKind};
pub use quantity::{Quantity, QuantityError};
pub use shipping::{ShippingInfo, ShippingOption};
