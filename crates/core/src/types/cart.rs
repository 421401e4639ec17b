//! Cart line items.
//!
//! Line items are persisted as a JSON array under the `cartItems` storage key
//! using camelCase field names, with `addedAt` in epoch milliseconds:
//!
//! ```json
//! [{"id":"item-1700000000000-3f2a9c1b","productName":"Camiseta Básica Premium",
//!   "color":"Preto","size":"M","quantity":2,"postalCode":"01310930",
//!   "addedAt":1700000000000}]
//! ```
//!
//! Items written before IDs existed have no `id`; items without `addedAt`
//! deserialize with the epoch as their timestamp and are therefore always
//! outside any recency window.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{CartItemId, PostalCode, Price, Quantity};

/// One entry in the cart: a chosen variant and quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Unique ID, absent only on legacy data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CartItemId>,
    /// Product display name.
    pub product_name: String,
    /// Color variant name (e.g. "Preto").
    pub color: String,
    /// Size variant name (e.g. "M").
    pub size: String,
    /// Units of this variant.
    pub quantity: Quantity,
    /// Postal code captured when the item was added. Not updated when the
    /// shopper later changes their shipping address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<PostalCode>,
    /// When the item was added.
    #[serde(default, with = "chrono::serde::ts_milliseconds")]
    pub added_at: DateTime<Utc>,
}

impl CartLineItem {
    /// Build a persisted line item from a new item.
    #[must_use]
    pub fn from_new(item: NewCartItem, id: CartItemId, added_at: DateTime<Utc>) -> Self {
        Self {
            id: Some(id),
            product_name: item.product_name,
            color: item.color,
            size: item.size,
            quantity: item.quantity,
            postal_code: item.postal_code,
            added_at,
        }
    }

    /// Whether the item was added strictly after `now - window`.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.added_at > now - window
    }

    /// Price of this line at the given unit price.
    #[must_use]
    pub fn line_total(&self, unit_price: Price) -> Price {
        unit_price.times(self.quantity.get())
    }
}

/// A line item as requested by a widget, before it receives an ID and
/// timestamp from the cart repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartItem {
    /// Product display name.
    pub product_name: String,
    /// Color variant name.
    pub color: String,
    /// Size variant name.
    pub size: String,
    /// Units of this variant.
    pub quantity: Quantity,
    /// Postal code of the current shipping address, if any.
    pub postal_code: Option<PostalCode>,
}
