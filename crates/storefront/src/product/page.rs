//! The product page: price display and the add-to-cart gate.

use std::sync::Arc;

use tracing::info;
use vitrine_core::{CartLineItem, Product, ShippingInfo};

use super::selection::ProductSelection;
use crate::format::{format_price, installment_label};
use crate::state::AppState;
use crate::storage::{ExpiringStore, keys};
use crate::views::CartConfirmationPopup;

/// Number of interest-free installments advertised.
pub const INSTALLMENTS: u32 = 10;

/// What happened when the shopper pressed "add to cart".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddToCartOutcome {
    /// The confirmation popup opened and added this item.
    Added(CartLineItem),
    /// No shipping address yet; nothing was added.
    ShippingRequired,
}

/// Product page for one browsing context.
#[derive(Debug, Clone)]
pub struct ProductPage {
    product: Product,
    store: Arc<ExpiringStore>,
    selection: ProductSelection,
}

impl ProductPage {
    /// Create the page for the state's product.
    #[must_use]
    pub fn new(state: &AppState) -> Self {
        Self {
            product: state.product().clone(),
            store: state.store().clone(),
            selection: ProductSelection::new(state.store().clone(), state.product().clone()),
        }
    }

    /// The product on sale.
    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    /// The shopper's current choices.
    #[must_use]
    pub const fn selection(&self) -> &ProductSelection {
        &self.selection
    }

    /// Price line, e.g. `R$ 69,90`.
    #[must_use]
    pub fn price_label(&self) -> String {
        format_price(self.product.price)
    }

    /// Installment line, e.g. `Em até 10x de R$ 6,99 sem juros`.
    #[must_use]
    pub fn installment_label(&self) -> String {
        installment_label(self.product.price, INSTALLMENTS)
    }

    /// The resolved shipping address, if one is stored and unexpired.
    #[must_use]
    pub fn shipping_info(&self) -> Option<ShippingInfo> {
        shipping_info(&self.store)
    }

    /// Add the current selection to the cart through `popup`.
    ///
    /// Requires a shipping address with a non-blank postal code; without one
    /// nothing is added.
    pub fn add_to_cart(&self, popup: &mut CartConfirmationPopup) -> AddToCartOutcome {
        let Some(shipping) = self
            .shipping_info()
            .filter(|info| !info.postal_code.as_str().trim().is_empty())
        else {
            info!("Add to cart blocked until shipping is calculated");
            return AddToCartOutcome::ShippingRequired;
        };

        let item = self.selection.new_cart_item(Some(&shipping));
        AddToCartOutcome::Added(popup.open(item))
    }
}

/// Read the stored shipping address.
pub(crate) fn shipping_info(store: &ExpiringStore) -> Option<ShippingInfo> {
    store.get(keys::SHIPPING_INFO, None)
}
