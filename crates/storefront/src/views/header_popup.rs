//! Cart dropdown opened from the header.

use vitrine_core::{CartLineItem, Price};

use super::{DriverOptions, SyncedCartView, ViewDriver};
use crate::state::AppState;

/// Widget identity of the header cart popup.
pub const HEADER_CART: &str = "headerCart";

/// Lists the cart while open, with per-line prices and a subtotal.
///
/// The view is mounted only while the popup is open. Removing the last item
/// or clearing the cart closes it.
#[derive(Debug)]
pub struct HeaderCartPopup {
    view: SyncedCartView,
    unit_price: Price,
    driver: Option<ViewDriver>,
}

impl HeaderCartPopup {
    /// Create a closed popup.
    #[must_use]
    pub fn new(state: &AppState) -> Self {
        Self {
            view: state.view(HEADER_CART),
            unit_price: state.product().price,
            driver: None,
        }
    }

    /// Open the popup and start tracking the cart. Must be called within a
    /// tokio runtime.
    pub fn open(&mut self) {
        if self.driver.is_none() {
            self.driver = Some(ViewDriver::spawn(
                self.view.clone(),
                DriverOptions::default(),
            ));
        }
    }

    /// Close the popup.
    pub async fn close(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.stop().await;
        }
    }

    /// Whether the popup is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.driver.is_some()
    }

    /// Items listed; empty while closed.
    #[must_use]
    pub fn items(&self) -> Vec<CartLineItem> {
        self.view.items()
    }

    /// Price of one line.
    #[must_use]
    pub fn line_price(&self, item: &CartLineItem) -> Price {
        item.line_total(self.unit_price)
    }

    /// Sum of all lines.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.view.subtotal(self.unit_price)
    }

    /// The "clear cart" action is offered only with more than one item.
    #[must_use]
    pub fn can_clear(&self) -> bool {
        self.view.items().len() > 1
    }

    /// Remove one item. Returns `true` if the cart became empty and the
    /// popup closed.
    pub async fn remove(&mut self, item: &CartLineItem) -> bool {
        let remaining = self.view.remove(item);
        if remaining.is_empty() {
            self.close().await;
            return true;
        }
        false
    }

    /// Remove every item and close.
    pub async fn clear(&mut self) {
        self.view.clear();
        self.close().await;
    }

    /// The underlying view.
    #[must_use]
    pub const fn view(&self) -> &SyncedCartView {
        &self.view
    }
}
