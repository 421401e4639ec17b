//! Confirmation shown after "add to cart".

use std::sync::Arc;

use tracing::info;
use vitrine_core::{CartLineItem, NewCartItem};

use super::{DriverOptions, SyncedCartView, ViewDriver};
use crate::state::AppState;
use crate::storage::{ExpiringStore, keys};

/// Widget identity of the cart confirmation popup.
pub const CART_POPUP: &str = "cartPopup";

/// Opening the popup adds the chosen item to the cart; its remove button
/// takes that item back out and closes.
#[derive(Debug)]
pub struct CartConfirmationPopup {
    view: SyncedCartView,
    store: Arc<ExpiringStore>,
    current: Option<CartLineItem>,
    driver: Option<ViewDriver>,
}

impl CartConfirmationPopup {
    /// Create a closed popup.
    #[must_use]
    pub fn new(state: &AppState) -> Self {
        Self {
            view: state.view(CART_POPUP),
            store: state.store().clone(),
            current: None,
            driver: None,
        }
    }

    /// Open the popup, adding `item` to the cart and remembering it under
    /// `cartItem`. Must be called within a tokio runtime.
    pub fn open(&mut self, item: NewCartItem) -> CartLineItem {
        if self.driver.is_none() {
            self.driver = Some(ViewDriver::spawn(
                self.view.clone(),
                DriverOptions::default(),
            ));
        }

        let line = self.view.add(item);
        let _ = self.store.set(keys::CART_ITEM, &line);
        info!(item_id = ?line.id, "Opened cart confirmation");

        self.current = Some(line.clone());
        line
    }

    /// Close the popup.
    pub async fn close(&mut self) {
        self.current = None;
        if let Some(driver) = self.driver.take() {
            driver.stop().await;
        }
    }

    /// Whether the popup is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.driver.is_some()
    }

    /// The item this popup added.
    #[must_use]
    pub const fn current(&self) -> Option<&CartLineItem> {
        self.current.as_ref()
    }

    /// Whether the item this popup added is still in the cart.
    ///
    /// It may have been removed by another widget or expired.
    #[must_use]
    pub fn is_current_in_cart(&self) -> bool {
        self.current.as_ref().is_some_and(|current| {
            self.view
                .items()
                .iter()
                .any(|item| item.id.is_some() && item.id == current.id)
        })
    }

    /// Remove the item this popup added and close. Returns the remaining
    /// items, or `None` when nothing had been added.
    pub async fn remove(&mut self) -> Option<Vec<CartLineItem>> {
        let current = self.current.take()?;
        let remaining = self.view.remove(&current);
        let _ = self.store.remove(keys::CART_ITEM);
        self.close().await;
        Some(remaining)
    }

    /// The underlying view.
    #[must_use]
    pub const fn view(&self) -> &SyncedCartView {
        &self.view
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::StorefrontConfig;
    use crate::views::tests::new_item;

    #[tokio::test(start_paused = true)]
    async fn test_open_adds_item_and_remembers_it() {
        let state = AppState::in_memory(StorefrontConfig::default());
        let mut popup = CartConfirmationPopup::new(&state);

        let line = popup.open(new_item("Azul", 2));
        assert!(popup.is_open());
        assert!(popup.is_current_in_cart());
        assert_eq!(state.cart().raw_items(), vec![line.clone()]);

        let remembered: Option<CartLineItem> = state.store().get(keys::CART_ITEM, None);
        assert_eq!(remembered, Some(line));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_takes_item_back_out() {
        let state = AppState::in_memory(StorefrontConfig::default());
        let other = state.cart().add_item(new_item("Preto", 1));
        let mut popup = CartConfirmationPopup::new(&state);
        popup.open(new_item("Preto", 1));

        let remaining = popup.remove().await.unwrap();
        assert_eq!(remaining, vec![other]);
        assert!(!popup.is_open());
        assert!(popup.current().is_none());
        assert_eq!(state.store().get_raw(keys::CART_ITEM).unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_without_open_is_noop() {
        let state = AppState::in_memory(StorefrontConfig::default());
        let mut popup = CartConfirmationPopup::new(&state);
        assert!(popup.remove().await.is_none());
    }
}
