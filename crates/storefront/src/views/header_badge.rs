//! Cart count badge in the page header.

use super::{DriverOptions, SyncedCartView, ViewDriver};
use crate::state::AppState;

/// Widget identity of the header badge.
pub const HEADER_BADGE: &str = "headerBadge";

/// Total quantity across active items, hidden when zero.
///
/// Mounted for the whole page lifetime. Notification bursts are debounced,
/// and a periodic refresh makes items drop off the count as they expire.
#[derive(Debug)]
pub struct HeaderBadge {
    driver: ViewDriver,
}

impl HeaderBadge {
    /// Mount the badge with the debounce and refresh period from the page's
    /// configuration. Must be called within a tokio runtime.
    #[must_use]
    pub fn mount(state: &AppState) -> Self {
        let options = DriverOptions {
            debounce: Some(state.config().badge_debounce),
            refresh_every: Some(state.config().badge_refresh),
        };
        Self {
            driver: ViewDriver::spawn(state.view(HEADER_BADGE), options),
        }
    }

    /// Units in the cart.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.driver.view().total_quantity()
    }

    /// Badge text, or `None` when the badge is hidden.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        match self.count() {
            0 => None,
            n => Some(n.to_string()),
        }
    }

    /// The underlying view.
    #[must_use]
    pub const fn view(&self) -> &SyncedCartView {
        self.driver.view()
    }

    /// Stop tracking the cart.
    pub async fn unmount(self) {
        self.driver.stop().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::views::tests::new_item;

    #[tokio::test(start_paused = true)]
    async fn test_badge_hidden_when_empty() {
        let state = AppState::in_memory(StorefrontConfig::default());
        let badge = HeaderBadge::mount(&state);
        assert_eq!(badge.count(), 0);
        assert_eq!(badge.label(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_badge_follows_other_widgets_after_debounce() {
        let state = AppState::in_memory(StorefrontConfig::default());
        let badge = HeaderBadge::mount(&state);

        state.view("cartPopup").add(new_item("Preto", 2));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(badge.label(), None);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(badge.label().as_deref(), Some("2"));
        badge.unmount().await;
    }
}
