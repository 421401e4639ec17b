//! Widgets that render the shared cart.
//!
//! Every widget owns a [`SyncedCartView`] tagged with its [`WidgetId`]. The
//! view keeps a local copy of the active items and reloads it when another
//! widget publishes a change or another browsing context writes storage.
//!
//! ```text
//! widget ──mutate──▶ CartRepository ──persist──▶ ExpiringStore
//!    │
//!    └──publish {source: self}──▶ NotificationBus ──▶ other views reload
//!                                                └──▶ own view ignores it
//! ```
//!
//! A prune noticed on mount is broadcast as `pruneExpired`. A prune noticed
//! while reloading in response to an event is not, so two views can never
//! keep re-triggering each other.

mod cart_popup;
mod driver;
mod header_badge;
mod header_popup;

pub use cart_popup::{CART_POPUP, CartConfirmationPopup};
pub use driver::{DriverOptions, ViewDriver};
pub use header_badge::{HEADER_BADGE, HeaderBadge};
pub use header_popup::{HEADER_CART, HeaderCartPopup};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;
use vitrine_core::{CartAction, CartLineItem, ChangeNotification, NewCartItem, Price, WidgetId};

use crate::bus::{BusEvent, NotificationBus};
use crate::cart::{CartRepository, RemovalKey};
use crate::error::add_breadcrumb;

/// Lifecycle of a view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ViewState {
    /// Not mounted; ignores events.
    #[default]
    Detached,
    /// Mounted and tracking the active cart.
    Observing { items: Vec<CartLineItem> },
}

/// Local, self-synchronizing copy of the active cart for one widget.
///
/// Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct SyncedCartView {
    inner: Arc<ViewInner>,
}

#[derive(Debug)]
struct ViewInner {
    id: WidgetId,
    repository: Arc<CartRepository>,
    bus: NotificationBus,
    state: RwLock<ViewState>,
    reloads: AtomicU64,
}

impl SyncedCartView {
    /// Create a detached view for `id`.
    #[must_use]
    pub fn new(id: WidgetId, repository: Arc<CartRepository>, bus: NotificationBus) -> Self {
        Self {
            inner: Arc::new(ViewInner {
                id,
                repository,
                bus,
                state: RwLock::new(ViewState::Detached),
                reloads: AtomicU64::new(0),
            }),
        }
    }

    /// The widget identity used as the notification source.
    #[must_use]
    pub fn id(&self) -> &WidgetId {
        &self.inner.id
    }

    /// The bus this view publishes to.
    #[must_use]
    pub fn bus(&self) -> &NotificationBus {
        &self.inner.bus
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ViewState {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether the view is observing.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        matches!(
            *self.inner.state.read().unwrap_or_else(PoisonError::into_inner),
            ViewState::Observing { .. }
        )
    }

    /// Load the active cart and start observing.
    ///
    /// Mounting an observing view does nothing. If loading pruned expired
    /// items, a `pruneExpired` notification goes out so other views drop
    /// them too.
    pub fn mount(&self) {
        if self.is_mounted() {
            return;
        }

        let cart = self.inner.repository.list_active(self.inner.repository.now());
        let pruned = cart.was_pruned();
        debug!(widget = %self.inner.id, items = cart.items.len(), "Mounted cart view");
        self.set_items(cart.items, true);

        if pruned {
            self.publish(CartAction::PruneExpired);
        }
    }

    /// Stop observing.
    pub fn unmount(&self) {
        *self
            .inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner) = ViewState::Detached;
        debug!(widget = %self.inner.id, "Unmounted cart view");
    }

    /// Whether `event` should make this view reload.
    ///
    /// Detached views never react; observing views ignore their own
    /// notifications.
    #[must_use]
    pub fn reacts_to(&self, event: &BusEvent) -> bool {
        if !self.is_mounted() {
            return false;
        }
        match event {
            BusEvent::CartUpdated(notification) => !notification.is_from(&self.inner.id),
            BusEvent::StorageChanged => true,
        }
    }

    /// Apply a bus event. Returns whether the view reloaded.
    pub fn handle(&self, event: &BusEvent) -> bool {
        if !self.reacts_to(event) {
            return false;
        }
        self.reload()
    }

    /// Reload from the repository without broadcasting. Returns whether the
    /// view was mounted.
    pub fn refresh(&self) -> bool {
        self.reload()
    }

    /// Times this view reloaded in response to events or refreshes.
    #[must_use]
    pub fn reload_count(&self) -> u64 {
        self.inner.reloads.load(Ordering::Relaxed)
    }

    /// Items currently shown; empty when detached.
    #[must_use]
    pub fn items(&self) -> Vec<CartLineItem> {
        match self.state() {
            ViewState::Observing { items } => items,
            ViewState::Detached => Vec::new(),
        }
    }

    /// Sum of quantities across shown items.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.with_items(|items| items.iter().map(|item| item.quantity.get()).sum())
    }

    /// Sum of line totals at `unit_price`.
    #[must_use]
    pub fn subtotal(&self, unit_price: Price) -> Price {
        self.with_items(|items| {
            items.iter().fold(Price::zero(unit_price.currency_code), |sum, item| {
                sum.plus(item.line_total(unit_price))
            })
        })
    }

    /// Add an item and notify the other widgets.
    pub fn add(&self, item: NewCartItem) -> CartLineItem {
        let line = self.inner.repository.add_item(item);
        let cart = self.inner.repository.list_active(self.inner.repository.now());
        self.set_items(cart.items, false);
        self.publish(CartAction::AddItem);
        add_breadcrumb("cart", "Added item", Some(&[("source", self.inner.id.as_str())]));
        line
    }

    /// Remove `item` (by ID, or by attributes for legacy items) and notify
    /// the other widgets. Returns the remaining items.
    pub fn remove(&self, item: &CartLineItem) -> Vec<CartLineItem> {
        let remaining = self
            .inner
            .repository
            .remove_item(&RemovalKey::for_item(item));
        self.set_items(remaining.clone(), false);
        self.publish(CartAction::RemoveItem);
        add_breadcrumb("cart", "Removed item", Some(&[("source", self.inner.id.as_str())]));
        remaining
    }

    /// Remove every item and notify the other widgets.
    pub fn clear(&self) {
        self.inner.repository.clear();
        self.set_items(Vec::new(), false);
        self.publish(CartAction::ClearCart);
        add_breadcrumb("cart", "Cleared cart", Some(&[("source", self.inner.id.as_str())]));
    }

    fn reload(&self) -> bool {
        if !self.is_mounted() {
            return false;
        }
        // Pruning here is not broadcast
        let cart = self.inner.repository.list_active(self.inner.repository.now());
        self.set_items(cart.items, false);
        self.inner.reloads.fetch_add(1, Ordering::Relaxed);
        debug!(widget = %self.inner.id, "Reloaded cart view");
        true
    }

    /// Replace the shown items. Detached views stay detached unless `attach`.
    fn set_items(&self, items: Vec<CartLineItem>, attach: bool) {
        let mut state = self
            .inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if attach || matches!(*state, ViewState::Observing { .. }) {
            *state = ViewState::Observing { items };
        }
    }

    fn with_items<R>(&self, f: impl FnOnce(&[CartLineItem]) -> R) -> R {
        let state = self.inner.state.read().unwrap_or_else(PoisonError::into_inner);
        match &*state {
            ViewState::Observing { items } => f(items),
            ViewState::Detached => f(&[]),
        }
    }

    fn publish(&self, action: CartAction) {
        self.inner
            .bus
            .publish(ChangeNotification::new(self.inner.id.clone(), action));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use vitrine_core::{CurrencyCode, Quantity};

    use crate::clock::ManualClock;
    use crate::storage::{ExpiringStore, MemoryStorage};

    pub(crate) fn new_item(color: &str, quantity: u32) -> NewCartItem {
        NewCartItem {
            product_name: "Camiseta Básica Premium".to_string(),
            color: color.to_string(),
            size: "M".to_string(),
            quantity: Quantity::new(quantity).unwrap(),
            postal_code: None,
        }
    }

    pub(crate) fn fixture() -> (Arc<CartRepository>, NotificationBus, ManualClock) {
        let clock = ManualClock::new(Utc::now());
        let store = Arc::new(ExpiringStore::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(clock.clone()),
        ));
        let repository = Arc::new(CartRepository::new(store, Duration::minutes(15)));
        (repository, NotificationBus::new(), clock)
    }

    fn view(id: &str, repository: &Arc<CartRepository>, bus: &NotificationBus) -> SyncedCartView {
        SyncedCartView::new(WidgetId::new(id), repository.clone(), bus.clone())
    }

    #[test]
    fn test_mount_loads_active_items() {
        let (repository, bus, _) = fixture();
        repository.add_item(new_item("Preto", 2));

        let badge = view("headerBadge", &repository, &bus);
        assert!(badge.items().is_empty());
        badge.mount();
        assert_eq!(badge.total_quantity(), 2);
        assert!(badge.is_mounted());
    }

    #[test]
    fn test_mount_broadcasts_prune() {
        let (repository, bus, clock) = fixture();
        repository.add_item(new_item("Preto", 1));
        clock.advance(Duration::minutes(16));
        let mut events = bus.subscribe();

        view("headerCart", &repository, &bus).mount();
        assert_eq!(
            events.try_next(),
            Some(BusEvent::CartUpdated(ChangeNotification::new(
                WidgetId::new("headerCart"),
                CartAction::PruneExpired
            )))
        );
    }

    #[test]
    fn test_prune_during_reload_is_silent() {
        let (repository, bus, clock) = fixture();
        let badge = view("headerBadge", &repository, &bus);
        badge.mount();
        repository.add_item(new_item("Preto", 1));
        clock.advance(Duration::minutes(16));
        let mut events = bus.subscribe();

        assert!(badge.handle(&BusEvent::StorageChanged));
        assert!(badge.items().is_empty());
        assert_eq!(events.try_next(), None);
    }

    #[test]
    fn test_ignores_own_notifications() {
        let (repository, bus, _) = fixture();
        let popup = view("headerCart", &repository, &bus);
        popup.mount();

        let own = BusEvent::CartUpdated(ChangeNotification::new(
            WidgetId::new("headerCart"),
            CartAction::RemoveItem,
        ));
        let foreign = BusEvent::CartUpdated(ChangeNotification::new(
            WidgetId::new("cartPopup"),
            CartAction::AddItem,
        ));
        assert!(!popup.handle(&own));
        assert!(popup.handle(&foreign));
        assert_eq!(popup.reload_count(), 1);
    }

    #[test]
    fn test_detached_view_ignores_events() {
        let (repository, bus, _) = fixture();
        let popup = view("headerCart", &repository, &bus);
        assert!(!popup.handle(&BusEvent::StorageChanged));

        popup.mount();
        popup.unmount();
        assert!(!popup.handle(&BusEvent::StorageChanged));
        assert_eq!(popup.state(), ViewState::Detached);
    }

    #[test]
    fn test_remove_updates_local_state_then_publishes() {
        let (repository, bus, _) = fixture();
        let popup = view("headerCart", &repository, &bus);
        popup.mount();
        popup.add(new_item("Preto", 1));
        let keep = popup.add(new_item("Azul", 3));
        let mut events = bus.subscribe();

        let target = popup.items()[0].clone();
        let remaining = popup.remove(&target);
        assert_eq!(remaining, vec![keep.clone()]);
        assert_eq!(popup.items(), vec![keep]);
        assert_eq!(
            events.try_next(),
            Some(BusEvent::CartUpdated(ChangeNotification::new(
                WidgetId::new("headerCart"),
                CartAction::RemoveItem
            )))
        );
    }

    #[test]
    fn test_peer_views_converge_and_do_not_loop() {
        let (repository, bus, _) = fixture();
        let badge = view("headerBadge", &repository, &bus);
        let popup = view("headerCart", &repository, &bus);
        badge.mount();
        popup.mount();
        let mut events = bus.subscribe();

        popup.add(new_item("Preto", 2));
        let event = events.try_next().unwrap();
        assert!(badge.handle(&event));
        assert!(!popup.handle(&event));
        assert_eq!(badge.total_quantity(), 2);
        // Reacting published nothing
        assert_eq!(events.try_next(), None);

        popup.clear();
        let event = events.try_next().unwrap();
        badge.handle(&event);
        assert_eq!(badge.total_quantity(), 0);
    }

    #[test]
    fn test_subtotal() {
        let (repository, bus, _) = fixture();
        let popup = view("headerCart", &repository, &bus);
        popup.mount();
        popup.add(new_item("Preto", 2));
        popup.add(new_item("Branco", 1));

        let price = crate::product::default_product().price;
        assert_eq!(popup.subtotal(price).display(), "R$ 209,70");
        assert_eq!(
            view("x", &repository, &bus).subtotal(price),
            Price::zero(CurrencyCode::BRL)
        );
    }
}
