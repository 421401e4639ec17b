//! Read-modify-write access to the persisted cart.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use vitrine_core::{CartItemId, CartLineItem, NewCartItem, Quantity};

use crate::storage::{ExpiringStore, keys};

/// The cart as seen at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveCart {
    /// Items inside the recency window, in insertion order.
    pub items: Vec<CartLineItem>,
    /// How many expired or unreadable items this read removed from storage.
    pub pruned: usize,
}

impl ActiveCart {
    /// Whether this read removed anything from storage.
    #[must_use]
    pub const fn was_pruned(&self) -> bool {
        self.pruned > 0
    }
}

/// How to find the item to remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalKey {
    /// The item with this ID.
    Id(CartItemId),
    /// The first item with these attributes, for legacy items without an ID.
    Attributes {
        color: String,
        size: String,
        quantity: Quantity,
    },
}

impl RemovalKey {
    /// The key that identifies `item`: its ID when it has one.
    #[must_use]
    pub fn for_item(item: &CartLineItem) -> Self {
        item.id.clone().map_or_else(
            || Self::Attributes {
                color: item.color.clone(),
                size: item.size.clone(),
                quantity: item.quantity,
            },
            Self::Id,
        )
    }

    fn matches(&self, item: &CartLineItem) -> bool {
        match self {
            Self::Id(id) => item.id.as_ref() == Some(id),
            Self::Attributes {
                color,
                size,
                quantity,
            } => item.color == *color && item.size == *size && item.quantity == *quantity,
        }
    }
}

/// Persisted cart line items under the `cartItems` key.
///
/// Every read-modify-write runs while holding one lock, so concurrent
/// mutations through the same repository never lose each other's writes.
/// Write failures are logged by the store; the repository still returns the
/// state it tried to write.
#[derive(Debug)]
pub struct CartRepository {
    store: Arc<ExpiringStore>,
    window: Duration,
    write_lock: Mutex<()>,
}

impl CartRepository {
    /// Create a repository whose items stay active for `window` after being
    /// added.
    #[must_use]
    pub fn new(store: Arc<ExpiringStore>, window: Duration) -> Self {
        Self {
            store,
            window,
            write_lock: Mutex::new(()),
        }
    }

    /// Current time according to the store's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.store.now()
    }

    /// How long items stay active.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Append a new item with a fresh ID and the current time.
    #[instrument(skip(self, item), fields(color = %item.color, size = %item.size))]
    pub fn add_item(&self, item: NewCartItem) -> CartLineItem {
        let _guard = self.lock();
        // Stored timestamps have millisecond precision
        let now = self.store.now().trunc_subsecs(3);
        let line = CartLineItem::from_new(item, CartItemId::generate(now), now);

        let mut items = self.raw_items();
        items.push(line.clone());
        self.persist(&items);

        info!(item_id = ?line.id, quantity = line.quantity.get(), "Added cart item");
        line
    }

    /// Items added within the window before `now`.
    ///
    /// Expired and unreadable items are removed from storage as a side
    /// effect.
    pub fn list_active(&self, now: DateTime<Utc>) -> ActiveCart {
        let _guard = self.lock();
        let (items, unreadable) = self.load();
        let (items, expired) = self.partition(items, now);
        let pruned = expired + unreadable;
        if pruned > 0 {
            debug!(pruned, "Pruning expired cart items");
            self.persist(&items);
        }
        ActiveCart { items, pruned }
    }

    /// Remove one item and return the remaining active items.
    ///
    /// Attribute keys remove only the first matching item. Expired items are
    /// pruned in the same write.
    #[instrument(skip(self))]
    pub fn remove_item(&self, key: &RemovalKey) -> Vec<CartLineItem> {
        let _guard = self.lock();
        let (items, _) = self.load();
        let (mut items, _) = self.partition(items, self.store.now());

        match items.iter().position(|item| key.matches(item)) {
            Some(index) => {
                let removed = items.remove(index);
                info!(item_id = ?removed.id, "Removed cart item");
            }
            None => debug!("No cart item matched"),
        }

        self.persist(&items);
        items
    }

    /// Remove every item.
    #[instrument(skip(self))]
    pub fn clear(&self) {
        let _guard = self.lock();
        self.persist(&[]);
        info!("Cleared cart");
    }

    /// The list as persisted, expired items included.
    ///
    /// A missing or unreadable list reads as empty; unreadable entries in a
    /// readable list are skipped.
    #[must_use]
    pub fn raw_items(&self) -> Vec<CartLineItem> {
        self.load().0
    }

    /// Decode the stored list entry by entry. Returns the readable items and
    /// how many entries were skipped.
    ///
    /// Items carry their own timestamps, so the list key's expiration is not
    /// applied here; `partition` decides what is expired.
    fn load(&self) -> (Vec<CartLineItem>, usize) {
        let raw = match self.store.get_raw_unchecked(keys::CART_ITEMS) {
            Ok(Some(raw)) => raw,
            Ok(None) => return (Vec::new(), 0),
            Err(e) => {
                warn!(error = %e, "Cannot read cart, treating it as empty");
                return (Vec::new(), 0);
            }
        };

        let entries: Vec<Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable cart");
                return (Vec::new(), 0);
            }
        };

        let total = entries.len();
        let items: Vec<CartLineItem> = entries
            .into_iter()
            .filter_map(|entry| {
                serde_json::from_value(entry)
                    .inspect_err(|e| warn!(error = %e, "Skipping unreadable cart item"))
                    .ok()
            })
            .collect();
        let skipped = total - items.len();
        (items, skipped)
    }

    fn partition(&self, items: Vec<CartLineItem>, now: DateTime<Utc>) -> (Vec<CartLineItem>, usize) {
        let before = items.len();
        let kept: Vec<_> = items
            .into_iter()
            .filter(|item| item.is_active_at(now, self.window))
            .collect();
        let pruned = before - kept.len();
        (kept, pruned)
    }

    fn persist(&self, items: &[CartLineItem]) {
        // Failure is already logged by the store
        let _ = self.store.set(keys::CART_ITEMS, items);
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
