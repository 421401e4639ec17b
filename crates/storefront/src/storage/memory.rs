//! In-memory storage shared between browsing contexts.
//!
//! A [`StorageArea`] is the origin-wide map every page instance of the shop
//! sees. Each page instance opens its own [`MemoryStorage`] handle on the
//! area. A successful write through one handle raises the storage-change
//! signal on the bus of every *other* attached handle, never on the writer's
//! own bus.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use super::StorageBackend;
use crate::bus::NotificationBus;
use crate::error::StoreError;

/// Origin-wide storage map with an optional byte quota.
///
/// Cheap to clone; clones refer to the same area.
#[derive(Clone, Default)]
pub struct StorageArea {
    inner: Arc<AreaInner>,
}

#[derive(Default)]
struct AreaInner {
    items: RwLock<BTreeMap<String, String>>,
    /// Maximum total bytes of keys plus values, if limited.
    quota: Option<usize>,
    contexts: RwLock<Vec<AttachedContext>>,
    next_context: AtomicU64,
}

struct AttachedContext {
    id: u64,
    bus: NotificationBus,
}

impl StorageArea {
    /// Create an empty, unlimited storage area.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty storage area limited to `bytes` of keys plus values.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            inner: Arc::new(AreaInner {
                quota: Some(bytes),
                ..AreaInner::default()
            }),
        }
    }

    /// Open a handle that receives storage-change signals on `bus` whenever
    /// another handle writes.
    #[must_use]
    pub fn attach(&self, bus: &NotificationBus) -> MemoryStorage {
        let id = self.next_context_id();
        self.inner
            .contexts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(AttachedContext {
                id,
                bus: bus.clone(),
            });
        debug!(context = id, "Attached browsing context to storage area");

        MemoryStorage {
            area: self.clone(),
            context: id,
        }
    }

    /// Open a handle that does not listen for other contexts' writes.
    ///
    /// Its own writes still signal attached contexts.
    #[must_use]
    pub fn open(&self) -> MemoryStorage {
        MemoryStorage {
            area: self.clone(),
            context: self.next_context_id(),
        }
    }

    /// Total bytes of keys plus values currently stored.
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.inner
            .items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }

    fn next_context_id(&self) -> u64 {
        self.inner.next_context.fetch_add(1, Ordering::Relaxed)
    }

    /// Raise the storage-change signal in every context except `writer`.
    fn signal_others(&self, writer: u64) {
        let contexts = self
            .inner
            .contexts
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        for context in contexts.iter().filter(|c| c.id != writer) {
            context.bus.signal_storage_change();
        }
    }

    fn detach(&self, context: u64) {
        self.inner
            .contexts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|c| c.id != context);
    }
}

impl std::fmt::Debug for StorageArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageArea")
            .field("quota", &self.inner.quota)
            .field("used_bytes", &self.used_bytes())
            .finish_non_exhaustive()
    }
}

/// One browsing context's handle on a [`StorageArea`].
///
/// Dropping the handle detaches the context from storage-change signals.
#[derive(Debug)]
pub struct MemoryStorage {
    area: StorageArea,
    context: u64,
}

impl MemoryStorage {
    /// A private, unlimited store with no other contexts.
    #[must_use]
    pub fn new() -> Self {
        StorageArea::new().open()
    }

    /// The storage area this handle writes to.
    #[must_use]
    pub const fn area(&self) -> &StorageArea {
        &self.area
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MemoryStorage {
    fn drop(&mut self) {
        self.area.detach(self.context);
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .area
            .inner
            .items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set_items(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        {
            let mut items = self
                .area
                .inner
                .items
                .write()
                .unwrap_or_else(PoisonError::into_inner);

            if let Some(quota) = self.area.inner.quota {
                check_quota(&items, entries, quota)?;
            }

            for &(key, value) in entries {
                items.insert(key.to_string(), value.to_string());
            }
        }

        if !entries.is_empty() {
            self.area.signal_others(self.context);
        }
        Ok(())
    }

    fn remove_items(&self, keys: &[&str]) -> Result<(), StoreError> {
        let removed = {
            let mut items = self
                .area
                .inner
                .items
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            keys.iter().filter(|key| items.remove(**key).is_some()).count()
        };

        if removed > 0 {
            self.area.signal_others(self.context);
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .area
            .inner
            .items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect())
    }
}

/// Fail with the first key whose write would push the area past `quota`.
fn check_quota(
    items: &BTreeMap<String, String>,
    entries: &[(&str, &str)],
    quota: usize,
) -> Result<(), StoreError> {
    let mut needed: usize = items.iter().map(|(k, v)| k.len() + v.len()).sum();
    let mut staged: BTreeMap<&str, &str> = BTreeMap::new();

    for &(key, value) in entries {
        let replaced = staged
            .get(key)
            .copied()
            .or_else(|| items.get(key).map(String::as_str))
            .map_or(0, |old| key.len() + old.len());
        needed = needed - replaced + key.len() + value.len();
        if needed > quota {
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
                needed,
                quota,
            });
        }
        staged.insert(key, value);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::bus::BusEvent;

    #[test]
    fn test_set_get_remove() {
        let storage = MemoryStorage::new();
        storage.set_item("productQuantity", "2").unwrap();
        assert_eq!(storage.get_item("productQuantity").unwrap().as_deref(), Some("2"));

        storage.remove_item("productQuantity").unwrap();
        assert_eq!(storage.get_item("productQuantity").unwrap(), None);
        // Removing again is fine
        storage.remove_item("productQuantity").unwrap();
    }

    #[test]
    fn test_keys_sorted() {
        let storage = MemoryStorage::new();
        storage.set_item("b", "1").unwrap();
        storage.set_item("a", "1").unwrap();
        assert_eq!(storage.keys().unwrap(), ["a", "b"]);
    }

    #[test]
    fn test_quota_rejects_write_and_keeps_previous_value() {
        let area = StorageArea::with_quota(10);
        let storage = area.open();
        storage.set_item("k", "12345").unwrap();

        let err = storage.set_item("k", "1234567890").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { needed: 11, quota: 10, .. }));
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("12345"));
        assert_eq!(area.used_bytes(), 6);
    }

    #[test]
    fn test_quota_counts_replacement_not_addition() {
        let storage = StorageArea::with_quota(6).open();
        storage.set_item("k", "12345").unwrap();
        storage.set_item("k", "54321").unwrap();
    }

    #[test]
    fn test_write_signals_other_contexts_only() {
        let area = StorageArea::new();
        let bus_a = NotificationBus::new();
        let bus_b = NotificationBus::new();
        let tab_a = area.attach(&bus_a);
        let _tab_b = area.attach(&bus_b);
        let mut events_a = bus_a.subscribe();
        let mut events_b = bus_b.subscribe();

        tab_a.set_item("cartItems", "[]").unwrap();

        assert_eq!(events_b.try_next(), Some(BusEvent::StorageChanged));
        assert_eq!(events_a.try_next(), None);
    }

    #[test]
    fn test_dropped_context_is_detached() {
        let area = StorageArea::new();
        let bus = NotificationBus::new();
        let writer = area.open();
        let tab = area.attach(&bus);
        let mut events = bus.subscribe();
        drop(tab);

        writer.set_item("cartItems", "[]").unwrap();
        assert_eq!(events.try_next(), None);
    }

    #[test]
    fn test_batch_write_is_all_or_nothing() {
        let area = StorageArea::with_quota(20);
        let storage = area.open();

        let err = storage
            .set_items(&[("k", "\"01234567\""), ("k_expiration", "1700000900000")])
            .unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { ref key, .. } if key == "k_expiration"));
        assert_eq!(storage.get_item("k").unwrap(), None);
        assert_eq!(area.used_bytes(), 0);
    }

    #[test]
    fn test_batch_signals_once() {
        let area = StorageArea::new();
        let bus = NotificationBus::new();
        let writer = area.open();
        let _tab = area.attach(&bus);
        let mut events = bus.subscribe();

        writer
            .set_items(&[("cartItems", "[]"), ("cartItems_expiration", "1")])
            .unwrap();
        assert_eq!(events.try_next(), Some(BusEvent::StorageChanged));
        assert_eq!(events.try_next(), None);

        writer.remove_items(&["cartItems", "cartItems_expiration"]).unwrap();
        assert_eq!(events.try_next(), Some(BusEvent::StorageChanged));
        assert_eq!(events.try_next(), None);
    }

    #[test]
    fn test_removing_missing_key_does_not_signal() {
        let area = StorageArea::new();
        let bus = NotificationBus::new();
        let writer = area.open();
        let _tab = area.attach(&bus);
        let mut events = bus.subscribe();

        writer.remove_item("nothing-here").unwrap();
        assert_eq!(events.try_next(), None);
    }
}
