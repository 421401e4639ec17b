//! Application state shared across widgets.

use std::sync::Arc;

use vitrine_core::{Product, WidgetId};

use crate::bus::NotificationBus;
use crate::cart::CartRepository;
use crate::clock::{Clock, SystemClock};
use crate::config::StorefrontConfig;
use crate::error::StoreError;
use crate::product::default_product;
use crate::storage::{ExpiringStore, FileStorage, MemoryStorage, StorageArea, StorageBackend};
use crate::views::SyncedCartView;

/// State of one browsing context (one page instance).
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// store, the cart repository and the notification bus every widget on the
/// page shares.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: Arc<ExpiringStore>,
    cart: Arc<CartRepository>,
    bus: NotificationBus,
    product: Product,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `backend` - Storage the page reads and writes
    /// * `clock` - Source of "now" for expiration
    /// * `bus` - The page's notification bus
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        backend: Arc<dyn StorageBackend>,
        clock: Arc<dyn Clock>,
        bus: NotificationBus,
    ) -> Self {
        let store = Arc::new(ExpiringStore::with_default_ttl(backend, clock, config.ttl()));
        let cart = Arc::new(CartRepository::new(store.clone(), config.ttl()));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                cart,
                bus,
                product: default_product(),
            }),
        }
    }

    /// A page over private in-memory storage and the system clock.
    #[must_use]
    pub fn in_memory(config: StorefrontConfig) -> Self {
        Self::new(
            config,
            Arc::new(MemoryStorage::new()),
            Arc::new(SystemClock),
            NotificationBus::new(),
        )
    }

    /// A page over the storage file named in `config`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the file exists but cannot be read.
    pub fn from_config(config: StorefrontConfig) -> Result<Self, StoreError> {
        let backend = FileStorage::open(&config.storage_file)?;
        Ok(Self::new(
            config,
            Arc::new(backend),
            Arc::new(SystemClock),
            NotificationBus::new(),
        ))
    }

    /// A new page attached to a shared storage area.
    ///
    /// Writes made by other pages on the same area raise the storage-change
    /// signal on this page's bus.
    #[must_use]
    pub fn browsing_context(
        area: &StorageArea,
        config: StorefrontConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let bus = NotificationBus::new();
        let backend = area.attach(&bus);
        Self::new(config, Arc::new(backend), clock, bus)
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the expiring key-value store.
    #[must_use]
    pub fn store(&self) -> &Arc<ExpiringStore> {
        &self.inner.store
    }

    /// Get a reference to the cart repository.
    #[must_use]
    pub fn cart(&self) -> &Arc<CartRepository> {
        &self.inner.cart
    }

    /// Get a reference to the page's notification bus.
    #[must_use]
    pub fn bus(&self) -> &NotificationBus {
        &self.inner.bus
    }

    /// Get a reference to the product shown on the page.
    #[must_use]
    pub fn product(&self) -> &Product {
        &self.inner.product
    }

    /// A detached cart view for the widget `id` on this page.
    #[must_use]
    pub fn view(&self, id: &str) -> SyncedCartView {
        SyncedCartView::new(
            WidgetId::new(id),
            self.inner.cart.clone(),
            self.inner.bus.clone(),
        )
    }
}
