//! Vitrine Storefront library.
//!
//! Everything behind the single-product page: the expiring key-value store
//! that stands in for browser local storage, the cart repository, the
//! change-notification bus and the synchronized cart widgets built on them.
//!
//! # Architecture
//!
//! ```text
//! widget ──mutate──▶ CartRepository ──persist──▶ ExpiringStore ──▶ StorageBackend
//!    │                                                                  │
//!    └──publish(source = widget)──▶ NotificationBus ◀──storage signal───┘
//!                                        │          (other contexts only)
//!                                        ▼
//!                       every other widget: list_active(now) + re-render
//! ```
//!
//! # Modules
//!
//! - [`storage`] - Storage backends and the TTL-aware store
//! - [`cart`] - Cart repository with the 15-minute recency window
//! - [`bus`] - Same-context `cartUpdated` events and storage-change signals
//! - [`views`] - Synchronized cart view and the three cart widgets
//! - [`product`] - Catalog, variant selection, quantity picker, add-to-cart gate
//! - [`shipping`] - Postal-code lookup and shipping calculator

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod bus;
pub mod cart;
pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod product;
pub mod shipping;
pub mod state;
pub mod storage;
pub mod views;
