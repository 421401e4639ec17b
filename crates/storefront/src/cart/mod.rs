//! Cart persistence.
//!
//! Widgets never touch the `cartItems` key directly; they go through
//! [`CartRepository`], which owns ID assignment, the recency window and
//! lazy pruning of expired items.

mod repository;

pub use repository::{ActiveCart, CartRepository, RemovalKey};
