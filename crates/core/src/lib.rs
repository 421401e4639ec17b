//! Vitrine Core - Shared domain types.
//!
//! This crate provides the types shared by every Vitrine component:
//! - `storefront` - Product page state, cart repository and widget synchronization
//! - `cli` - Command-line driver for the product page
//!
//! # Architecture
//!
//! The core crate contains only types - no storage access, no HTTP clients,
//! no clocks. Anything that needs the current time takes it as an argument.
//!
//! # Modules
//!
//! - [`types`] - Cart line items, notifications, postal codes, prices and catalog types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
