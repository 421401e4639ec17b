//! Product page state.
//!
//! - [`catalog`] - The product on sale and its per-color gallery
//! - [`selection`] - Color, size, image and quantity pickers
//! - [`page`] - Price display and the add-to-cart gate

pub mod catalog;
pub mod page;
pub mod selection;

pub use catalog::{IMAGES_PER_COLOR, default_product, images_for_color};
pub use page::{AddToCartOutcome, INSTALLMENTS, ProductPage};
pub use selection::{ProductSelection, SelectionError};
