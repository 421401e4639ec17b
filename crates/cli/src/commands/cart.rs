//! Cart widget commands.
//!
//! Each command mounts the widget it stands for against the storage file,
//! acts, then unmounts.
//!
//! # Usage
//!
//! ```bash
//! vitrine add
//! vitrine cart
//! vitrine remove item-1718000000000-3f2a9c1b
//! vitrine clear
//! vitrine badge
//! ```

use vitrine_core::{CartItemId, CartLineItem};
use vitrine_storefront::error::AppError;
use vitrine_storefront::product::{AddToCartOutcome, ProductPage};
use vitrine_storefront::state::AppState;
use vitrine_storefront::views::{CartConfirmationPopup, HeaderBadge, HeaderCartPopup};

use super::say;

/// Add the current selection through the confirmation popup.
///
/// # Errors
///
/// Returns `AppError::BadRequest` when no shipping address is stored.
pub async fn add(state: &AppState) -> Result<(), AppError> {
    let page = ProductPage::new(state);
    let mut popup = CartConfirmationPopup::new(state);

    let item = match page.add_to_cart(&mut popup) {
        AddToCartOutcome::Added(item) => item,
        AddToCartOutcome::ShippingRequired => {
            return Err(AppError::BadRequest(
                "Calcule o frete antes de adicionar ao carrinho".to_string(),
            ));
        }
    };

    say("Produto adicionado ao carrinho");
    say(&describe(&item));
    popup.close().await;
    Ok(())
}

/// List active items with line prices and the subtotal.
pub async fn list(state: &AppState) {
    let mut popup = HeaderCartPopup::new(state);
    popup.open();

    let items = popup.items();
    if items.is_empty() {
        say("Seu carrinho está vazio");
    } else {
        for item in &items {
            say(&format!(
                "{:<20} {}  {}",
                item_id(item),
                describe(item),
                popup.line_price(item).display()
            ));
        }
        say(&format!("Subtotal: {}", popup.subtotal().display()));
    }
    popup.close().await;
}

/// Remove one item by id.
///
/// # Errors
///
/// Returns `AppError::NotFound` when no active item has that id.
pub async fn remove(state: &AppState, item_id: &str) -> Result<(), AppError> {
    let mut popup = HeaderCartPopup::new(state);
    popup.open();

    let wanted = CartItemId::new(item_id);
    let Some(item) = popup
        .items()
        .into_iter()
        .find(|item| item.id.as_ref() == Some(&wanted))
    else {
        popup.close().await;
        return Err(AppError::NotFound(item_id.to_string()));
    };

    let emptied = popup.remove(&item).await;
    say(&format!("Removido: {}", describe(&item)));
    if emptied {
        say("Seu carrinho está vazio");
    }
    popup.close().await;
    Ok(())
}

/// Remove every item.
pub async fn clear(state: &AppState) {
    let mut popup = HeaderCartPopup::new(state);
    popup.open();
    popup.clear().await;
    say("Carrinho esvaziado");
}

/// Print the header badge, or nothing when the cart is empty.
pub async fn badge(state: &AppState) {
    let badge = HeaderBadge::mount(state);
    say(&badge.label().unwrap_or_default());
    badge.unmount().await;
}

fn item_id(item: &CartLineItem) -> &str {
    item.id.as_ref().map_or("-", CartItemId::as_str)
}

fn describe(item: &CartLineItem) -> String {
    format!(
        "{} - {} / {} x{}",
        item.product_name, item.color, item.size, item.quantity
    )
}
