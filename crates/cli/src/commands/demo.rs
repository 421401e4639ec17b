//! Two pages over one storage area.
//!
//! Page A adds an item; page B's header badge picks it up through the
//! storage-change signal. Page B's header cart removes it; page A's badge
//! drops back to empty. Uses in-memory storage, so the storage file and the
//! lookup service are left alone.

use std::sync::Arc;
use std::time::Duration;

use vitrine_core::{PostalCode, ShippingInfo};
use vitrine_storefront::clock::SystemClock;
use vitrine_storefront::config::StorefrontConfig;
use vitrine_storefront::product::{AddToCartOutcome, ProductPage};
use vitrine_storefront::state::AppState;
use vitrine_storefront::storage::{StorageArea, keys};
use vitrine_storefront::views::{CartConfirmationPopup, HeaderBadge, HeaderCartPopup};

use super::say;

/// Run the demonstration.
pub async fn run(config: StorefrontConfig) {
    let settle = config.badge_debounce + Duration::from_millis(50);
    let area = StorageArea::new();
    let page_a = AppState::browsing_context(&area, config.clone(), Arc::new(SystemClock));
    let page_b = AppState::browsing_context(&area, config, Arc::new(SystemClock));

    let badge_a = HeaderBadge::mount(&page_a);
    let badge_b = HeaderBadge::mount(&page_b);
    show_badges(&badge_a, &badge_b);

    if let Ok(postal_code) = PostalCode::parse("01310-930") {
        let _ = page_a.store().set(
            keys::SHIPPING_INFO,
            &ShippingInfo {
                postal_code,
                street: "Avenida Paulista".to_string(),
                district: "Bela Vista".to_string(),
                city: "São Paulo".to_string(),
                state: "SP".to_string(),
            },
        );
    }

    let product_page = ProductPage::new(&page_a);
    let _ = product_page.selection().set_quantity_input("2");
    let mut confirmation = CartConfirmationPopup::new(&page_a);
    if let AddToCartOutcome::Added(item) = product_page.add_to_cart(&mut confirmation) {
        say(&format!(
            "A: adicionado {} / {} x{}",
            item.color, item.size, item.quantity
        ));
    }
    tokio::time::sleep(settle).await;
    show_badges(&badge_a, &badge_b);

    let mut header_cart = HeaderCartPopup::new(&page_b);
    header_cart.open();
    if let Some(item) = header_cart.items().first().cloned() {
        header_cart.remove(&item).await;
        say("B: item removido pelo carrinho do cabeçalho");
    }
    tokio::time::sleep(settle).await;
    show_badges(&badge_a, &badge_b);
    say(&format!(
        "A: item do popup ainda no carrinho: {}",
        confirmation.is_current_in_cart()
    ));

    confirmation.close().await;
    badge_a.unmount().await;
    badge_b.unmount().await;
}

fn show_badges(a: &HeaderBadge, b: &HeaderBadge) {
    let label = |badge: &HeaderBadge| badge.label().unwrap_or_else(|| "-".to_string());
    say(&format!("badge A: {}  badge B: {}", label(a), label(b)));
}
