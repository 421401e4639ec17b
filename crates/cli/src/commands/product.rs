//! Product page and variant selection commands.
//!
//! # Usage
//!
//! ```bash
//! vitrine product
//! vitrine color Branco
//! vitrine size size-5
//! vitrine quantity inc
//! vitrine image 1
//! ```

use vitrine_storefront::error::AppError;
use vitrine_storefront::product::ProductPage;
use vitrine_storefront::state::AppState;

use super::say;

/// Print the product, the current selection and the shipping address.
pub fn show(state: &AppState) {
    let page = ProductPage::new(state);
    let product = page.product();
    let selection = page.selection();

    say(&product.name);
    say(&product.description);
    say(&page.price_label());
    say(&page.installment_label());
    say("");

    let colors: Vec<&str> = product.variants.colors.iter().map(|c| c.name.as_str()).collect();
    let sizes: Vec<&str> = product.variants.sizes.iter().map(|s| s.name.as_str()).collect();
    say(&format!("Cor:        {} ({})", selection.color_name(), colors.join(", ")));
    say(&format!("Tamanho:    {} ({})", selection.size_name(), sizes.join(", ")));
    say(&format!("Quantidade: {}", selection.quantity()));

    let images = selection.images();
    if let Some(image) = images.get(selection.image_index()) {
        say(&format!(
            "Imagem:     {image} ({}/{})",
            selection.image_index() + 1,
            images.len()
        ));
    }

    match page.shipping_info() {
        Some(info) => say(&format!("Entrega:    {}", info.summary())),
        None => say("Entrega:    calcule o frete para adicionar ao carrinho"),
    }
}

/// Choose a color.
///
/// # Errors
///
/// Returns `AppError::Selection` when the color is not offered.
pub fn color(state: &AppState, value: &str) -> Result<(), AppError> {
    let page = ProductPage::new(state);
    let color = page.selection().select_color(value)?;
    say(&format!("Cor selecionada: {}", color.name));
    Ok(())
}

/// Choose a size.
///
/// # Errors
///
/// Returns `AppError::Selection` when the size is not offered.
pub fn size(state: &AppState, value: &str) -> Result<(), AppError> {
    let page = ProductPage::new(state);
    let size = page.selection().select_size(value)?;
    say(&format!("Tamanho selecionado: {}", size.name));
    Ok(())
}

/// Set, increment or decrement the quantity.
///
/// # Errors
///
/// Returns `AppError::Selection` when `value` is not `inc`, `dec` or a
/// number from 1 to 10.
pub fn quantity(state: &AppState, value: &str) -> Result<(), AppError> {
    let page = ProductPage::new(state);
    let selection = page.selection();
    let quantity = match value {
        "inc" | "+" => selection.increment_quantity(),
        "dec" | "-" => selection.decrement_quantity(),
        input => selection.set_quantity_input(input)?,
    };
    say(&format!("Quantidade: {quantity}"));
    Ok(())
}

/// Show a gallery image of the selected color.
///
/// # Errors
///
/// Returns `AppError::Selection` when `index` is past the color's gallery.
pub fn image(state: &AppState, index: usize) -> Result<(), AppError> {
    let page = ProductPage::new(state);
    let image = page.selection().select_image(index)?;
    say(image);
    Ok(())
}
