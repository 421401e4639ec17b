//! Shipping calculation command.
//!
//! # Usage
//!
//! ```bash
//! # Resolve a postal code
//! vitrine shipping 01310-930
//!
//! # Show the stored address
//! vitrine shipping
//!
//! # Forget the stored address
//! vitrine shipping --clear
//! ```
//!
//! # Environment Variables
//!
//! - `VIACEP_BASE_URL` - Postal-code lookup service

use vitrine_storefront::error::AppError;
use vitrine_storefront::shipping::{CalculationOutcome, ShippingCalculator, ViaCepClient};
use vitrine_storefront::state::AppState;

use super::say;

/// Resolve, show or clear the shipping address.
///
/// # Errors
///
/// Returns `AppError::Lookup` when the postal code is malformed, unknown or
/// the lookup service fails.
pub async fn run(
    state: &AppState,
    postal_code: Option<&str>,
    clear: bool,
) -> Result<(), AppError> {
    let client = ViaCepClient::new(&state.config().lookup)?;
    let calculator = ShippingCalculator::new(client, state.store().clone());

    if clear {
        calculator.input_changed("");
        say("Endereço de entrega removido");
        return Ok(());
    }

    if let Some(raw) = postal_code {
        calculator.input_changed(raw);
        if let CalculationOutcome::Superseded = calculator.calculate(raw).await? {
            return Ok(());
        }
    }

    match calculator.current() {
        Some(info) => {
            say(&format!("CEP {}", calculator.input()));
            say(&info.summary());
            for option in calculator.options() {
                say(&format!(
                    "  {:<16} {:<18} {}",
                    option.name,
                    option.estimate,
                    option.price_label()
                ));
            }
        }
        None => say("Nenhum endereço de entrega calculado"),
    }
    Ok(())
}
