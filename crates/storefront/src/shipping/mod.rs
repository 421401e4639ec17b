//! Shipping address lookup and the shipping calculator.
//!
//! The calculator turns what the shopper types into a validated postal code,
//! asks a [`PostalCodeLookup`] for the address, and stores the result under
//! `shippingInfo` so the add-to-cart gate can see it.

mod calculator;
mod viacep;

pub use calculator::{CalculationOutcome, ShippingCalculator};
pub use viacep::ViaCepClient;

use std::future::Future;

use thiserror::Error;
use vitrine_core::{PostalCode, PostalCodeError, ShippingInfo};

/// Errors that can occur when resolving a postal code.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The input is not an eight-digit postal code. No request was made.
    #[error("Invalid postal code: {0}")]
    InvalidInput(#[from] PostalCodeError),

    /// The service does not know this postal code.
    #[error("Postal code not found: {0}")]
    NotFound(PostalCode),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an error status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl LookupError {
    /// Short message for the shopper.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "CEP inválido",
            Self::NotFound(_) => "CEP não encontrado",
            Self::Http(_) | Self::Api { .. } | Self::Parse(_) => "Erro ao buscar o CEP",
        }
    }
}

/// Resolves a postal code to an address.
pub trait PostalCodeLookup: Send + Sync {
    /// Look up `code`.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::NotFound` for unknown codes, or a transport
    /// error.
    fn lookup(
        &self,
        code: &PostalCode,
    ) -> impl Future<Output = Result<ShippingInfo, LookupError>> + Send;
}
