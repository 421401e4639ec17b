//! Unified error handling with Sentry breadcrumbs.
//!
//! Storage failures never reach the shopper: the store recovers locally and
//! logs. Lookup and selection failures become short user-facing messages.
//! `AppError` gathers everything for the command-line driver.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::product::SelectionError;
use crate::shipping::LookupError;

/// Errors raised by storage backends and the expiring store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A persisted value is not valid JSON for the requested type.
    #[error("corrupt value under {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// An `_expiration` sibling does not hold an epoch-millisecond timestamp.
    #[error("malformed expiration under {key}: {value:?}")]
    Expiration { key: String, value: String },

    /// A value could not be serialized for writing.
    #[error("cannot serialize value for {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The write would exceed the storage area's quota.
    #[error("quota exceeded writing {key}: need {needed} bytes, quota is {quota}")]
    QuotaExceeded {
        key: String,
        needed: usize,
        quota: usize,
    },

    /// The backing file could not be read or written.
    #[error("storage file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Whether this is a write-side failure (quota, serialization, I/O).
    #[must_use]
    pub const fn is_write_failure(&self) -> bool {
        matches!(
            self,
            Self::Serialize { .. } | Self::QuotaExceeded { .. } | Self::Io { .. }
        )
    }
}

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Postal-code lookup failed.
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// Variant, image or quantity selection was rejected.
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from the shopper.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Short message suitable for showing to the shopper.
    ///
    /// Internal details (storage paths, JSON errors) are not exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Store(_) | Self::Config(_) => "Erro interno, tente novamente".to_string(),
            Self::Lookup(err) => err.user_message().to_string(),
            Self::Selection(err) => err.to_string(),
            Self::NotFound(what) => format!("Não encontrado: {what}"),
            Self::BadRequest(msg) => msg.clone(),
        }
    }

    /// Capture the error to Sentry when it indicates a fault rather than
    /// shopper input.
    pub fn report(&self) {
        if matches!(self, Self::Store(_) | Self::Config(_)) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of cart
/// actions leading up to an error. Without an initialized Sentry client
/// this is a no-op.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Removed item", Some(&[("source", "headerCart")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
