//! JSON values with per-key expiration over a [`StorageBackend`].

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::StorageBackend;
use crate::clock::Clock;
use crate::error::StoreError;

/// Suffix of the sibling key holding a value's expiration instant.
pub const EXPIRATION_SUFFIX: &str = "_expiration";

/// Default time-to-live for stored values.
pub const DEFAULT_TTL_MINUTES: i64 = 15;

/// Key-value store where every value carries an expiration instant.
///
/// `set` writes the JSON value under `key` and the epoch-millisecond expiry
/// under `key_expiration`. Reads check the expiry first: once the clock is
/// strictly past it both keys are deleted and the value is absent. Values
/// written without an expiry sibling never expire.
pub struct ExpiringStore {
    backend: Arc<dyn StorageBackend>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
}

impl std::fmt::Debug for ExpiringStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiringStore")
            .field("clock", &self.clock)
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

impl ExpiringStore {
    /// Create a store with the default 15-minute TTL.
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>, clock: Arc<dyn Clock>) -> Self {
        Self::with_default_ttl(backend, clock, Duration::minutes(DEFAULT_TTL_MINUTES))
    }

    /// Create a store whose `set` uses `default_ttl`.
    #[must_use]
    pub fn with_default_ttl(
        backend: Arc<dyn StorageBackend>,
        clock: Arc<dyn Clock>,
        default_ttl: Duration,
    ) -> Self {
        Self {
            backend,
            clock,
            default_ttl,
        }
    }

    /// Current time according to the store's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// The store's clock.
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// TTL applied by [`set`](Self::set).
    #[must_use]
    pub const fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Read and decode the value under `key`, or `default` when it is absent,
    /// expired or unreadable.
    ///
    /// Failures are logged at `warn` and never returned.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.try_get(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                warn!(key, error = %e, "Ignoring unreadable stored value");
                default
            }
        }
    }

    /// Read and decode the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Read` when the stored JSON does not decode as `T`,
    /// or a backend error.
    pub fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Read {
                key: key.to_string(),
                source,
            })
    }

    /// Read the raw JSON text under `key`, applying expiration.
    ///
    /// # Errors
    ///
    /// Returns a backend error if storage cannot be read.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        if self.purge_if_expired(key)? {
            return Ok(None);
        }
        self.backend.get_item(key)
    }

    /// Read the raw JSON text under `key` whether or not it has expired.
    ///
    /// For values that carry their own timestamps and prune themselves.
    ///
    /// # Errors
    ///
    /// Returns a backend error if storage cannot be read.
    pub fn get_raw_unchecked(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.backend.get_item(key)
    }

    /// Expiration instant recorded for `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Expiration` when the sibling is not an
    /// epoch-millisecond timestamp, or a backend error.
    pub fn expires_at(&self, key: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
        let expiration_key = expiration_key(key);
        let Some(raw) = self.backend.get_item(&expiration_key)? else {
            return Ok(None);
        };

        raw.trim()
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis)
            .map(Some)
            .ok_or(StoreError::Expiration {
                key: expiration_key,
                value: raw,
            })
    }

    /// Write `value` under `key` with the default TTL.
    ///
    /// The write failure is logged before it is returned; callers that keep
    /// their own copy of the value may ignore it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialize`, `StoreError::QuotaExceeded` or
    /// `StoreError::Io`.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        self.set_with_ttl(key, value, self.default_ttl)
    }

    /// Write `value` under `key`, expiring `ttl` from now.
    ///
    /// # Errors
    ///
    /// See [`set`](Self::set).
    #[instrument(skip(self, value), fields(ttl_secs = ttl.num_seconds()))]
    pub fn set_with_ttl<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let result = self.write(key, value, ttl);
        if let Err(e) = &result {
            warn!(error = %e, "Failed to persist value");
        }
        result
    }

    fn write<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
            key: key.to_string(),
            source,
        })?;
        let expires_at = self.clock.now() + ttl;

        let expiration_key = expiration_key(key);
        let expires_millis = expires_at.timestamp_millis().to_string();
        self.backend.set_items(&[
            (key, json.as_str()),
            (expiration_key.as_str(), expires_millis.as_str()),
        ])?;

        debug!(expires_at = %expires_at, "Stored value");
        Ok(())
    }

    /// Delete `key` and its expiration sibling.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the deletion cannot be persisted.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.backend
            .remove_items(&[key, expiration_key(key).as_str()])
    }

    /// Delete `key` if its expiration has passed. Returns whether it did.
    ///
    /// A malformed expiration sibling counts as expired.
    fn purge_if_expired(&self, key: &str) -> Result<bool, StoreError> {
        let expired = match self.expires_at(key) {
            Ok(Some(at)) => self.clock.now() > at,
            Ok(None) => false,
            Err(e @ StoreError::Expiration { .. }) => {
                warn!(key, error = %e, "Treating malformed expiration as expired");
                true
            }
            Err(e) => return Err(e),
        };

        if expired {
            debug!(key, "Stored value expired");
            self.remove(key)?;
        }
        Ok(expired)
    }
}

fn expiration_key(key: &str) -> String {
    format!("{key}{EXPIRATION_SUFFIX}")
}
