//! ViaCEP postal-code lookup client.
//!
//! Queries `{base_url}/{digits}/json/` and caches resolved addresses using
//! `moka`. Not-found answers are not cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Deserialize;
use tracing::{debug, instrument};
use vitrine_core::{PostalCode, ShippingInfo};

use super::{LookupError, PostalCodeLookup};
use crate::config::LookupConfig;

/// Request timeout for lookups.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the ViaCEP address service.
#[derive(Clone)]
pub struct ViaCepClient {
    inner: Arc<ViaCepClientInner>,
}

struct ViaCepClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<PostalCode, ShippingInfo>,
}

impl std::fmt::Debug for ViaCepClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViaCepClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

/// Response body. Unknown codes come back as `{"erro": true}`.
#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    erro: Option<serde_json::Value>,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
}

impl ViaCepResponse {
    fn is_not_found(&self) -> bool {
        match &self.erro {
            None | Some(serde_json::Value::Null | serde_json::Value::Bool(false)) => false,
            Some(serde_json::Value::String(s)) => s != "false",
            Some(_) => true,
        }
    }

    fn into_shipping_info(self, code: &PostalCode) -> Result<ShippingInfo, LookupError> {
        if self.is_not_found() {
            return Err(LookupError::NotFound(code.clone()));
        }
        Ok(ShippingInfo {
            postal_code: code.clone(),
            street: self.logradouro,
            district: self.bairro,
            city: self.localidade,
            state: self.uf,
        })
    }
}

impl ViaCepClient {
    /// Create a new ViaCEP client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ViaCepClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                cache,
            }),
        })
    }

    async fn fetch(&self, code: &PostalCode) -> Result<ShippingInfo, LookupError> {
        let url = format!("{}/{}/json/", self.inner.base_url, code.as_str());

        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LookupError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ViaCepResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Parse(e.to_string()))?;

        body.into_shipping_info(code)
    }
}

impl PostalCodeLookup for ViaCepClient {
    #[instrument(skip(self), fields(postal_code = %code))]
    async fn lookup(&self, code: &PostalCode) -> Result<ShippingInfo, LookupError> {
        if let Some(info) = self.inner.cache.get(code).await {
            debug!("Cache hit for postal code");
            return Ok(info);
        }

        let info = self.fetch(code).await?;
        debug!(city = %info.city, "Resolved postal code");

        self.inner.cache.insert(code.clone(), info.clone()).await;
        Ok(info)
    }
}
