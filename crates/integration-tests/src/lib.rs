//! Integration tests for Vitrine.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p vitrine-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_sync` - Widgets and browsing contexts sharing one cart
//! - `product_page` - Selection persistence and the add-to-cart gate
//! - `shipping_lookup` - The ViaCEP client and calculator against a local fake
//!
//! # Helpers
//!
//! [`TestContext`] owns one storage area and one manual clock; every page it
//! opens is a separate browsing context over that area. [`FakeViaCep`] serves
//! the lookup endpoint on a loopback port.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use vitrine_core::{PostalCode, ShippingInfo};
use vitrine_storefront::clock::ManualClock;
use vitrine_storefront::config::{LookupConfig, StorefrontConfig};
use vitrine_storefront::state::AppState;
use vitrine_storefront::storage::{StorageArea, keys};

/// 2024-06-01T12:00:00Z.
const START_MILLIS: i64 = 1_717_243_200_000;

/// Resolves to Avenida Paulista.
pub const KNOWN_POSTAL_CODE: &str = "01310930";
/// Answered with `{"erro": true}`.
pub const UNKNOWN_POSTAL_CODE: &str = "99999999";
/// Answered with HTTP 500.
pub const FAILING_POSTAL_CODE: &str = "50000000";

/// Shared storage and time for a group of browsing contexts.
#[derive(Debug)]
pub struct TestContext {
    pub area: StorageArea,
    pub clock: ManualClock,
    pub config: StorefrontConfig,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Empty storage, clock frozen at 2024-06-01T12:00:00Z, default config.
    #[must_use]
    pub fn new() -> Self {
        Self {
            area: StorageArea::new(),
            clock: ManualClock::new(start_time()),
            config: StorefrontConfig::default(),
        }
    }

    /// Open a new browsing context on the shared area.
    #[must_use]
    pub fn open_page(&self) -> AppState {
        AppState::browsing_context(&self.area, self.config.clone(), Arc::new(self.clock.clone()))
    }

    /// Move wall-clock time forward.
    pub fn advance_minutes(&self, minutes: i64) {
        self.clock.advance(chrono::Duration::minutes(minutes));
    }
}

/// The address `01310-930` resolves to.
#[must_use]
pub fn paulista() -> ShippingInfo {
    ShippingInfo {
        postal_code: PostalCode::parse(KNOWN_POSTAL_CODE).expect("fixture postal code is valid"),
        street: "Avenida Paulista".to_string(),
        district: "Bela Vista".to_string(),
        city: "São Paulo".to_string(),
        state: "SP".to_string(),
    }
}

/// Store `paulista()` as the page's shipping address.
pub fn store_shipping(state: &AppState) {
    let _ = state.store().set(keys::SHIPPING_INFO, &paulista());
}

fn start_time() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(START_MILLIS).unwrap_or_default()
}

/// Local stand-in for the ViaCEP service.
///
/// Serves `GET /ws/{cep}/json/` and counts requests. The server stops when
/// this value is dropped.
#[derive(Debug)]
pub struct FakeViaCep {
    addr: SocketAddr,
    requests: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl FakeViaCep {
    /// Bind a loopback port and start serving.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if no port can be bound.
    pub async fn start() -> std::io::Result<Self> {
        let requests = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/ws/{cep}/json/", get(lookup))
            .with_state(requests.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            requests,
            task,
        })
    }

    /// Lookup configuration pointing at this server.
    #[must_use]
    pub fn lookup_config(&self) -> LookupConfig {
        LookupConfig {
            base_url: format!("http://{}/ws", self.addr),
            cache_ttl: Duration::from_secs(60),
        }
    }

    /// Requests served so far.
    #[must_use]
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Drop for FakeViaCep {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn lookup(State(requests): State<Arc<AtomicUsize>>, Path(cep): Path<String>) -> Response {
    requests.fetch_add(1, Ordering::SeqCst);

    match cep.as_str() {
        KNOWN_POSTAL_CODE => Json(json!({
            "cep": "01310-930",
            "logradouro": "Avenida Paulista",
            "complemento": "2100",
            "bairro": "Bela Vista",
            "localidade": "São Paulo",
            "uf": "SP",
            "ibge": "3550308"
        }))
        .into_response(),
        FAILING_POSTAL_CODE => {
            (StatusCode::INTERNAL_SERVER_ERROR, "upstream unavailable").into_response()
        }
        UNKNOWN_POSTAL_CODE => Json(json!({ "erro": true })).into_response(),
        _ => Json(json!({ "erro": "true" })).into_response(),
    }
}
