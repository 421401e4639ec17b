//! The shipping calculator widget.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, instrument, warn};
use vitrine_core::{PostalCode, ShippingInfo, ShippingOption};

use super::{LookupError, PostalCodeLookup};
use crate::error::add_breadcrumb;
use crate::format::format_postal_code;
use crate::product::page::shipping_info;
use crate::storage::{ExpiringStore, keys};

/// Result of a lookup that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalculationOutcome {
    /// The address was stored under `shippingInfo`.
    Resolved(ShippingInfo),
    /// A newer lookup started, the input was cleared, or the calculator was
    /// detached while this one ran. Its result was discarded.
    Superseded,
}

/// Postal-code form that resolves and stores the shipping address.
///
/// Only the most recent lookup may write its result. Lookups are not
/// cancelled; older ones finish and are ignored.
#[derive(Debug)]
pub struct ShippingCalculator<L> {
    lookup: L,
    store: Arc<ExpiringStore>,
    input: RwLock<String>,
    generation: AtomicU64,
    in_flight: AtomicU64,
    attached: AtomicBool,
}

impl<L: PostalCodeLookup> ShippingCalculator<L> {
    /// Create an attached calculator. The input starts with the stored
    /// address's postal code, formatted.
    #[must_use]
    pub fn new(lookup: L, store: Arc<ExpiringStore>) -> Self {
        let input = shipping_info(&store)
            .map(|info| format_postal_code(Some(info.postal_code.as_str())))
            .unwrap_or_default();

        Self {
            lookup,
            store,
            input: RwLock::new(input),
            generation: AtomicU64::new(0),
            in_flight: AtomicU64::new(0),
            attached: AtomicBool::new(true),
        }
    }

    /// Text currently in the postal-code field.
    #[must_use]
    pub fn input(&self) -> String {
        self.input
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The shopper edited the field. Returns the formatted text.
    ///
    /// Emptying the field clears the stored address and discards any lookup
    /// in flight.
    pub fn input_changed(&self, raw: &str) -> String {
        let formatted = format_postal_code(Some(raw));
        self.set_input(formatted.clone());

        if raw.trim().is_empty() {
            self.generation.fetch_add(1, Ordering::SeqCst);
            let _ = self.store.set(keys::SHIPPING_INFO, &None::<ShippingInfo>);
            info!("Cleared shipping address");
        }
        formatted
    }

    /// Resolve `raw` and store the address.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::InvalidInput` without calling the lookup unless
    /// `raw` holds exactly eight digits; otherwise the lookup's error. Failed
    /// lookups leave the stored address untouched.
    #[instrument(skip(self))]
    pub async fn calculate(&self, raw: &str) -> Result<CalculationOutcome, LookupError> {
        let code = PostalCode::parse(raw)?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let result = self.lookup.lookup(&code).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if !self.is_attached() || self.generation.load(Ordering::SeqCst) != generation {
            info!(postal_code = %code, "Discarding stale lookup result");
            return Ok(CalculationOutcome::Superseded);
        }

        match result {
            Ok(info) => {
                let _ = self.store.set(keys::SHIPPING_INFO, &Some(&info));
                self.set_input(info.postal_code.formatted());
                add_breadcrumb(
                    "shipping",
                    "Resolved postal code",
                    Some(&[("city", info.city.as_str())]),
                );
                info!(postal_code = %code, city = %info.city, "Shipping address resolved");
                Ok(CalculationOutcome::Resolved(info))
            }
            Err(e) => {
                warn!(postal_code = %code, error = %e, "Postal code lookup failed");
                Err(e)
            }
        }
    }

    /// Whether a lookup is running.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// The stored address, if any.
    #[must_use]
    pub fn current(&self) -> Option<ShippingInfo> {
        shipping_info(&self.store)
    }

    /// Delivery options, offered once an address is known.
    #[must_use]
    pub fn options(&self) -> Vec<ShippingOption> {
        if self.current().is_some() {
            ShippingOption::standard_options()
        } else {
            Vec::new()
        }
    }

    /// The widget went away; lookups still running will not write.
    pub fn detach(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }

    /// Whether the widget is still on the page.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    fn set_input(&self, value: String) {
        *self.input.write().unwrap_or_else(PoisonError::into_inner) = value;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use super::*;
    use crate::clock::SystemClock;
    use crate::storage::MemoryStorage;

    /// Answers after 100 ms per unit of the first digit. Codes ending in
    /// `000` are unknown.
    #[derive(Default)]
    struct FakeLookup {
        calls: AtomicUsize,
    }

    impl PostalCodeLookup for FakeLookup {
        async fn lookup(&self, code: &PostalCode) -> Result<ShippingInfo, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let delay = code.as_str().chars().next().and_then(|c| c.to_digit(10)).unwrap();
            tokio::time::sleep(Duration::from_millis(u64::from(delay) * 100)).await;

            if code.as_str().ends_with("000") {
                return Err(LookupError::NotFound(code.clone()));
            }
            Ok(ShippingInfo {
                postal_code: code.clone(),
                street: String::new(),
                district: String::new(),
                city: format!("Cidade {}", code.as_str()),
                state: "SP".to_string(),
            })
        }
    }

    fn calculator() -> ShippingCalculator<FakeLookup> {
        let store = Arc::new(ExpiringStore::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(SystemClock),
        ));
        ShippingCalculator::new(FakeLookup::default(), store)
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_input_skips_lookup() {
        let calc = calculator();
        let err = calc.calculate("123").await.unwrap_err();
        assert!(matches!(err, LookupError::InvalidInput(_)));
        assert_eq!(err.user_message(), "CEP inválido");
        assert_eq!(calc.lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolved_address_is_stored() {
        let calc = calculator();
        assert!(calc.options().is_empty());

        let outcome = calc.calculate("01310930").await.unwrap();
        let CalculationOutcome::Resolved(info) = outcome else {
            panic!("expected a resolved address");
        };
        assert_eq!(calc.current(), Some(info));
        assert_eq!(calc.input(), "01310-930");
        assert_eq!(calc.options().len(), 3);
        assert!(!calc.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_leaves_state_untouched() {
        let calc = calculator();
        calc.calculate("01310-930").await.unwrap();

        let err = calc.calculate("01310-000").await.unwrap_err();
        assert_eq!(err.user_message(), "CEP não encontrado");
        assert_eq!(calc.current().unwrap().postal_code.as_str(), "01310930");
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_lookup_supersedes_older() {
        let calc = calculator();
        let (slow, fast) = tokio::join!(calc.calculate("90000-001"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            calc.calculate("10000-001").await
        });

        assert_eq!(slow.unwrap(), CalculationOutcome::Superseded);
        assert!(matches!(fast.unwrap(), CalculationOutcome::Resolved(_)));
        assert_eq!(calc.current().unwrap().postal_code.as_str(), "10000001");
    }

    #[tokio::test(start_paused = true)]
    async fn test_detached_calculator_discards_result() {
        let calc = calculator();
        let (outcome, ()) = tokio::join!(calc.calculate("30000-001"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            calc.detach();
        });

        assert_eq!(outcome.unwrap(), CalculationOutcome::Superseded);
        assert_eq!(calc.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_emptying_input_clears_address() {
        let calc = calculator();
        calc.calculate("01310930").await.unwrap();

        assert_eq!(calc.input_changed("0131"), "0131");
        assert!(calc.current().is_some());

        assert_eq!(calc.input_changed("  "), "");
        assert_eq!(calc.current(), None);
        assert!(calc.options().is_empty());
    }
}
