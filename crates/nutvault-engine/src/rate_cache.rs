//! Single-flight, TTL-cached BTC/fiat rate lookups (spec §4.3).
//!
//! Mirrors `nutvault-store::pool`'s own hand-rolled `Mutex` + `Notify`
//! waiting pattern rather than pulling in a crate for coalescing: one
//! caller becomes the "leader" and performs the upstream fetch, everyone
//! else waits on the same `Notify` and reads the leader's result.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use nutvault_common::{AppError, ErrorKind};
use tokio::sync::Notify;

/// The only fiat currencies this service quotes.
pub const SUPPORTED_CURRENCIES: &[&str] = &["usd", "eur", "cad", "gbp"];

const TTL: Duration = Duration::from_secs(120);
const UPSTREAM_DEADLINE: Duration = Duration::from_secs(5);

/// One cached rate: sats a caller gets for one unit of `currency`, and when
/// it was fetched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rate {
    pub currency: &'static str,
    pub rate_sats_per_unit: f64,
    pub timestamp_ms: u64,
}

/// Fetches BTC prices in every supported fiat currency in one upstream call.
/// A trait boundary so tests can substitute a fake oracle instead of
/// reaching the network.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Returns BTC's price in each supported currency, keyed by lowercase
    /// currency code (e.g. `"usd" -> 65000.0`).
    async fn fetch_all(&self) -> Result<HashMap<String, f64>, AppError>;
}

/// Hits a public BTC/fiat index (CoinGecko's `simple/price` endpoint) for
/// all four supported currencies in one request.
pub struct HttpPriceOracle {
    http: reqwest::Client,
    base_url: String,
}

impl HttpPriceOracle {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: "https://api.coingecko.com/api/v3/simple/price".to_string(),
        }
    }
}

#[async_trait]
impl PriceOracle for HttpPriceOracle {
    async fn fetch_all(&self) -> Result<HashMap<String, f64>, AppError> {
        let vs_currencies = SUPPORTED_CURRENCIES.join(",");
        let url = format!("{}?ids=bitcoin&vs_currencies={vs_currencies}", self.base_url);

        let response = self
            .http
            .get(&url)
            .timeout(UPSTREAM_DEADLINE)
            .send()
            .await
            .map_err(|e| AppError::connection(format!("rate oracle unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::connection(format!(
                "rate oracle returned HTTP {}",
                response.status()
            )));
        }

        #[derive(serde::Deserialize)]
        struct Response {
            bitcoin: HashMap<String, f64>,
        }
        let parsed: Response = response
            .json()
            .await
            .map_err(|e| AppError::connection(format!("rate oracle returned malformed data: {e}")))?;

        Ok(parsed.bitcoin)
    }
}

#[derive(Debug, Clone)]
struct CachedRate {
    rate_sats_per_unit: f64,
    timestamp_ms: u64,
    fetched_at: std::time::Instant,
}

impl CachedRate {
    fn is_fresh(&self) -> bool {
        self.fetched_at.elapsed() < TTL
    }
}

/// Outcome a single-flight leader hands back to every follower, including
/// itself.
type FetchOutcome = Result<HashMap<String, CachedRate>, AppError>;

struct InFlight {
    notify: Notify,
    result: Mutex<Option<FetchOutcome>>,
}

struct Inner {
    cache: HashMap<String, CachedRate>,
    in_flight: Option<Arc<InFlight>>,
}

/// Process-wide BTC/fiat rate cache with request coalescing.
pub struct RateCache {
    oracle: Box<dyn PriceOracle>,
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for RateCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateCache").finish_non_exhaustive()
    }
}

impl RateCache {
    pub fn new(oracle: impl PriceOracle + 'static) -> Self {
        Self {
            oracle: Box::new(oracle),
            inner: Mutex::new(Inner { cache: HashMap::new(), in_flight: None }),
        }
    }

    /// Returns the cached/fetched rate for `currency` (case-insensitive).
    /// Rejects unsupported currencies before any upstream call.
    pub async fn get_rate(&self, currency: &str) -> Result<Rate, AppError> {
        let lower = currency.to_lowercase();
        let canonical = SUPPORTED_CURRENCIES
            .iter()
            .find(|c| **c == lower)
            .ok_or_else(|| AppError::validation(format!("unsupported currency `{currency}`")))?;

        if let Some(cached) = self.fresh_cached(canonical) {
            return Ok(cached);
        }

        match self.fetch_or_join(canonical).await {
            Ok(rate) => Ok(rate),
            Err(fetch_err) => {
                // Stale-on-error: a cache entry that has aged out of its
                // TTL is still better than a hard failure.
                let stale = self.inner.lock().expect("rate cache mutex poisoned").cache.get(*canonical).cloned();
                match stale {
                    Some(cached) => Ok(Rate {
                        currency: canonical,
                        rate_sats_per_unit: cached.rate_sats_per_unit,
                        timestamp_ms: cached.timestamp_ms,
                    }),
                    None => Err(fetch_err),
                }
            }
        }
    }

    fn fresh_cached(&self, currency: &str) -> Option<Rate> {
        let inner = self.inner.lock().expect("rate cache mutex poisoned");
        inner.cache.get(currency).filter(|c| c.is_fresh()).map(|c| Rate {
            currency,
            rate_sats_per_unit: c.rate_sats_per_unit,
            timestamp_ms: c.timestamp_ms,
        })
    }

    async fn fetch_or_join(&self, currency: &'static str) -> Result<Rate, AppError> {
        let (in_flight, is_leader) = {
            let mut inner = self.inner.lock().expect("rate cache mutex poisoned");
            if let Some(in_flight) = inner.in_flight.clone() {
                (in_flight, false)
            } else {
                let in_flight = Arc::new(InFlight { notify: Notify::new(), result: Mutex::new(None) });
                inner.in_flight = Some(in_flight.clone());
                (in_flight, true)
            }
        };

        let outcome = if is_leader {
            let result = self.oracle.fetch_all().await;
            let outcome = result.map(Self::to_cached_map);

            {
                let mut inner = self.inner.lock().expect("rate cache mutex poisoned");
                if let Ok(fresh) = &outcome {
                    inner.cache.extend(fresh.clone());
                }
                inner.in_flight = None;
            }
            *in_flight.result.lock().expect("in-flight mutex poisoned") = Some(outcome.clone());
            in_flight.notify.notify_waiters();
            outcome
        } else {
            loop {
                let notified = in_flight.notify.notified();
                if let Some(outcome) = in_flight.result.lock().expect("in-flight mutex poisoned").clone() {
                    break outcome;
                }
                notified.await;
            }
        };

        outcome.and_then(|cached| {
            cached.get(currency).map(|c| Rate {
                currency,
                rate_sats_per_unit: c.rate_sats_per_unit,
                timestamp_ms: c.timestamp_ms,
            }).ok_or_else(|| AppError::new(ErrorKind::Connection, format!("rate oracle did not return `{currency}`")))
        })
    }

    fn to_cached_map(prices: HashMap<String, f64>) -> HashMap<String, CachedRate> {
        let timestamp_ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let fetched_at = std::time::Instant::now();
        prices
            .into_iter()
            .map(|(currency, price_in_currency)| {
                let rate_sats_per_unit = 100_000_000.0 / price_in_currency;
                (currency, CachedRate { rate_sats_per_unit, timestamp_ms, fetched_at })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingOracle {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceOracle for CountingOracle {
        async fn fetch_all(&self) -> Result<HashMap<String, f64>, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok(HashMap::from([
                ("usd".to_string(), 65_000.0),
                ("eur".to_string(), 60_000.0),
                ("cad".to_string(), 88_000.0),
                ("gbp".to_string(), 51_000.0),
            ]))
        }
    }

    #[tokio::test]
    async fn rejects_unsupported_currency_before_any_fetch() {
        let cache = RateCache::new(CountingOracle { calls: AtomicUsize::new(0) });
        let err = cache.get_rate("jpy").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn concurrent_calls_coalesce_into_one_upstream_fetch() {
        let oracle = Arc::new(CountingOracle { calls: AtomicUsize::new(0) });
        let cache = Arc::new(RateCache::new_with_arc(oracle.clone()));

        let (a, b) = tokio::join!(cache.get_rate("usd"), cache.get_rate("usd"));
        let a = a.unwrap();
        let b = b.unwrap();

        assert_eq!(a.timestamp_ms, b.timestamp_ms);
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn warming_one_currency_warms_all_of_them() {
        let oracle = Arc::new(CountingOracle { calls: AtomicUsize::new(0) });
        let cache = RateCache::new_with_arc(oracle.clone());

        cache.get_rate("usd").await.unwrap();
        let eur = cache.get_rate("eur").await.unwrap();

        assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
        assert_eq!(eur.currency, "eur");
    }

    impl RateCache {
        fn new_with_arc(oracle: Arc<CountingOracle>) -> Self {
            struct Wrapper(Arc<CountingOracle>);
            #[async_trait]
            impl PriceOracle for Wrapper {
                async fn fetch_all(&self) -> Result<HashMap<String, f64>, AppError> {
                    self.0.fetch_all().await
                }
            }
            RateCache::new(Wrapper(oracle))
        }
    }
}
