//! TTL cache decorator over any [`DataPort`].
//!
//! For long-lived callers that embed the library and consolidate repeatedly
//! (a dashboard refreshing every few minutes). The one-shot CLI reads each
//! source once per run and does not wrap its adapter.

use crate::domain::error::PesowatchError;
use crate::domain::observation::{DepositRate, FxQuote, NavRow, Observation};
use crate::ports::data_port::DataPort;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

struct CacheValue<V> {
    value: V,
    expires_at: Instant,
}

/// In-memory map whose entries expire `ttl` after insertion.
pub struct TtlCache<K, V> {
    ttl: Duration,
    inner: Mutex<HashMap<K, CacheValue<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + std::fmt::Debug,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let mut cache = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        match cache.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                log::debug!("cache HIT for {key:?}");
                Some(entry.value.clone())
            }
            Some(_) => {
                log::debug!("cache entry expired for {key:?}");
                cache.remove(key);
                None
            }
            None => {
                log::debug!("cache MISS for {key:?}");
                None
            }
        }
    }

    pub fn put(&self, key: K, value: V) {
        let expires_at = Instant::now() + self.ttl;
        let mut cache = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        cache.insert(key, CacheValue { value, expires_at });
    }

    pub fn clear(&self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        log::debug!("cache CLEAR");
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
    Nav(Vec<String>),
    Fx,
    Inflation,
    Deposits,
    Instruments,
}

#[derive(Clone)]
enum CachedRows {
    Nav(Vec<NavRow>),
    Fx(Vec<FxQuote>),
    Inflation(Vec<Observation>),
    Deposits(Vec<DepositRate>),
    Instruments(Vec<String>),
}

/// Wraps a row source and reuses its results until they expire.
/// Failed fetches are never cached.
pub struct CachedDataPort<P> {
    inner: P,
    cache: TtlCache<CacheKey, CachedRows>,
}

impl<P: DataPort> CachedDataPort<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            cache: TtlCache::new(ttl),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn invalidate(&self) {
        self.cache.clear();
    }

    fn cached<T>(
        &self,
        key: CacheKey,
        unpack: impl Fn(CachedRows) -> Option<T>,
        pack: impl Fn(T) -> CachedRows,
        fetch: impl FnOnce(&P) -> Result<T, PesowatchError>,
    ) -> Result<T, PesowatchError>
    where
        T: Clone,
    {
        if let Some(hit) = self.cache.get(&key).and_then(&unpack) {
            return Ok(hit);
        }
        let fresh = fetch(&self.inner)?;
        self.cache.put(key, pack(fresh.clone()));
        Ok(fresh)
    }
}

impl<P: DataPort> DataPort for CachedDataPort<P> {
    fn fetch_nav_rows(&self, instruments: &[String]) -> Result<Vec<NavRow>, PesowatchError> {
        self.cached(
            CacheKey::Nav(instruments.to_vec()),
            |rows| match rows {
                CachedRows::Nav(v) => Some(v),
                _ => None,
            },
            CachedRows::Nav,
            |p| p.fetch_nav_rows(instruments),
        )
    }

    fn fetch_fx_quotes(&self) -> Result<Vec<FxQuote>, PesowatchError> {
        self.cached(
            CacheKey::Fx,
            |rows| match rows {
                CachedRows::Fx(v) => Some(v),
                _ => None,
            },
            CachedRows::Fx,
            |p| p.fetch_fx_quotes(),
        )
    }

    fn fetch_monthly_inflation(&self) -> Result<Vec<Observation>, PesowatchError> {
        self.cached(
            CacheKey::Inflation,
            |rows| match rows {
                CachedRows::Inflation(v) => Some(v),
                _ => None,
            },
            CachedRows::Inflation,
            |p| p.fetch_monthly_inflation(),
        )
    }

    fn fetch_deposit_rates(&self) -> Result<Vec<DepositRate>, PesowatchError> {
        self.cached(
            CacheKey::Deposits,
            |rows| match rows {
                CachedRows::Deposits(v) => Some(v),
                _ => None,
            },
            CachedRows::Deposits,
            |p| p.fetch_deposit_rates(),
        )
    }

    fn list_instruments(&self) -> Result<Vec<String>, PesowatchError> {
        self.cached(
            CacheKey::Instruments,
            |rows| match rows {
                CachedRows::Instruments(v) => Some(v),
                _ => None,
            },
            CachedRows::Instruments,
            |p| p.list_instruments(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::cell::Cell;

    struct CountingPort {
        calls: Cell<usize>,
        fail: bool,
    }

    impl CountingPort {
        fn new(fail: bool) -> Self {
            Self {
                calls: Cell::new(0),
                fail,
            }
        }

        fn hit(&self) -> Result<(), PesowatchError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(PesowatchError::DataSource {
                    reason: "offline".into(),
                });
            }
            Ok(())
        }
    }

    impl DataPort for CountingPort {
        fn fetch_nav_rows(&self, instruments: &[String]) -> Result<Vec<NavRow>, PesowatchError> {
            self.hit()?;
            Ok(instruments
                .iter()
                .map(|name| NavRow {
                    date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    instrument: name.clone(),
                    nav: Some(1.0),
                    tna: None,
                })
                .collect())
        }

        fn fetch_fx_quotes(&self) -> Result<Vec<FxQuote>, PesowatchError> {
            self.hit()?;
            Ok(Vec::new())
        }

        fn fetch_monthly_inflation(&self) -> Result<Vec<Observation>, PesowatchError> {
            self.hit()?;
            Ok(vec![Observation::new(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                3.0,
            )])
        }

        fn list_instruments(&self) -> Result<Vec<String>, PesowatchError> {
            self.hit()?;
            Ok(vec!["Ualá".into()])
        }
    }

    #[test]
    fn second_fetch_is_served_from_cache() {
        let port = CachedDataPort::new(CountingPort::new(false), Duration::from_secs(600));
        let first = port.fetch_monthly_inflation().unwrap();
        let second = port.fetch_monthly_inflation().unwrap();
        assert_eq!(first, second);
        assert_eq!(port.inner.calls.get(), 1);
    }

    #[test]
    fn keys_are_separate_per_request() {
        let port = CachedDataPort::new(CountingPort::new(false), Duration::from_secs(600));
        port.fetch_nav_rows(&["A".into()]).unwrap();
        let rows = port.fetch_nav_rows(&["B".into()]).unwrap();
        assert_eq!(rows[0].instrument, "B");
        port.list_instruments().unwrap();
        port.fetch_fx_quotes().unwrap();
        assert_eq!(port.inner.calls.get(), 4);
        port.fetch_nav_rows(&["A".into()]).unwrap();
        assert_eq!(port.inner.calls.get(), 4);
    }

    #[test]
    fn zero_ttl_always_refetches() {
        let port = CachedDataPort::new(CountingPort::new(false), Duration::ZERO);
        port.list_instruments().unwrap();
        port.list_instruments().unwrap();
        assert_eq!(port.inner.calls.get(), 2);
    }

    #[test]
    fn errors_are_not_cached() {
        let port = CachedDataPort::new(CountingPort::new(true), Duration::from_secs(600));
        assert!(port.fetch_fx_quotes().is_err());
        assert!(port.fetch_fx_quotes().is_err());
        assert_eq!(port.inner.calls.get(), 2);
    }

    #[test]
    fn invalidate_drops_entries() {
        let port = CachedDataPort::new(CountingPort::new(false), Duration::from_secs(600));
        port.list_instruments().unwrap();
        port.invalidate();
        port.list_instruments().unwrap();
        assert_eq!(port.inner.calls.get(), 2);
    }

    #[test]
    fn default_deposit_rates_pass_through() {
        let port = CachedDataPort::new(CountingPort::new(false), Duration::from_secs(600));
        assert!(port.fetch_deposit_rates().unwrap().is_empty());
    }

    #[test]
    fn ttl_cache_get_put() {
        let cache = TtlCache::<String, i32>::new(Duration::from_secs(60));
        assert!(cache.get(&"k".to_string()).is_none());
        cache.put("k".to_string(), 7);
        assert_eq!(cache.get(&"k".to_string()), Some(7));
    }
}
