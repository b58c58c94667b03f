//! Provider 결과를 키 단위로 보관하는 캐시.

use crate::error::Result;
use crate::provider::QuoteProvider;
use chrono::NaiveDate;
use ohl_core::{Interval, QuoteTable};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// 캐시 키: (종목, `YYYY-MM-DD`, 주기).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: String,
    pub date: String,
    pub interval: Interval,
}

impl CacheKey {
    pub fn new(symbol: &str, date: NaiveDate, interval: Interval) -> Self {
        Self {
            symbol: symbol.to_string(),
            date: date.format("%Y-%m-%d").to_string(),
            interval,
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}_{}", self.symbol, self.date, self.interval)
    }
}

/// 캐시 사용 통계.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// 저장된 값을 돌려준 횟수
    pub hits: u64,
    /// Provider를 호출한 횟수
    pub misses: u64,
    /// Provider 호출이 실패한 횟수
    pub failures: u64,
    /// 저장된 키 수
    pub entries: usize,
}

/// 시세 캐시.
///
/// 캐시 미스마다 `request_delay`만큼 대기한 뒤 Provider를 호출합니다.
/// 빈 테이블과 조회 실패는 모두 "데이터 없음"으로 저장되어 같은 키로
/// 다시 호출되지 않습니다.
pub struct QuoteCache<P> {
    provider: P,
    request_delay: Duration,
    entries: HashMap<CacheKey, Option<Arc<QuoteTable>>>,
    hits: u64,
    misses: u64,
    failures: u64,
}

impl<P: QuoteProvider> QuoteCache<P> {
    pub fn new(provider: P, request_delay: Duration) -> Self {
        Self {
            provider,
            request_delay,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
            failures: 0,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// 시세 테이블 조회.
    ///
    /// Provider 실패는 처음 한 번만 `Err`로 반환되고, 이후 같은 키는
    /// `Ok(None)`을 반환합니다.
    #[instrument(skip(self))]
    pub async fn get(
        &mut self,
        symbol: &str,
        date: NaiveDate,
        interval: Interval,
    ) -> Result<Option<Arc<QuoteTable>>> {
        let key = CacheKey::new(symbol, date, interval);

        if let Some(cached) = self.entries.get(&key) {
            self.hits += 1;
            debug!(key = %key, present = cached.is_some(), "Quote cache hit");
            return Ok(cached.clone());
        }

        self.misses += 1;
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }

        match self.provider.fetch(symbol, date, interval).await {
            Ok(table) => {
                let value = table.filter(|t| !t.is_empty()).map(Arc::new);
                debug!(
                    key = %key,
                    bars = value.as_ref().map(|t| t.len()).unwrap_or(0),
                    "Quote cache stored"
                );
                self.entries.insert(key, value.clone());
                Ok(value)
            }
            Err(e) => {
                self.failures += 1;
                warn!(key = %key, error = %e, "Quote fetch failed, caching absence");
                self.entries.insert(key, None);
                Err(e)
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            failures: self.failures,
            entries: self.entries.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use async_trait::async_trait;
    use ohl_core::Bar;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 호출 횟수를 세는 Provider.
    struct CountingProvider {
        calls: AtomicUsize,
        fail: bool,
        empty: bool,
    }

    impl CountingProvider {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
                empty: false,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuoteProvider for CountingProvider {
        async fn fetch(
            &self,
            _symbol: &str,
            date: NaiveDate,
            _interval: Interval,
        ) -> Result<Option<QuoteTable>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DataError::FetchError("connection reset".to_string()));
            }
            if self.empty {
                return Ok(Some(QuoteTable::default()));
            }
            Ok(Some(QuoteTable::new(vec![Bar::new(
                date,
                dec!(100),
                dec!(101),
                dec!(99),
                dec!(100.5),
                10,
            )])))
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[tokio::test]
    async fn test_identical_requests_hit_provider_once() {
        let mut cache = QuoteCache::new(CountingProvider::new(), Duration::ZERO);

        let first = cache.get("TCS", day(15), Interval::D1).await.unwrap();
        let second = cache.get("TCS", day(15), Interval::D1).await.unwrap();

        assert_eq!(cache.provider().calls(), 1);
        assert_eq!(first, second);
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                failures: 0,
                entries: 1
            }
        );
    }

    #[tokio::test]
    async fn test_distinct_keys_fetch_separately() {
        let mut cache = QuoteCache::new(CountingProvider::new(), Duration::ZERO);

        cache.get("TCS", day(15), Interval::D1).await.unwrap();
        cache.get("TCS", day(14), Interval::D1).await.unwrap();
        cache.get("TCS", day(15), Interval::W1).await.unwrap();
        cache.get("INFY", day(15), Interval::D1).await.unwrap();

        assert_eq!(cache.provider().calls(), 4);
        assert_eq!(cache.len(), 4);
    }

    #[tokio::test]
    async fn test_failure_returned_once_then_cached_as_absent() {
        let provider = CountingProvider {
            fail: true,
            ..CountingProvider::new()
        };
        let mut cache = QuoteCache::new(provider, Duration::ZERO);

        assert!(cache.get("TCS", day(15), Interval::D1).await.is_err());
        let again = cache.get("TCS", day(15), Interval::D1).await.unwrap();

        assert!(again.is_none());
        assert_eq!(cache.provider().calls(), 1);
        assert_eq!(cache.stats().failures, 1);
    }

    #[tokio::test]
    async fn test_empty_table_stored_as_absent() {
        let provider = CountingProvider {
            empty: true,
            ..CountingProvider::new()
        };
        let mut cache = QuoteCache::new(provider, Duration::ZERO);

        assert!(cache.get("TCS", day(15), Interval::D1).await.unwrap().is_none());
        assert!(cache.get("TCS", day(15), Interval::D1).await.unwrap().is_none());
        assert_eq!(cache.provider().calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_only_on_miss() {
        let mut cache = QuoteCache::new(CountingProvider::new(), Duration::from_millis(100));

        let start = tokio::time::Instant::now();
        cache.get("TCS", day(15), Interval::D1).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(100));

        let before_hit = tokio::time::Instant::now();
        cache.get("TCS", day(15), Interval::D1).await.unwrap();
        assert_eq!(before_hit.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_cache_key_format() {
        let key = CacheKey::new("TCS", day(5), Interval::D1);
        assert_eq!(key.date, "2024-03-05");
        assert_eq!(key.to_string(), "TCS_2024-03-05_1d");
    }
}
