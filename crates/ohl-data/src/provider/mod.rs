//! 시세 데이터 Provider 모듈.
//!
//! 코어 로직은 `QuoteProvider` 트레이트에만 의존합니다. 심볼 정규화
//! (거래소 접미사)와 네트워크 재시도는 Provider의 책임입니다.
//!
//! ## Yahoo Finance
//! - `YahooChartProvider`: v8 chart API 직접 호출, 조회일 앞뒤 구간 반환

pub mod yahoo;

pub use yahoo::{normalize_symbol, YahooChartProvider};

use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use ohl_core::{Interval, QuoteTable};

/// 외부 시세 데이터 소스.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// `date`를 포함하는 시세 테이블을 가져옵니다.
    ///
    /// 데이터가 없으면 `Ok(None)`, 네트워크/파싱 실패는 `Err`를 반환합니다.
    async fn fetch(
        &self,
        symbol: &str,
        date: NaiveDate,
        interval: Interval,
    ) -> Result<Option<QuoteTable>>;
}

#[async_trait]
impl<P: QuoteProvider + ?Sized> QuoteProvider for std::sync::Arc<P> {
    async fn fetch(
        &self,
        symbol: &str,
        date: NaiveDate,
        interval: Interval,
    ) -> Result<Option<QuoteTable>> {
        (**self).fetch(symbol, date, interval).await
    }
}
