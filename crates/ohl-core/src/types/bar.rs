//! 일봉 OHLCV 데이터와 시세 테이블.
//!
//! - `Bar` - 하루치 시가/고가/저가/종가/거래량
//! - `QuoteTable` - 한 종목의 날짜 오름차순 봉 목록

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 일봉 OHLCV 데이터.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// 거래일 (시간 정보 없음)
    pub date: NaiveDate,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
    /// 거래량
    pub volume: u64,
}

impl Bar {
    /// 새 봉을 생성합니다.
    pub fn new(
        date: NaiveDate,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: u64,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// `low ≤ open, close ≤ high` 불변식을 만족하는지 확인합니다.
    pub fn is_consistent(&self) -> bool {
        self.low <= self.open
            && self.low <= self.close
            && self.open <= self.high
            && self.close <= self.high
    }
}

/// 한 종목의 시세 테이블.
///
/// 날짜는 엄격하게 증가하며 중복이 없습니다. 외부 데이터 소스가 생성하고
/// 코어 로직은 읽기만 합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteTable {
    bars: Vec<Bar>,
}

impl QuoteTable {
    /// 봉 목록으로 테이블을 생성합니다.
    ///
    /// 날짜순으로 정렬하고, 같은 날짜가 여러 번 나오면 첫 번째 봉만 남깁니다.
    pub fn new(mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self { bars }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// 정확히 해당 날짜의 봉들.
    pub fn on_date(&self, date: NaiveDate) -> impl Iterator<Item = &Bar> + '_ {
        self.bars.iter().filter(move |b| b.date == date)
    }

    /// 해당 날짜의 봉이 있는지 확인합니다.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.bars.binary_search_by_key(&date, |b| b.date).is_ok()
    }

    /// `after < date <= until` 구간의 봉들 (날짜 오름차순).
    pub fn between(&self, after: NaiveDate, until: NaiveDate) -> &[Bar] {
        let start = self.bars.partition_point(|b| b.date <= after);
        let end = self.bars.partition_point(|b| b.date <= until);
        if start >= end {
            return &[];
        }
        &self.bars[start..end]
    }

    /// 전체 구간의 최저가.
    pub fn min_low(&self) -> Option<Decimal> {
        self.bars.iter().map(|b| b.low).min()
    }

    /// 전체 구간의 최고가.
    pub fn max_high(&self) -> Option<Decimal> {
        self.bars.iter().map(|b| b.high).max()
    }

    /// 전체 거래량 합계.
    pub fn total_volume(&self) -> u64 {
        self.bars.iter().map(|b| b.volume).sum()
    }
}

impl From<Vec<Bar>> for QuoteTable {
    fn from(bars: Vec<Bar>) -> Self {
        Self::new(bars)
    }
}
