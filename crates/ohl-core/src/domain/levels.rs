//! 매매 레벨 (진입가, 손절가) 및 패턴일 통계.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 손절가 산출 경로.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopLossSource {
    /// 직전 달력일 봉의 최저가
    PriorDay,
    /// 직전일 봉이 없어 조회 구간 전체의 최저가로 대체
    WindowFallback,
}

impl StopLossSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PriorDay => "prior_day",
            Self::WindowFallback => "window_fallback",
        }
    }
}

/// 패턴일 봉 통계.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternDayStats {
    /// 첫 봉의 시가
    pub open: Decimal,
    /// 최고가
    pub high: Decimal,
    /// 최저가
    pub low: Decimal,
    /// 마지막 봉의 종가
    pub close: Decimal,
    /// (고가 - 저가) / 시가 × 100
    pub range_pct: Decimal,
    /// (종가 - 시가) / 시가 × 100
    pub move_pct: Decimal,
}

/// 발생별로 산출되는 매매 레벨.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeLevels {
    /// 진입가 (패턴일 고가)
    pub entry_price: Decimal,
    /// 손절가 (직전일 저가)
    pub stop_loss_price: Decimal,
    /// (진입가 - 손절가) / 진입가 × 100
    pub stop_loss_gap_pct: Decimal,
    /// 손절가 산출 경로
    pub stop_loss_source: StopLossSource,
    /// 패턴일 통계
    pub pattern_day: PatternDayStats,
}
