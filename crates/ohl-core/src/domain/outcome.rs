//! 발생별 결과 레코드.
//!
//! 결과는 세 가지 중 정확히 하나입니다:
//! - `target_hit` - 손절 없이 목표가 도달
//! - `stop_loss` - 손절가 이탈
//! - `time_exit` - 조회 구간 안에서 둘 다 발생하지 않음

use super::{PatternOccurrence, TradeLevels};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 목표가 배수 (진입가 대비 +0.2%).
pub const TARGET_MULTIPLIER: Decimal = dec!(1.002);

/// 목표 수익률 (%).
pub const TARGET_PERCENT: Decimal = dec!(0.2);

/// 진입가 대비 수익률(%)을 계산합니다.
///
/// 진입가가 0이면 0을 반환합니다.
pub fn return_pct(entry_price: Decimal, price: Decimal) -> Decimal {
    if entry_price.is_zero() {
        return Decimal::ZERO;
    }
    (price - entry_price) / entry_price * Decimal::ONE_HUNDRED
}

/// 청산 사유.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    TargetHit,
    StopLoss,
    TimeExit,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TargetHit => "target_hit",
            Self::StopLoss => "stop_loss",
            Self::TimeExit => "time_exit",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 패턴일 이후 하루치 성과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPerformance {
    /// 패턴일로부터의 달력일 차이
    pub day_offset: i64,
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    /// 종가 기준 수익률 (%)
    #[serde(rename = "return")]
    pub return_pct: Decimal,
}

/// 청산 세부 정보.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "exit_reason", rename_all = "snake_case")]
pub enum ExitDetail {
    /// 목표가 도달. `day`는 도달한 날의 성과.
    TargetHit { day: DailyPerformance },
    /// 손절. `loss_percent` = (손절가 - 진입가) / 진입가 × 100
    StopLoss {
        day: DailyPerformance,
        loss_percent: Decimal,
    },
    /// 기간 만료.
    TimeExit {
        final_price: Decimal,
        final_percent: Decimal,
        best_possible_return: Decimal,
        worst_possible_return: Decimal,
        days_checked: i64,
    },
}

/// 발생별 결과 레코드.
///
/// Outcome Resolver가 한 번 생성하며 이후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub occurrence: PatternOccurrence,
    pub levels: TradeLevels,
    /// 목표가 (진입가 × 1.002)
    pub target_price: Decimal,
    /// 청산일의 패턴일 대비 달력일 차이 (≥ 1)
    pub exit_day_offset: i64,
    pub exit_price: Decimal,
    /// 청산일까지의 일별 성과 (날짜 오름차순)
    pub daily_performance: Vec<DailyPerformance>,
    pub exit: ExitDetail,
}

impl OutcomeRecord {
    pub fn exit_reason(&self) -> ExitReason {
        match self.exit {
            ExitDetail::TargetHit { .. } => ExitReason::TargetHit,
            ExitDetail::StopLoss { .. } => ExitReason::StopLoss,
            ExitDetail::TimeExit { .. } => ExitReason::TimeExit,
        }
    }

    pub fn target_hit(&self) -> bool {
        self.exit_reason() == ExitReason::TargetHit
    }

    pub fn stop_loss_hit(&self) -> bool {
        self.exit_reason() == ExitReason::StopLoss
    }

    pub fn symbol(&self) -> &str {
        &self.occurrence.symbol
    }

    pub fn pattern_date(&self) -> NaiveDate {
        self.occurrence.pattern_date
    }
}
