//! 매매 레벨 산출.
//!
//! - 진입가: 패턴일 봉들의 최고가
//! - 손절가: 직전 달력일 봉들의 최저가
//!
//! 직전일 봉이 없으면 (주말, 휴장일) 직전일 조회 테이블 전체의 최저가로
//! 대체합니다. 이 경우 `StopLossSource::WindowFallback`으로 기록됩니다.

use chrono::NaiveDate;
use ohl_core::{
    return_pct, BacktestError, BacktestResult, Bar, PatternDayStats, QuoteTable, StopLossSource,
    TradeLevels,
};
use rust_decimal::Decimal;

/// 진입가와 손절가를 산출합니다.
///
/// 패턴일 봉이 없거나 진입가가 0 이하면 `InsufficientData`를 반환합니다.
/// 직전일 데이터가 없는 것은 실패가 아니며 손절가 대체 경로로 처리됩니다.
pub fn derive_levels(
    pattern_table: &QuoteTable,
    prior_table: &QuoteTable,
    pattern_date: NaiveDate,
    prior_date: NaiveDate,
) -> BacktestResult<TradeLevels> {
    let pattern_bars: Vec<&Bar> = pattern_table.on_date(pattern_date).collect();
    let pattern_day = pattern_day_stats(&pattern_bars).ok_or_else(|| {
        BacktestError::InsufficientData(format!("no bars on pattern date {}", pattern_date))
    })?;

    let entry_price = pattern_day.high;
    if entry_price <= Decimal::ZERO {
        return Err(BacktestError::InsufficientData(format!(
            "non-positive entry price {} on {}",
            entry_price, pattern_date
        )));
    }

    let prior_day_low = prior_table.on_date(prior_date).map(|b| b.low).min();
    let (stop_loss_price, stop_loss_source) = match prior_day_low {
        Some(low) => (low, StopLossSource::PriorDay),
        None => {
            let low = prior_table.min_low().ok_or_else(|| {
                BacktestError::InsufficientData(format!(
                    "no bars to derive stop loss for {}",
                    prior_date
                ))
            })?;
            (low, StopLossSource::WindowFallback)
        }
    };

    Ok(TradeLevels {
        entry_price,
        stop_loss_price,
        stop_loss_gap_pct: -return_pct(entry_price, stop_loss_price),
        stop_loss_source,
        pattern_day,
    })
}

/// 패턴일 봉 통계. 봉이 없으면 `None`.
fn pattern_day_stats(bars: &[&Bar]) -> Option<PatternDayStats> {
    let first = bars.first()?;
    let last = bars.last()?;
    let high = bars.iter().map(|b| b.high).max()?;
    let low = bars.iter().map(|b| b.low).min()?;

    let open = first.open;
    let close = last.close;
    let (range_pct, move_pct) = if open.is_zero() {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        (
            (high - low) / open * Decimal::ONE_HUNDRED,
            return_pct(open, close),
        )
    };

    Some(PatternDayStats {
        open,
        high,
        low,
        close,
        range_pct,
        move_pct,
    })
}
