//! 결과 판정 (Outcome Resolver).
//!
//! 패턴일 이후 봉을 날짜순으로 한 번 훑으며 목표가와 손절가 중 먼저
//! 충족되는 조건을 찾습니다. 같은 날에는 항상 목표가 조건을 먼저 봅니다.
//!
//! ```text
//! (a) high ≥ target && low > stop  → target_hit
//! (b) low ≤ stop                   → stop_loss
//! 둘 다 아니면 다음 날, 구간이 끝나면 time_exit
//! ```

use chrono::{Duration, NaiveDate};
use ohl_core::{
    return_pct, BacktestError, BacktestResult, Bar, DailyPerformance, ExitDetail,
    OutcomeRecord, PatternOccurrence, QuoteTable, TraceLog, TradeLevels, TARGET_MULTIPLIER,
};
use rust_decimal::Decimal;

/// 하나의 발생에 대한 결과를 판정합니다.
///
/// `forward_table`에서 `pattern_date < date ≤ pattern_date + days_to_check`
/// 구간만 봅니다. 구간이 실제 청산일보다 짧으면 목표가/손절가 대신
/// `time_exit`로 판정되므로, 충분한 구간을 가져오는 것은 호출자의 책임입니다.
///
/// 추적 로그에는 일별 판정 과정이 기록되며 결과에는 영향을 주지 않습니다.
pub fn resolve_outcome(
    occurrence: &PatternOccurrence,
    levels: &TradeLevels,
    forward_table: &QuoteTable,
    days_to_check: i64,
    trace: &mut TraceLog,
) -> BacktestResult<OutcomeRecord> {
    let pattern_date = occurrence.pattern_date;
    let entry = levels.entry_price;
    let stop = levels.stop_loss_price;
    let target = entry * TARGET_MULTIPLIER;

    trace.push(format!(
        "Analyzing {} on {}: entry={:.2} target={:.2} (+0.2%) stop={:.2} (-{:.1}%, {})",
        occurrence.symbol,
        pattern_date,
        entry,
        target,
        stop,
        levels.stop_loss_gap_pct,
        levels.stop_loss_source.as_str()
    ));

    let window_end = Duration::try_days(days_to_check)
        .and_then(|days| pattern_date.checked_add_signed(days))
        .ok_or_else(|| {
            BacktestError::NoForwardData(format!(
                "window of {} days after {} is out of range",
                days_to_check, pattern_date
            ))
        })?;
    let window = forward_table.between(pattern_date, window_end);
    trace.push(format!(
        "Forward window after {}: {:?}",
        pattern_date,
        window.iter().map(|b| b.date.to_string()).collect::<Vec<_>>()
    ));

    let Some(last) = window.last() else {
        trace.push(format!("No forward data after {} for {}", pattern_date, occurrence.symbol));
        return Err(BacktestError::NoForwardData(format!(
            "{} has no bars within {} days after {}",
            occurrence.symbol, days_to_check, pattern_date
        )));
    };

    let record = |exit_day_offset: i64,
                  exit_price: Decimal,
                  daily_performance: Vec<DailyPerformance>,
                  exit: ExitDetail| OutcomeRecord {
        occurrence: occurrence.clone(),
        levels: levels.clone(),
        target_price: target,
        exit_day_offset,
        exit_price,
        daily_performance,
        exit,
    };

    let mut daily = Vec::with_capacity(window.len());
    for bar in window {
        let day = daily_performance(bar, pattern_date, entry);
        trace.push(format!(
            "Day {} ({}): O={:.2} H={:.2} L={:.2} C={:.2} | high >= {:.2}? {} | low > {:.2}? {}",
            day.day_offset,
            day.date,
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            target,
            bar.high >= target,
            stop,
            bar.low > stop
        ));
        daily.push(day.clone());

        if bar.high >= target && bar.low > stop {
            trace.push(format!("TARGET HIT on day {}", day.day_offset));
            return Ok(record(
                day.day_offset,
                target,
                daily,
                ExitDetail::TargetHit { day },
            ));
        }

        if bar.low <= stop {
            trace.push(format!(
                "STOP LOSS hit on day {}: low {} <= {}",
                day.day_offset, bar.low, stop
            ));
            return Ok(record(
                day.day_offset,
                stop,
                daily,
                ExitDetail::StopLoss {
                    loss_percent: return_pct(entry, stop),
                    day,
                },
            ));
        }
    }

    // 목표가/손절가 모두 미발생
    let best_high = window.iter().map(|b| b.high).max().unwrap_or(last.high);
    let worst_low = window.iter().map(|b| b.low).min().unwrap_or(last.low);
    let final_percent = return_pct(entry, last.close);
    let best_possible_return = return_pct(entry, best_high);
    let worst_possible_return = return_pct(entry, worst_low);

    trace.push(format!(
        "Time exit after {} days: final={:.2}% best={:.2}% (high {:.2}) worst={:.2}% (low {:.2})",
        days_to_check, final_percent, best_possible_return, best_high, worst_possible_return, worst_low
    ));

    let exit_day_offset = (last.date - pattern_date).num_days();
    Ok(record(
        exit_day_offset,
        last.close,
        daily,
        ExitDetail::TimeExit {
            final_price: last.close,
            final_percent,
            best_possible_return,
            worst_possible_return,
            days_checked: days_to_check,
        },
    ))
}

fn daily_performance(bar: &Bar, pattern_date: NaiveDate, entry: Decimal) -> DailyPerformance {
    DailyPerformance {
        day_offset: (bar.date - pattern_date).num_days(),
        date: bar.date,
        open: bar.open,
        high: bar.high,
        low: bar.low,
        close: bar.close,
        return_pct: return_pct(entry, bar.close),
    }
}
