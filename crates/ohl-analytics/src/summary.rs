//! 결과 요약 통계 및 텍스트 리포트.

use chrono::NaiveDate;
use ohl_core::{ExitDetail, ExitReason, OutcomeRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// 결과가 없을 때의 리포트.
pub const NO_RESULTS_MESSAGE: &str = "No results to analyze";

/// 리포트에 표시할 에러 개수.
const ERROR_PREVIEW: usize = 5;

/// 최소/최대/평균.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeStats {
    pub min: Decimal,
    pub max: Decimal,
    pub mean: Decimal,
}

impl RangeStats {
    fn from_values(values: impl IntoIterator<Item = Decimal>) -> Option<Self> {
        let values: Vec<Decimal> = values.into_iter().collect();
        Some(Self {
            min: values.iter().copied().min()?,
            max: values.iter().copied().max()?,
            mean: mean(values)?,
        })
    }
}

/// 전체 결과 요약.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_trades: usize,
    pub target_hits: usize,
    pub stop_losses: usize,
    pub time_exits: usize,

    /// 목표가 도달 비율 (%)
    pub target_rate_pct: Decimal,
    /// 손절 비율 (%)
    pub stop_rate_pct: Decimal,
    /// 기간 만료 비율 (%)
    pub time_exit_rate_pct: Decimal,

    /// 목표가 도달까지 평균 일수
    pub avg_days_to_target: Option<Decimal>,
    /// 손절까지 평균 일수
    pub avg_days_to_stop: Option<Decimal>,
    /// 손절 거래 평균 손실률 (%)
    pub avg_loss_pct: Option<Decimal>,
    /// 손절 거래 평균 손절폭 (%)
    pub avg_stop_gap_pct: Option<Decimal>,

    /// 기간 만료 거래 평균 수익률 (%)
    pub avg_time_exit_return_pct: Option<Decimal>,
    pub avg_best_possible_pct: Option<Decimal>,
    pub avg_worst_possible_pct: Option<Decimal>,

    /// 패턴일 시가 대비 종가 (%)
    pub pattern_day_move: RangeStats,
    /// 패턴일 변동폭 (%)
    pub pattern_day_range: RangeStats,

    pub first_date: NaiveDate,
    pub last_date: NaiveDate,

    pub error_count: usize,
    /// 앞쪽 에러 메시지 (최대 5개)
    pub first_errors: Vec<String>,
}

impl Summary {
    /// 결과 레코드로 요약을 계산합니다. 레코드가 없으면 `None`.
    pub fn from_records(records: &[OutcomeRecord], errors: &[String]) -> Option<Self> {
        let total_trades = records.len();
        if total_trades == 0 {
            return None;
        }

        let by_reason = |reason: ExitReason| records.iter().filter(move |r| r.exit_reason() == reason);
        let target_hits = by_reason(ExitReason::TargetHit).count();
        let stop_losses = by_reason(ExitReason::StopLoss).count();
        let time_exits = total_trades - target_hits - stop_losses;

        let rate = |count: usize| Decimal::from(count) * Decimal::ONE_HUNDRED / Decimal::from(total_trades);

        let avg_days_to_target =
            mean(by_reason(ExitReason::TargetHit).map(|r| Decimal::from(r.exit_day_offset)));
        let avg_days_to_stop =
            mean(by_reason(ExitReason::StopLoss).map(|r| Decimal::from(r.exit_day_offset)));
        let avg_loss_pct = mean(records.iter().filter_map(|r| match &r.exit {
            ExitDetail::StopLoss { loss_percent, .. } => Some(*loss_percent),
            _ => None,
        }));
        let avg_stop_gap_pct =
            mean(by_reason(ExitReason::StopLoss).map(|r| r.levels.stop_loss_gap_pct));

        let time_exit_values = |pick: fn(&ExitDetail) -> Option<Decimal>| {
            mean(records.iter().filter_map(move |r| pick(&r.exit)))
        };
        let avg_time_exit_return_pct = time_exit_values(|e| match e {
            ExitDetail::TimeExit { final_percent, .. } => Some(*final_percent),
            _ => None,
        });
        let avg_best_possible_pct = time_exit_values(|e| match e {
            ExitDetail::TimeExit {
                best_possible_return,
                ..
            } => Some(*best_possible_return),
            _ => None,
        });
        let avg_worst_possible_pct = time_exit_values(|e| match e {
            ExitDetail::TimeExit {
                worst_possible_return,
                ..
            } => Some(*worst_possible_return),
            _ => None,
        });

        let pattern_day_move =
            RangeStats::from_values(records.iter().map(|r| r.levels.pattern_day.move_pct))?;
        let pattern_day_range =
            RangeStats::from_values(records.iter().map(|r| r.levels.pattern_day.range_pct))?;

        let first_date = records.iter().map(|r| r.pattern_date()).min()?;
        let last_date = records.iter().map(|r| r.pattern_date()).max()?;

        Some(Self {
            total_trades,
            target_hits,
            stop_losses,
            time_exits,
            target_rate_pct: rate(target_hits),
            stop_rate_pct: rate(stop_losses),
            time_exit_rate_pct: rate(time_exits),
            avg_days_to_target,
            avg_days_to_stop,
            avg_loss_pct,
            avg_stop_gap_pct,
            avg_time_exit_return_pct,
            avg_best_possible_pct,
            avg_worst_possible_pct,
            pattern_day_move,
            pattern_day_range,
            first_date,
            last_date,
            error_count: errors.len(),
            first_errors: errors.iter().take(ERROR_PREVIEW).cloned().collect(),
        })
    }

    /// 사람이 읽는 텍스트 리포트.
    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = write!(
            out,
            "Trade Analysis Summary\n\
             ═══════════════════════════════════════\n\
             Total Trades Analyzed: {}\n\
             \n\
             Trade Outcomes:\n\
             - Successful Trades (0.2% target hit): {} ({:.2}%)\n\
             - Stopped Out Trades: {} ({:.2}%)\n\
             - Time Exit Trades: {} ({:.2}%)\n\
             ───────────────────────────────────────\n\
             Performance Metrics:\n",
            self.total_trades,
            self.target_hits,
            self.target_rate_pct,
            self.stop_losses,
            self.stop_rate_pct,
            self.time_exits,
            self.time_exit_rate_pct,
        );

        if let Some(days) = self.avg_days_to_target {
            let _ = writeln!(out, "- Average Days to Target: {:.1} days", days);
        }
        if let Some(days) = self.avg_days_to_stop {
            let _ = writeln!(out, "- Average Days to Stop Loss: {:.1} days", days);
        }
        if let Some(loss) = self.avg_loss_pct {
            let _ = writeln!(out, "- Average Loss on Stopped Trades: {:.2}%", loss);
        }
        if let Some(gap) = self.avg_stop_gap_pct {
            let _ = writeln!(out, "- Average Stop Loss Gap: {:.2}%", gap);
        }
        if let Some(ret) = self.avg_time_exit_return_pct {
            let _ = writeln!(out, "- Average Return on Time Exits: {:.2}%", ret);
        }
        if let Some(best) = self.avg_best_possible_pct {
            let _ = writeln!(out, "- Average Best Possible Return: {:.2}%", best);
        }
        if let Some(worst) = self.avg_worst_possible_pct {
            let _ = writeln!(out, "- Average Worst Possible Return: {:.2}%", worst);
        }

        let _ = write!(
            out,
            "───────────────────────────────────────\n\
             Pattern Day Statistics:\n\
             - Average Open to Close: {:.2}%\n\
             - Max Open to Close: {:.2}%\n\
             - Min Open to Close: {:.2}%\n\
             - Average Day Range: {:.2}%\n\
             - Max Day Range: {:.2}%\n\
             - Min Day Range: {:.2}%\n\
             \n\
             Date Range Analyzed: {} to {}\n",
            self.pattern_day_move.mean,
            self.pattern_day_move.max,
            self.pattern_day_move.min,
            self.pattern_day_range.mean,
            self.pattern_day_range.max,
            self.pattern_day_range.min,
            self.first_date.format("%Y-%m-%d"),
            self.last_date.format("%Y-%m-%d"),
        );

        if self.error_count > 0 {
            let _ = write!(
                out,
                "\nErrors Encountered: {}\nFirst {} errors:\n",
                self.error_count,
                self.first_errors.len()
            );
            for error in &self.first_errors {
                let _ = writeln!(out, "- {}", error);
            }
        }

        out.push_str("═══════════════════════════════════════");
        out
    }
}

/// 결과 레코드와 에러 목록으로 리포트를 만듭니다.
///
/// 레코드가 없으면 `NO_RESULTS_MESSAGE`를 반환합니다.
pub fn render_report(records: &[OutcomeRecord], errors: &[String]) -> String {
    match Summary::from_records(records, errors) {
        Some(summary) => summary.render(),
        None => NO_RESULTS_MESSAGE.to_string(),
    }
}

fn mean(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    let (sum, count) = values
        .into_iter()
        .fold((Decimal::ZERO, 0u32), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return None;
    }
    Some(sum / Decimal::from(count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ohl_core::{
        DailyPerformance, PatternDayStats, PatternOccurrence, StopLossSource, TradeLevels,
    };
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn record(d: u32, offset: i64, move_pct: Decimal, exit: ExitDetail) -> OutcomeRecord {
        let perf = DailyPerformance {
            day_offset: offset,
            date: day(d) + chrono::Duration::days(offset),
            open: dec!(100),
            high: dec!(101),
            low: dec!(99),
            close: dec!(100),
            return_pct: Decimal::ZERO,
        };
        OutcomeRecord {
            occurrence: PatternOccurrence::new("TCS", day(d).and_hms_opt(10, 0, 0).unwrap()),
            levels: TradeLevels {
                entry_price: dec!(100),
                stop_loss_price: dec!(98),
                stop_loss_gap_pct: dec!(2),
                stop_loss_source: StopLossSource::PriorDay,
                pattern_day: PatternDayStats {
                    open: dec!(99),
                    high: dec!(100),
                    low: dec!(98),
                    close: dec!(99.5),
                    range_pct: move_pct.abs() + dec!(1),
                    move_pct,
                },
            },
            target_price: dec!(100.2),
            exit_day_offset: offset,
            exit_price: dec!(100),
            daily_performance: vec![perf],
            exit,
        }
    }

    fn sample() -> Vec<OutcomeRecord> {
        let hit = |d, offset| {
            record(d, offset, dec!(1), ExitDetail::TargetHit {
                day: DailyPerformance {
                    day_offset: offset,
                    date: day(d),
                    open: dec!(100),
                    high: dec!(101),
                    low: dec!(99),
                    close: dec!(100),
                    return_pct: Decimal::ZERO,
                },
            })
        };
        vec![
            hit(11, 1),
            hit(12, 3),
            record(13, 2, dec!(-2), ExitDetail::StopLoss {
                day: DailyPerformance {
                    day_offset: 2,
                    date: day(15),
                    open: dec!(99),
                    high: dec!(99),
                    low: dec!(97),
                    close: dec!(97.5),
                    return_pct: dec!(-2.5),
                },
                loss_percent: dec!(-2),
            }),
            record(14, 6, dec!(3), ExitDetail::TimeExit {
                final_price: dec!(98.7),
                final_percent: dec!(-1.3),
                best_possible_return: dec!(0.1),
                worst_possible_return: dec!(-1.5),
                days_checked: 10,
            }),
        ]
    }

    #[test]
    fn test_empty_records_message() {
        assert!(Summary::from_records(&[], &[]).is_none());
        assert_eq!(render_report(&[], &["boom".to_string()]), "No results to analyze");
    }

    #[test]
    fn test_counts_and_rates() {
        let summary = Summary::from_records(&sample(), &[]).unwrap();

        assert_eq!(summary.total_trades, 4);
        assert_eq!(summary.target_hits, 2);
        assert_eq!(summary.stop_losses, 1);
        assert_eq!(summary.time_exits, 1);
        assert_eq!(summary.target_rate_pct, dec!(50));
        assert_eq!(summary.stop_rate_pct, dec!(25));
        assert_eq!(summary.time_exit_rate_pct, dec!(25));
    }

    #[test]
    fn test_means_per_exit_reason() {
        let summary = Summary::from_records(&sample(), &[]).unwrap();

        assert_eq!(summary.avg_days_to_target, Some(dec!(2)));
        assert_eq!(summary.avg_days_to_stop, Some(dec!(2)));
        assert_eq!(summary.avg_loss_pct, Some(dec!(-2)));
        assert_eq!(summary.avg_stop_gap_pct, Some(dec!(2)));
        assert_eq!(summary.avg_time_exit_return_pct, Some(dec!(-1.3)));
        assert_eq!(summary.avg_best_possible_pct, Some(dec!(0.1)));
        assert_eq!(summary.avg_worst_possible_pct, Some(dec!(-1.5)));
    }

    #[test]
    fn test_pattern_day_stats_and_dates() {
        let summary = Summary::from_records(&sample(), &[]).unwrap();

        assert_eq!(summary.pattern_day_move.min, dec!(-2));
        assert_eq!(summary.pattern_day_move.max, dec!(3));
        assert_eq!(summary.pattern_day_move.mean, dec!(0.75));
        assert_eq!(summary.pattern_day_range.max, dec!(4));
        assert_eq!(summary.first_date, day(11));
        assert_eq!(summary.last_date, day(14));
    }

    #[test]
    fn test_missing_sections_omitted() {
        let records: Vec<_> = sample().into_iter().take(2).collect();
        let summary = Summary::from_records(&records, &[]).unwrap();

        assert!(summary.avg_days_to_stop.is_none());
        assert!(summary.avg_time_exit_return_pct.is_none());

        let report = summary.render();
        assert!(report.contains("Average Days to Target: 2.0 days"));
        assert!(!report.contains("Stop Loss Gap"));
        assert!(!report.contains("Errors Encountered"));
    }

    #[test]
    fn test_report_lists_first_five_errors() {
        let errors: Vec<String> = (1..=7).map(|i| format!("error {}", i)).collect();
        let report = render_report(&sample(), &errors);

        assert!(report.contains("Total Trades Analyzed: 4"));
        assert!(report.contains("Successful Trades (0.2% target hit): 2 (50.00%)"));
        assert!(report.contains("Errors Encountered: 7"));
        assert!(report.contains("- error 5"));
        assert!(!report.contains("- error 6"));
        assert!(report.contains("Date Range Analyzed: 2024-03-11 to 2024-03-14"));
    }
}
