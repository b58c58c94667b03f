//! 결과 레코드 CSV 내보내기.
//!
//! 레코드 하나가 한 행으로 평탄화되며, 일별 성과는 JSON 문자열 컬럼으로
//! 들어갑니다. 청산 사유에 해당하지 않는 컬럼은 비워 둡니다.

use ohl_core::{ExitDetail, OutcomeRecord, TARGET_PERCENT};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// 내보내기 오류.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// CSV 한 행.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeRow {
    pub date: String,
    pub original_date: String,
    pub symbol: String,
    pub entry_price: Decimal,
    pub target_price: Decimal,
    pub stop_loss_price: Decimal,
    pub stop_loss_gap: Decimal,
    pub stop_loss_source: &'static str,
    pub target_hit: bool,
    pub stop_loss_hit: bool,
    pub exit_reason: &'static str,
    pub exit_day: i64,
    pub exit_price: Decimal,
    pub days_to_target: Option<i64>,
    pub profit_percent: Option<Decimal>,
    pub days_to_stop: Option<i64>,
    pub loss_percent: Option<Decimal>,
    pub final_price: Option<Decimal>,
    pub final_percent: Option<Decimal>,
    pub days_checked: Option<i64>,
    pub best_possible_return: Option<Decimal>,
    pub worst_possible_return: Option<Decimal>,
    /// 청산일 봉 (목표가/손절 청산만)
    pub day_open: Option<Decimal>,
    pub day_high: Option<Decimal>,
    pub day_low: Option<Decimal>,
    pub day_close: Option<Decimal>,
    pub pattern_day_open: Decimal,
    pub pattern_day_high: Decimal,
    pub pattern_day_low: Decimal,
    pub pattern_day_close: Decimal,
    pub pattern_day_range: Decimal,
    pub pattern_day_move: Decimal,
    pub daily_performance: String,
}

impl OutcomeRow {
    pub fn from_record(record: &OutcomeRecord) -> Result<Self, ExportError> {
        let levels = &record.levels;
        let pattern_day = &levels.pattern_day;

        let mut row = Self {
            date: record.pattern_date().format("%Y-%m-%d").to_string(),
            original_date: record
                .occurrence
                .original_time
                .format("%Y-%m-%d %H:%M")
                .to_string(),
            symbol: record.symbol().to_string(),
            entry_price: levels.entry_price,
            target_price: record.target_price,
            stop_loss_price: levels.stop_loss_price,
            stop_loss_gap: levels.stop_loss_gap_pct,
            stop_loss_source: levels.stop_loss_source.as_str(),
            target_hit: record.target_hit(),
            stop_loss_hit: record.stop_loss_hit(),
            exit_reason: record.exit_reason().as_str(),
            exit_day: record.exit_day_offset,
            exit_price: record.exit_price,
            days_to_target: None,
            profit_percent: None,
            days_to_stop: None,
            loss_percent: None,
            final_price: None,
            final_percent: None,
            days_checked: None,
            best_possible_return: None,
            worst_possible_return: None,
            day_open: None,
            day_high: None,
            day_low: None,
            day_close: None,
            pattern_day_open: pattern_day.open,
            pattern_day_high: pattern_day.high,
            pattern_day_low: pattern_day.low,
            pattern_day_close: pattern_day.close,
            pattern_day_range: pattern_day.range_pct,
            pattern_day_move: pattern_day.move_pct,
            daily_performance: serde_json::to_string(&record.daily_performance)?,
        };

        match &record.exit {
            ExitDetail::TargetHit { day } => {
                row.days_to_target = Some(day.day_offset);
                row.profit_percent = Some(TARGET_PERCENT);
                row.set_exit_day(day.open, day.high, day.low, day.close);
            }
            ExitDetail::StopLoss { day, loss_percent } => {
                row.days_to_stop = Some(day.day_offset);
                row.loss_percent = Some(*loss_percent);
                row.set_exit_day(day.open, day.high, day.low, day.close);
            }
            ExitDetail::TimeExit {
                final_price,
                final_percent,
                best_possible_return,
                worst_possible_return,
                days_checked,
            } => {
                row.final_price = Some(*final_price);
                row.final_percent = Some(*final_percent);
                row.best_possible_return = Some(*best_possible_return);
                row.worst_possible_return = Some(*worst_possible_return);
                row.days_checked = Some(*days_checked);
            }
        }

        Ok(row)
    }

    fn set_exit_day(&mut self, open: Decimal, high: Decimal, low: Decimal, close: Decimal) {
        self.day_open = Some(open);
        self.day_high = Some(high);
        self.day_low = Some(low);
        self.day_close = Some(close);
    }
}

/// 결과 레코드를 CSV로 저장합니다. 상위 디렉토리가 없으면 만듭니다.
pub fn write_results_csv(
    path: impl AsRef<Path>,
    records: &[OutcomeRecord],
) -> Result<(), ExportError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(OutcomeRow::from_record(record)?)?;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = records.len(), "Results written");
    Ok(())
}
