//! 패턴 목록 CSV 로더.
//!
//! 필수 컬럼은 `symbol`, `date`이며 나머지 컬럼은 무시합니다.
//! 날짜 형식은 `15-03-2024 09:30 AM` 같은 `%d-%m-%Y %I:%M %p`입니다.

use crate::error::{DataError, Result};
use chrono::NaiveDateTime;
use ohl_core::{BacktestError, PatternOccurrence};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// 입력 파일 날짜 형식.
pub const PATTERN_DATE_FORMAT: &str = "%d-%m-%Y %I:%M %p";

const REQUIRED_COLUMNS: [&str; 2] = ["symbol", "date"];

#[derive(Debug, Deserialize)]
struct PatternRow {
    symbol: String,
    date: String,
}

/// CSV 로드 결과.
#[derive(Debug, Default)]
pub struct PatternLoad {
    /// 파싱에 성공한 발생 (파일 순서 유지)
    pub occurrences: Vec<PatternOccurrence>,
    /// 건너뛴 행들
    pub rejected: Vec<BacktestError>,
}

/// 입력 시각 문자열을 파싱합니다.
pub fn parse_pattern_time(value: &str) -> std::result::Result<NaiveDateTime, BacktestError> {
    NaiveDateTime::parse_from_str(value.trim(), PATTERN_DATE_FORMAT).map_err(|e| {
        BacktestError::MalformedInputRow(format!("invalid date '{}': {}", value.trim(), e))
    })
}

/// 패턴 목록 CSV를 읽습니다.
///
/// 파일을 열 수 없거나 필수 컬럼이 없으면 `Err`를 반환합니다. 개별 행의
/// 파싱 실패는 `rejected`에 모으고 계속 진행합니다.
pub fn load_patterns(path: impl AsRef<Path>) -> Result<PatternLoad> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(DataError::InvalidData(format!(
                "{}: missing required column '{}'",
                path.display(),
                column
            )));
        }
    }

    let mut load = PatternLoad::default();
    for (index, row) in reader.deserialize::<PatternRow>().enumerate() {
        // 헤더가 1행이므로 데이터는 2행부터
        let line = index + 2;
        let parsed = row
            .map_err(|e| BacktestError::MalformedInputRow(format!("line {}: {}", line, e)))
            .and_then(|row| {
                if row.symbol.is_empty() {
                    return Err(BacktestError::MalformedInputRow(format!(
                        "line {}: empty symbol",
                        line
                    )));
                }
                let time = parse_pattern_time(&row.date).map_err(|e| match e {
                    BacktestError::MalformedInputRow(msg) => {
                        BacktestError::MalformedInputRow(format!("line {}: {}", line, msg))
                    }
                    other => other,
                })?;
                Ok(PatternOccurrence::new(row.symbol, time))
            });

        match parsed {
            Ok(occurrence) => load.occurrences.push(occurrence),
            Err(e) => {
                warn!(error = %e, "Skipping input row");
                load.rejected.push(e);
            }
        }
    }

    info!(
        path = %path.display(),
        loaded = load.occurrences.len(),
        rejected = load.rejected.len(),
        "Pattern list loaded"
    );
    Ok(load)
}
