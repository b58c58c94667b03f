//! 날짜 인자 파싱 및 주말 보정 표시.

use anyhow::{bail, Result};
use chrono::{Datelike, NaiveDate};
use ohl_core::adjust_to_weekday;
use ohl_data::parse_pattern_time;

/// 날짜 문자열 파싱.
///
/// `YYYY-MM-DD`, `DD-MM-YYYY`, 입력 파일 형식(`DD-MM-YYYY hh:mm AM`)을 받습니다.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%d-%m-%Y") {
        return Ok(date);
    }
    if let Ok(time) = parse_pattern_time(s) {
        return Ok(time.date());
    }
    bail!(
        "Invalid date: {}. Expected YYYY-MM-DD, DD-MM-YYYY or 'DD-MM-YYYY hh:mm AM'",
        s
    )
}

/// 주말 보정 결과 설명.
pub fn describe_adjustment(date: NaiveDate) -> String {
    let adjusted = adjust_to_weekday(date);
    if adjusted == date {
        format!("{} ({}) is a weekday, no adjustment", date, date.weekday())
    } else {
        format!(
            "{} ({}) -> {} ({}) (weekend adjustment)",
            date,
            date.weekday(),
            adjusted,
            adjusted.weekday()
        )
    }
}
