//! 패턴 발생 (종목, 날짜).

use crate::calendar::adjust_to_weekday;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 상위 스크리닝이 표시한 백테스트 대상 (종목, 날짜).
///
/// `pattern_date`는 주말 보정된 날짜이며 생성 후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternOccurrence {
    /// 종목 코드 (거래소 접미사 없이 입력된 그대로)
    pub symbol: String,
    /// 입력 파일에 기록된 원래 시각
    pub original_time: NaiveDateTime,
    /// 주말 보정된 패턴일
    pub pattern_date: NaiveDate,
}

impl PatternOccurrence {
    /// 입력 시각으로 발생을 생성하고 주말 보정을 적용합니다.
    pub fn new(symbol: impl Into<String>, original_time: NaiveDateTime) -> Self {
        Self {
            symbol: symbol.into(),
            original_time,
            pattern_date: adjust_to_weekday(original_time.date()),
        }
    }

    /// 주말 보정으로 날짜가 바뀌었는지 확인합니다.
    pub fn was_adjusted(&self) -> bool {
        self.original_time.date() != self.pattern_date
    }
}
