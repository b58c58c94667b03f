//! 주말 보정 캘린더.
//!
//! 휴장일 달력은 사용하지 않습니다. 토요일/일요일만 다음 평일로 밀어냅니다.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// 평일(월~금)인지 확인합니다.
pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// 주말이면 다음 평일로 보정하고, 평일이면 그대로 반환합니다.
///
/// 결과는 항상 평일이고 입력보다 작지 않으며, 두 번 적용해도 같습니다.
pub fn adjust_to_weekday(date: NaiveDate) -> NaiveDate {
    let mut adjusted = date;
    while !is_weekday(adjusted) {
        adjusted += Duration::days(1);
    }
    adjusted
}

/// 바로 전 달력일 (패턴일 - 1일).
///
/// 손절가 조회에 사용되며 주말 보정을 하지 않습니다.
pub fn previous_calendar_day(date: NaiveDate) -> NaiveDate {
    date - Duration::days(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_saturday_moves_to_monday() {
        // 2024-03-16 = 토요일
        assert_eq!(adjust_to_weekday(ymd(2024, 3, 16)), ymd(2024, 3, 18));
        assert_eq!(adjust_to_weekday(ymd(2024, 3, 17)), ymd(2024, 3, 18));
    }

    #[test]
    fn test_weekday_unchanged() {
        assert_eq!(adjust_to_weekday(ymd(2024, 3, 15)), ymd(2024, 3, 15));
        assert_eq!(adjust_to_weekday(ymd(2024, 3, 18)), ymd(2024, 3, 18));
    }

    #[test]
    fn test_previous_calendar_day_crosses_weekend() {
        assert_eq!(previous_calendar_day(ymd(2024, 3, 18)), ymd(2024, 3, 17));
        assert_eq!(previous_calendar_day(ymd(2024, 3, 1)), ymd(2024, 2, 29));
    }

    proptest! {
        #[test]
        fn prop_adjust_is_weekday_monotone_idempotent(offset in 0i64..200_000) {
            let date = ymd(1900, 1, 1) + Duration::days(offset);
            let adjusted = adjust_to_weekday(date);

            prop_assert!(is_weekday(adjusted));
            prop_assert!(adjusted >= date);
            prop_assert!(adjusted - date <= Duration::days(2));
            prop_assert_eq!(adjust_to_weekday(adjusted), adjusted);
        }
    }
}
