//! 시세 조회 간격 정의.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 시세 조회 간격.
///
/// 캐시 키의 일부이며, 상위 데이터 소스에 그대로 전달됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    /// 일봉
    D1,
    /// 주봉
    W1,
    /// 월봉
    M1,
}

impl Interval {
    /// Yahoo Finance 간격 문자열 반환
    pub fn to_yahoo_str(&self) -> &'static str {
        match self {
            Self::D1 => "1d",
            Self::W1 => "1wk",
            Self::M1 => "1mo",
        }
    }

    /// 캐시 키에 쓰이는 짧은 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::D1 => "1d",
            Self::W1 => "1w",
            Self::M1 => "1m",
        }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::D1
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1d" | "d1" | "d" | "daily" => Ok(Self::D1),
            "1w" | "1wk" | "w1" | "w" | "weekly" => Ok(Self::W1),
            "1m" | "1mo" | "m1" | "m" | "monthly" => Ok(Self::M1),
            _ => Err(format!(
                "Invalid interval: {}. Supported: 1d (daily), 1w (weekly), 1m (monthly)",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_parsing() {
        assert_eq!("1d".parse::<Interval>().unwrap(), Interval::D1);
        assert_eq!("daily".parse::<Interval>().unwrap(), Interval::D1);
        assert_eq!("1wk".parse::<Interval>().unwrap(), Interval::W1);
        assert_eq!("M".parse::<Interval>().unwrap(), Interval::M1);
        assert!("5m-ish".parse::<Interval>().is_err());
    }

    #[test]
    fn test_yahoo_str() {
        assert_eq!(Interval::D1.to_yahoo_str(), "1d");
        assert_eq!(Interval::W1.to_yahoo_str(), "1wk");
        assert_eq!(Interval::default().to_string(), "1d");
    }
}
