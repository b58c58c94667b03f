//! 시세 데이터 조회 및 캐싱.
//!
//! 이 crate는 다음을 제공합니다:
//! - `QuoteProvider` 트레이트와 Yahoo Finance chart API 구현
//! - 실행 단위 시세 캐시 (호출 간격 제어 포함)
//! - 패턴 목록 CSV 로더

pub mod cache;
pub mod error;
pub mod input;
pub mod provider;

pub use cache::{CacheKey, CacheStats, QuoteCache};
pub use error::{DataError, Result};
pub use input::{load_patterns, parse_pattern_time, PatternLoad, PATTERN_DATE_FORMAT};
pub use provider::{normalize_symbol, QuoteProvider, YahooChartProvider};
