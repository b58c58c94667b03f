//! 실행 단위 시세 캐시.
//!
//! 한 번의 분석 실행 동안 같은 (종목, 날짜, 주기) 조회는 외부 Provider를
//! 최대 한 번만 호출합니다. 축출 정책은 없으며, 실행이 끝나면 캐시도
//! 함께 버려집니다.

mod quote;

pub use quote::{CacheKey, CacheStats, QuoteCache};
