//! 패턴 백테스트 분석 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 매매 레벨 산출 (진입가, 손절가)
//! - 결과 판정 (목표가/손절가 선착 스캔)
//! - 요약 통계 및 텍스트 리포트
//! - 결과 CSV 내보내기
//! - 배치 실행기 (`PatternAnalyzer`)

pub mod analyzer;
pub mod export;
pub mod levels;
pub mod resolver;
pub mod summary;

pub use analyzer::{AnalyzerSettings, PatternAnalyzer, RunEvent};
pub use export::{write_results_csv, ExportError, OutcomeRow};
pub use levels::derive_levels;
pub use resolver::resolve_outcome;
pub use summary::{render_report, RangeStats, Summary, NO_RESULTS_MESSAGE};
