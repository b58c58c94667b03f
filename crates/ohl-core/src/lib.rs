//! # OHL Core
//!
//! OHL 패턴 백테스터의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 워크스페이스 전반에서 사용되는 기본 타입을 제공합니다:
//! - OHLCV 봉 및 시세 테이블
//! - 패턴 발생, 매매 레벨, 결과 레코드
//! - 주말 보정 캘린더
//! - 에러 타입
//! - 설정 관리
//! - 로깅 인프라 및 실행 추적 로그

pub mod calendar;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod trace;
pub mod types;

pub use calendar::*;
pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use trace::TraceLog;
pub use types::*;
