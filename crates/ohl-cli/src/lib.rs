//! OHL 패턴 백테스터 CLI 도구.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 패턴 목록 일괄 분석 및 결과 파일 저장
//! - 단일 종목 시세 구간 조회
//! - 주말 보정 확인
//! - 유효 설정 출력

pub mod commands;

pub use commands::*;
