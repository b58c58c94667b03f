//! CLI 명령어 구현 모듈.

pub mod analyze;
pub mod dates;
pub mod fetch;
pub mod settings;
