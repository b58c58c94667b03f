//! 패턴 백테스트를 위한 도메인 모델.

mod levels;
mod occurrence;
mod outcome;

pub use levels::*;
pub use occurrence::*;
pub use outcome::*;
