//! 백테스트 에러 타입.
//!
//! 모든 에러는 패턴 발생 단위로 처리됩니다. 배치 실행기는 에러를 기록하고
//! 다음 발생으로 넘어가며, 하나의 실패가 배치 전체를 중단시키지 않습니다.

use thiserror::Error;

/// 패턴 발생 단위 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BacktestError {
    /// 패턴일 데이터가 없어 진입가를 계산할 수 없음
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// 패턴일 이후 데이터 없음
    #[error("No forward data: {0}")]
    NoForwardData(String),

    /// 외부 데이터 소스 조회 실패
    #[error("Upstream fetch error: {0}")]
    UpstreamFetch(String),

    /// 입력 행 파싱 실패
    #[error("Malformed input row: {0}")]
    MalformedInputRow(String),
}

impl BacktestError {
    /// 에러 종류 이름 (요약/로그용).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientData(_) => "insufficient_data",
            Self::NoForwardData(_) => "no_forward_data",
            Self::UpstreamFetch(_) => "upstream_fetch",
            Self::MalformedInputRow(_) => "malformed_input_row",
        }
    }
}

/// 백테스트 작업을 위한 Result 타입.
pub type BacktestResult<T> = Result<T, BacktestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BacktestError::NoForwardData("TCS on 2024-03-15".to_string());
        assert_eq!(err.to_string(), "No forward data: TCS on 2024-03-15");
        assert_eq!(err.kind(), "no_forward_data");
    }
}
