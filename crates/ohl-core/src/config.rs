//! 설정 관리.
//!
//! 기본값 → TOML 파일 → 환경 변수(`OHL__SECTION__KEY`) 순으로 덮어씁니다.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 조회 구간 상한 (달력일).
pub const MAX_WINDOW_DAYS: i64 = 3650;

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 분석기 설정.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// 분석 설정
    pub analysis: AnalysisConfig,
    /// 데이터 소스 설정
    pub provider: ProviderConfig,
    /// 출력 설정
    pub output: OutputConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 분석 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// 패턴일 이후 조회할 달력일 수
    pub forward_window_days: i64,
    /// 중간 결과 저장 주기 (발생 수)
    pub flush_every: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            forward_window_days: 10,
            flush_every: 50,
        }
    }
}

/// 데이터 소스 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Yahoo Finance 기본 URL
    pub base_url: String,
    /// 캐시 미스 시 호출 전 대기 (밀리초)
    pub request_delay_ms: u64,
    /// 조회 날짜 앞뒤로 가져올 달력일 수
    pub fetch_window_days: i64,
    /// 최대 시도 횟수
    pub max_retries: u32,
    /// 재시도 간격 (밀리초)
    pub retry_delay_ms: u64,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// 접미사가 없는 심볼에 붙일 거래소 접미사
    pub exchange_suffix: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            request_delay_ms: 100,
            fetch_window_days: 60,
            max_retries: 3,
            retry_delay_ms: 1000,
            timeout_secs: 10,
            exchange_suffix: ".NS".to_string(),
        }
    }
}

impl ProviderConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 출력 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// 결과 파일 디렉토리
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: ".".to_string(),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl AnalyzerConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// `required`가 false면 파일이 없어도 기본값으로 진행합니다.
    pub fn load<P: AsRef<Path>>(path: P, required: bool) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(required))
            .add_source(
                config::Environment::with_prefix("OHL")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// 기본 경로에서 설정을 로드합니다. 파일이 없으면 기본값을 사용합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load(DEFAULT_CONFIG_PATH, false)
    }

    /// 설정 값의 일관성을 확인합니다.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.analysis.forward_window_days < 1 {
            return Err(config::ConfigError::Message(
                "analysis.forward_window_days must be at least 1".to_string(),
            ));
        }
        if self.provider.fetch_window_days > MAX_WINDOW_DAYS {
            return Err(config::ConfigError::Message(format!(
                "provider.fetch_window_days must be at most {}",
                MAX_WINDOW_DAYS
            )));
        }
        if self.provider.fetch_window_days < self.analysis.forward_window_days {
            return Err(config::ConfigError::Message(format!(
                "provider.fetch_window_days ({}) must cover analysis.forward_window_days ({})",
                self.provider.fetch_window_days, self.analysis.forward_window_days
            )));
        }
        if self.provider.max_retries == 0 {
            return Err(config::ConfigError::Message(
                "provider.max_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
