//! 설정 로드 및 출력.

use anyhow::{Context, Result};
use ohl_core::{AnalyzerConfig, DEFAULT_CONFIG_PATH};
use std::path::Path;

/// 설정을 로드합니다.
///
/// 경로를 지정하면 파일이 반드시 있어야 하고, 아니면 기본 경로를 선택적으로
/// 읽습니다. `window_days`가 있으면 `analysis.forward_window_days`를 덮어씁니다.
pub fn load_config(path: Option<&Path>, window_days: Option<i64>) -> Result<AnalyzerConfig> {
    let mut config = match path {
        Some(path) => AnalyzerConfig::load(path, true)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AnalyzerConfig::load_default()
            .with_context(|| format!("failed to load config from {}", DEFAULT_CONFIG_PATH))?,
    };

    if let Some(days) = window_days {
        config.analysis.forward_window_days = days;
        config
            .validate()
            .context("invalid --window-days override")?;
    }

    Ok(config)
}

/// 유효 설정을 TOML로 렌더링합니다.
pub fn render_config(config: &AnalyzerConfig) -> Result<String> {
    toml::to_string_pretty(config).context("failed to serialize config")
}
