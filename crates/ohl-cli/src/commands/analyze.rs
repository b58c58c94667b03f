//! 패턴 목록 일괄 분석 명령.
//!
//! 출력 파일 (출력 디렉토리 기준):
//! - `trade_analysis_results_{n}.csv` - `flush_every`개마다 중간 결과
//! - `trade_analysis_results_final.csv` - 최종 결과 (결과가 있을 때만)
//! - `analysis_summary.txt` - 요약 리포트
//! - `analysis_debug.log` - 실행 추적 로그

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use ohl_analytics::{write_results_csv, AnalyzerSettings, PatternAnalyzer, RunEvent};
use ohl_core::{AnalyzerConfig, OutcomeRecord};
use ohl_data::{load_patterns, YahooChartProvider};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const FINAL_RESULTS_FILE: &str = "trade_analysis_results_final.csv";
pub const SUMMARY_FILE: &str = "analysis_summary.txt";
pub const DEBUG_LOG_FILE: &str = "analysis_debug.log";

/// 중간 결과 파일 이름.
pub fn checkpoint_file_name(processed: usize) -> String {
    format!("trade_analysis_results_{}.csv", processed)
}

/// 분석 명령 설정.
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    /// 패턴 목록 CSV
    pub input: PathBuf,
    /// 결과 디렉토리
    pub output_dir: PathBuf,
}

/// 분석 결과 파일 경로.
#[derive(Debug, Clone)]
pub struct AnalyzeOutput {
    pub results: usize,
    pub errors: usize,
    pub final_results: Option<PathBuf>,
    pub summary: PathBuf,
    pub debug_log: PathBuf,
}

/// `analyze` 명령 실행.
pub async fn run(config: &AnalyzerConfig, args: AnalyzeConfig) -> Result<AnalyzeOutput> {
    let load = load_patterns(&args.input)
        .with_context(|| format!("failed to load pattern list {}", args.input.display()))?;

    std::fs::create_dir_all(&args.output_dir).with_context(|| {
        format!("failed to create output directory {}", args.output_dir.display())
    })?;

    let provider =
        YahooChartProvider::new(&config.provider).context("failed to create Yahoo Finance client")?;
    let mut analyzer = PatternAnalyzer::new(provider, AnalyzerSettings::from(config));
    analyzer.record_input_errors(load.rejected);

    let total = load.occurrences.len();
    println!("\nAnalyzing {} stock/date combinations...", total);

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );

    let output_dir = args.output_dir.as_path();
    analyzer
        .run(&load.occurrences, |event| match event {
            RunEvent::Processed { occurrence, .. } => {
                pb.set_message(occurrence.symbol.clone());
                pb.inc(1);
            }
            RunEvent::Checkpoint { processed, results } => {
                if !results.is_empty() {
                    save_checkpoint(output_dir, processed, results);
                }
            }
        })
        .await;
    pb.finish_with_message("done");

    println!("\nAnalysis complete!");

    let report = analyzer.report();
    println!("\n{}", report);

    let summary = output_dir.join(SUMMARY_FILE);
    std::fs::write(&summary, &report)
        .with_context(|| format!("failed to write {}", summary.display()))?;

    let final_results = if analyzer.results().is_empty() {
        None
    } else {
        let path = output_dir.join(FINAL_RESULTS_FILE);
        write_results_csv(&path, analyzer.results())
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("\nFinal results saved to: {}", path.display());
        Some(path)
    };

    let debug_log = output_dir.join(DEBUG_LOG_FILE);
    analyzer
        .trace()
        .write_to(&debug_log)
        .with_context(|| format!("failed to write {}", debug_log.display()))?;
    println!("Debug logs saved to: {}", debug_log.display());

    let stats = analyzer.cache_stats();
    info!(
        results = analyzer.results().len(),
        errors = analyzer.errors().len(),
        cache_entries = stats.entries,
        cache_hits = stats.hits,
        "Analysis outputs written"
    );

    Ok(AnalyzeOutput {
        results: analyzer.results().len(),
        errors: analyzer.errors().len(),
        final_results,
        summary,
        debug_log,
    })
}

/// 중간 결과 저장. 실패해도 분석은 계속합니다.
fn save_checkpoint(output_dir: &Path, processed: usize, results: &[OutcomeRecord]) {
    let path = output_dir.join(checkpoint_file_name(processed));
    match write_results_csv(&path, results) {
        Ok(()) => info!(path = %path.display(), rows = results.len(), "Checkpoint saved"),
        Err(e) => warn!(path = %path.display(), error = %e, "Checkpoint save failed"),
    }
}
