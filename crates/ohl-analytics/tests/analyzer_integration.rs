//! 배치 실행기 통합 테스트.
//!
//! 메모리 Provider로 전체 파이프라인을 검증합니다:
//! 1. 주말 보정된 발생 처리
//! 2. 캐시를 통한 중복 조회 제거
//! 3. 발생 단위 실패 기록 후 계속 진행
//! 4. 체크포인트 및 요약 리포트

use async_trait::async_trait;
use chrono::NaiveDate;
use ohl_analytics::{AnalyzerSettings, PatternAnalyzer, RunEvent};
use ohl_core::{
    BacktestError, Bar, ExitReason, Interval, PatternOccurrence, QuoteTable, StopLossSource,
};
use ohl_data::{DataError, QuoteProvider};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 종목별 고정 테이블을 돌려주는 Provider.
///
/// 요청 날짜의 봉이 없으면 `None`을 반환합니다.
struct InMemoryProvider {
    tables: HashMap<String, QuoteTable>,
    failing: Vec<String>,
    failing_on: Vec<(String, NaiveDate)>,
    calls: AtomicUsize,
}

#[async_trait]
impl QuoteProvider for InMemoryProvider {
    async fn fetch(
        &self,
        symbol: &str,
        date: NaiveDate,
        _interval: Interval,
    ) -> ohl_data::Result<Option<QuoteTable>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.iter().any(|s| s == symbol)
            || self.failing_on.iter().any(|(s, d)| s == symbol && *d == date)
        {
            return Err(DataError::FetchError(format!("{} upstream timeout", symbol)));
        }
        Ok(self
            .tables
            .get(symbol)
            .filter(|t| t.contains_date(date))
            .cloned())
    }
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

fn bar(d: u32, open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> Bar {
    Bar::new(date(d), open, high, low, close, 10_000)
}

fn occurrence(symbol: &str, d: u32) -> PatternOccurrence {
    PatternOccurrence::new(symbol, date(d).and_hms_opt(9, 30, 0).unwrap())
}

fn provider() -> Arc<InMemoryProvider> {
    let mut tables = HashMap::new();
    tables.insert(
        "RELIANCE".to_string(),
        QuoteTable::new(vec![
            bar(13, dec!(99), dec!(99.5), dec!(98), dec!(99)),
            bar(14, dec!(99), dec!(100), dec!(98.8), dec!(99.5)),
            bar(15, dec!(99), dec!(99), dec!(98.5), dec!(98.8)),
            bar(18, dec!(99.5), dec!(102), dec!(99), dec!(101)),
        ]),
    );
    tables.insert(
        "TCS".to_string(),
        QuoteTable::new(vec![
            bar(15, dec!(100), dec!(101), dec!(95), dec!(100)),
            bar(18, dec!(99), dec!(100), dec!(97), dec!(99)),
            bar(19, dec!(99), dec!(99.5), dec!(94), dec!(95)),
        ]),
    );
    tables.insert(
        "HDFC".to_string(),
        QuoteTable::new(vec![
            bar(13, dec!(50), dec!(51), dec!(49), dec!(50)),
            bar(14, dec!(50), dec!(52), dec!(49.5), dec!(51)),
        ]),
    );
    tables.insert(
        "SBIN".to_string(),
        QuoteTable::new(vec![
            bar(15, dec!(50), dec!(51), dec!(49), dec!(50)),
            bar(18, dec!(50), dec!(50.5), dec!(48), dec!(49)),
            bar(19, dec!(49), dec!(52), dec!(48.5), dec!(51)),
        ]),
    );

    Arc::new(InMemoryProvider {
        tables,
        failing: vec!["WIPRO".to_string()],
        failing_on: vec![("SBIN".to_string(), date(17))],
        calls: AtomicUsize::new(0),
    })
}

fn settings(flush_every: usize) -> AnalyzerSettings {
    AnalyzerSettings {
        forward_window_days: 10,
        flush_every,
        request_delay: Duration::ZERO,
        interval: Interval::D1,
    }
}

fn occurrences() -> Vec<PatternOccurrence> {
    vec![
        occurrence("RELIANCE", 14),
        // 토요일 → 월요일
        occurrence("TCS", 16),
        occurrence("INFY", 14),
        occurrence("RELIANCE", 14),
        occurrence("WIPRO", 14),
        occurrence("HDFC", 14),
    ]
}

#[tokio::test]
async fn test_batch_run_end_to_end() {
    let provider = provider();
    let mut analyzer = PatternAnalyzer::new(Arc::clone(&provider), settings(2));

    let mut processed = 0;
    let mut checkpoints = Vec::new();
    analyzer
        .run(&occurrences(), |event| match event {
            RunEvent::Processed { .. } => processed += 1,
            RunEvent::Checkpoint { processed, results } => {
                checkpoints.push((processed, results.len()))
            }
        })
        .await;

    assert_eq!(processed, 6);
    assert_eq!(checkpoints, vec![(2, 2), (4, 3), (6, 3)]);

    let results = analyzer.results();
    assert_eq!(results.len(), 3);

    // RELIANCE: 진입 100, 손절 98 (13일 저가), 18일 목표가 도달
    let reliance = &results[0];
    assert_eq!(reliance.exit_reason(), ExitReason::TargetHit);
    assert_eq!(reliance.levels.entry_price, dec!(100));
    assert_eq!(reliance.levels.stop_loss_price, dec!(98));
    assert_eq!(reliance.levels.stop_loss_source, StopLossSource::PriorDay);
    assert_eq!(reliance.exit_day_offset, 4);
    assert_eq!(reliance.exit_price, dec!(100.2));

    // TCS: 일요일 직전일 데이터 없음 → 구간 최저가 94로 대체, 19일 손절
    let tcs = &results[1];
    assert_eq!(tcs.pattern_date(), date(18));
    assert_eq!(tcs.levels.stop_loss_source, StopLossSource::WindowFallback);
    assert_eq!(tcs.levels.stop_loss_price, dec!(94));
    assert_eq!(tcs.exit_reason(), ExitReason::StopLoss);
    assert_eq!(tcs.exit_day_offset, 1);

    assert_eq!(results[2], results[0]);

    // INFY 데이터 없음, WIPRO 조회 실패, HDFC 이후 데이터 없음
    let errors = analyzer.errors();
    assert_eq!(errors.len(), 3);
    assert!(errors[0].starts_with("INFY on 2024-03-14"));
    assert!(errors[1].contains("upstream timeout"));
    assert!(errors[2].contains("No forward data"));

    // 중복 RELIANCE 발생은 캐시에서 처리
    assert_eq!(provider.calls.load(Ordering::SeqCst), 8);
    let stats = analyzer.cache_stats();
    assert_eq!(stats.misses, 8);
    assert_eq!(stats.failures, 1);

    let trace = analyzer.trace();
    assert!(trace
        .lines()
        .iter()
        .any(|l| l == "Adjusted 2024-03-16 to 2024-03-18 (weekend adjustment)"));

    let report = analyzer.report();
    assert!(report.contains("Total Trades Analyzed: 3"));
    assert!(report.contains("Errors Encountered: 3"));
}

#[tokio::test]
async fn test_failures_only_reports_no_results() {
    let mut analyzer = PatternAnalyzer::new(provider(), settings(50));
    analyzer.record_input_errors(vec![BacktestError::MalformedInputRow(
        "line 2: invalid date".to_string(),
    )]);

    analyzer
        .run(&[occurrence("INFY", 14), occurrence("WIPRO", 14)], |_| {})
        .await;

    assert!(analyzer.results().is_empty());
    assert_eq!(analyzer.errors().len(), 3);
    assert!(analyzer.summary().is_none());
    assert_eq!(analyzer.report(), "No results to analyze");
}

#[tokio::test]
async fn test_failed_fetch_not_retried_within_run() {
    let provider = provider();
    let mut analyzer = PatternAnalyzer::new(Arc::clone(&provider), settings(0));

    analyzer
        .run(&[occurrence("WIPRO", 14), occurrence("WIPRO", 14)], |_| {})
        .await;

    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    assert_eq!(analyzer.errors().len(), 2);
    assert!(analyzer.errors()[0].contains("Upstream fetch error"));
    assert!(analyzer.errors()[1].contains("Insufficient data"));
}

#[tokio::test]
async fn test_short_window_degrades_to_time_exit() {
    let mut analyzer = PatternAnalyzer::new(
        provider(),
        AnalyzerSettings {
            forward_window_days: 1,
            ..settings(0)
        },
    );

    let record = analyzer
        .process(&occurrence("RELIANCE", 14))
        .await
        .unwrap()
        .clone();

    assert_eq!(record.exit_reason(), ExitReason::TimeExit);
    assert_eq!(record.exit_price, dec!(98.8));
    assert_eq!(record.daily_performance.len(), 1);
}

#[tokio::test]
async fn test_prior_day_fetch_failure_falls_back_regardless_of_order() {
    let provider = provider();
    let mut analyzer = PatternAnalyzer::new(Arc::clone(&provider), settings(0));

    // 18일 월요일 → 직전일 17일 조회 실패
    analyzer
        .run(&[occurrence("SBIN", 18), occurrence("SBIN", 18)], |_| {})
        .await;

    assert!(analyzer.errors().is_empty());
    let results = analyzer.results();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0], results[1]);
    assert_eq!(
        results[0].levels.stop_loss_source,
        StopLossSource::WindowFallback
    );
    assert_eq!(results[0].levels.stop_loss_price, dec!(48));
    assert_eq!(results[0].exit_reason(), ExitReason::TargetHit);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    assert!(analyzer
        .trace()
        .lines()
        .iter()
        .any(|l| l.starts_with("Previous day 2024-03-17 fetch failed")));
}
