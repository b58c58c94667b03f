//! 배치 실행기.
//!
//! 패턴 발생을 하나씩 순서대로 처리합니다:
//! 시세 캐시 → 레벨 산출 → 결과 판정.
//!
//! 발생 단위 실패는 에러 목록과 추적 로그에 남기고 다음 발생으로 넘어갑니다.
//! 하나의 실패가 배치 전체를 중단시키지 않습니다.

use chrono::NaiveDate;
use ohl_core::{
    previous_calendar_day, AnalyzerConfig, BacktestError, BacktestResult, Interval,
    OutcomeRecord, PatternOccurrence, QuoteTable, TraceLog, TARGET_MULTIPLIER,
};
use ohl_data::{CacheStats, QuoteCache, QuoteProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::levels::derive_levels;
use crate::resolver::resolve_outcome;
use crate::summary::{render_report, Summary};

/// 실행기 설정.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerSettings {
    /// 패턴일 이후 조회할 달력일 수
    pub forward_window_days: i64,
    /// 체크포인트 주기 (0이면 사용 안 함)
    pub flush_every: usize,
    /// 캐시 미스 시 대기 시간
    pub request_delay: Duration,
    /// 시세 주기
    pub interval: Interval,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self::from(&AnalyzerConfig::default())
    }
}

impl From<&AnalyzerConfig> for AnalyzerSettings {
    fn from(config: &AnalyzerConfig) -> Self {
        Self {
            forward_window_days: config.analysis.forward_window_days,
            flush_every: config.analysis.flush_every,
            request_delay: config.provider.request_delay(),
            interval: Interval::D1,
        }
    }
}

/// 실행 중 이벤트.
#[derive(Debug)]
pub enum RunEvent<'a> {
    /// 발생 하나 처리 완료
    Processed {
        index: usize,
        total: usize,
        occurrence: &'a PatternOccurrence,
        outcome: Result<&'a OutcomeRecord, &'a BacktestError>,
    },
    /// `flush_every`개마다 누적 결과 전달
    Checkpoint {
        processed: usize,
        results: &'a [OutcomeRecord],
    },
}

/// 패턴 백테스트 실행기.
///
/// 캐시, 추적 로그, 결과, 에러 목록을 모두 소유합니다. 인스턴스끼리는
/// 아무 상태도 공유하지 않습니다.
pub struct PatternAnalyzer<P> {
    settings: AnalyzerSettings,
    cache: QuoteCache<P>,
    trace: TraceLog,
    results: Vec<OutcomeRecord>,
    errors: Vec<String>,
}

impl<P: QuoteProvider> PatternAnalyzer<P> {
    pub fn new(provider: P, settings: AnalyzerSettings) -> Self {
        let cache = QuoteCache::new(provider, settings.request_delay);
        Self {
            settings,
            cache,
            trace: TraceLog::new(),
            results: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    pub fn results(&self) -> &[OutcomeRecord] {
        &self.results
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn trace(&self) -> &TraceLog {
        &self.trace
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// 입력 단계에서 건너뛴 행을 에러 목록에 추가합니다.
    pub fn record_input_errors(&mut self, rejected: impl IntoIterator<Item = BacktestError>) {
        for error in rejected {
            self.record_error(error.to_string());
        }
    }

    fn record_error(&mut self, message: String) {
        self.trace.push(message.clone());
        self.errors.push(message);
    }

    /// 발생 목록 전체를 처리합니다.
    pub async fn run<F>(&mut self, occurrences: &[PatternOccurrence], mut on_event: F)
    where
        F: FnMut(RunEvent<'_>),
    {
        let total = occurrences.len();
        info!(
            total = total,
            window_days = self.settings.forward_window_days,
            "Analyzing pattern occurrences"
        );

        for (index, occurrence) in occurrences.iter().enumerate() {
            let outcome = self.process(occurrence).await;
            on_event(RunEvent::Processed {
                index,
                total,
                occurrence,
                outcome: outcome.as_ref().map(|record| *record),
            });

            let processed = index + 1;
            if self.settings.flush_every > 0 && processed % self.settings.flush_every == 0 {
                on_event(RunEvent::Checkpoint {
                    processed,
                    results: &self.results,
                });
            }
        }

        let stats = self.cache.stats();
        info!(
            results = self.results.len(),
            errors = self.errors.len(),
            cache_hits = stats.hits,
            cache_misses = stats.misses,
            "Analysis complete"
        );
    }

    /// 발생 하나를 처리하고 결과 또는 에러를 기록합니다.
    pub async fn process(
        &mut self,
        occurrence: &PatternOccurrence,
    ) -> BacktestResult<&OutcomeRecord> {
        match self.analyze_occurrence(occurrence).await {
            Ok(record) => {
                debug!(
                    symbol = %record.symbol(),
                    date = %record.pattern_date(),
                    exit_reason = %record.exit_reason(),
                    exit_day = record.exit_day_offset,
                    "Occurrence resolved"
                );
                let index = self.results.len();
                self.results.push(record);
                Ok(&self.results[index])
            }
            Err(e) => {
                warn!(
                    symbol = %occurrence.symbol,
                    date = %occurrence.pattern_date,
                    kind = e.kind(),
                    error = %e,
                    "Occurrence skipped"
                );
                self.record_error(format!(
                    "{} on {}: {}",
                    occurrence.symbol, occurrence.pattern_date, e
                ));
                Err(e)
            }
        }
    }

    /// 발생 하나의 결과를 계산합니다. 결과/에러 목록은 건드리지 않습니다.
    #[instrument(skip(self, occurrence), fields(symbol = %occurrence.symbol, date = %occurrence.pattern_date))]
    pub async fn analyze_occurrence(
        &mut self,
        occurrence: &PatternOccurrence,
    ) -> BacktestResult<OutcomeRecord> {
        let symbol = occurrence.symbol.as_str();
        let pattern_date = occurrence.pattern_date;

        if occurrence.was_adjusted() {
            self.trace.push(format!(
                "Adjusted {} to {} (weekend adjustment)",
                occurrence.original_time.format("%Y-%m-%d"),
                pattern_date
            ));
        }

        let pattern_table = self
            .cache
            .get(symbol, pattern_date, self.settings.interval)
            .await?
            .ok_or_else(|| {
                BacktestError::InsufficientData(format!(
                    "no quote data for {} on {}",
                    symbol, pattern_date
                ))
            })?;
        self.trace_table("Pattern day", pattern_date, &pattern_table);

        let prior_date = previous_calendar_day(pattern_date);
        // 직전일 조회 실패는 데이터 없음과 같게 처리 (캐시에도 없음으로 남음)
        let prior_lookup = match self.cache.get(symbol, prior_date, self.settings.interval).await {
            Ok(table) => table,
            Err(e) => {
                warn!(symbol = %symbol, date = %prior_date, error = %e, "Previous day fetch failed");
                self.trace.push(format!("Previous day {} fetch failed: {}", prior_date, e));
                None
            }
        };
        let prior_table = match prior_lookup {
            Some(table) => {
                self.trace_table("Previous day", prior_date, &table);
                table
            }
            None => {
                self.trace.push(format!(
                    "No data for previous day {}, using pattern day window",
                    prior_date
                ));
                Arc::clone(&pattern_table)
            }
        };

        let levels = derive_levels(&pattern_table, &prior_table, pattern_date, prior_date)?;
        self.trace.push(format!(
            "Levels: entry={} target={} stop={} ({})",
            levels.entry_price,
            levels.entry_price * TARGET_MULTIPLIER,
            levels.stop_loss_price,
            levels.stop_loss_source.as_str()
        ));

        // 패턴일 조회 구간이 이후 구간까지 포함함
        resolve_outcome(
            occurrence,
            &levels,
            &pattern_table,
            self.settings.forward_window_days,
            &mut self.trace,
        )
    }

    fn trace_table(&mut self, label: &str, date: NaiveDate, table: &QuoteTable) {
        let range = match (table.first_date(), table.last_date()) {
            (Some(first), Some(last)) => format!("{} to {}", first, last),
            _ => "N/A".to_string(),
        };
        self.trace.push(format!(
            "{} ({}) data: {} bars, {} | bars on date: {}",
            label,
            date,
            table.len(),
            range,
            table.on_date(date).count()
        ));
    }

    /// 현재까지의 요약.
    pub fn summary(&self) -> Option<Summary> {
        Summary::from_records(&self.results, &self.errors)
    }

    /// 현재까지의 텍스트 리포트.
    pub fn report(&self) -> String {
        render_report(&self.results, &self.errors)
    }
}
