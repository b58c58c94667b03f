//! Yahoo Finance v8 chart API Provider.
//!
//! 조회일 앞뒤 `fetch_window_days` 구간의 봉을 한 번에 가져옵니다.
//! 같은 테이블이 패턴일 진입가, 손절가, 이후 구간 스캔에 재사용됩니다.
//!
//! 응답에 조회일 봉이 없으면 (휴장일, 주말, 상장 전) `None`을 반환합니다.

use super::QuoteProvider;
use crate::error::{DataError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate};
use ohl_core::{Bar, Interval, ProviderConfig, QuoteTable};
use reqwest::{Client, StatusCode};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

/// 이미 거래소 접미사가 붙은 것으로 보는 접미사 목록
const KNOWN_SUFFIXES: [&str; 2] = [".NS", ".BO"];

/// Yahoo Finance 심볼 생성.
///
/// `.NS`/`.BO`가 이미 붙어 있으면 그대로 두고, 아니면 `suffix`를 붙입니다.
pub fn normalize_symbol(symbol: &str, suffix: &str) -> String {
    let symbol = symbol.trim().to_uppercase();
    if suffix.is_empty() || KNOWN_SUFFIXES.iter().any(|s| symbol.ends_with(s)) {
        return symbol;
    }
    format!("{}{}", symbol, suffix)
}

/// Yahoo Finance API v8 응답 구조
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    #[serde(default)]
    meta: Option<YahooMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooMeta {
    /// 거래소 현지 시간 오프셋 (초)
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<i64>>>,
}

/// Yahoo Finance chart API 클라이언트.
pub struct YahooChartProvider {
    client: Client,
    base_url: String,
    exchange_suffix: String,
    fetch_window_days: i64,
    max_retries: u32,
    retry_delay: std::time::Duration,
}

impl YahooChartProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            exchange_suffix: config.exchange_suffix.clone(),
            fetch_window_days: config.fetch_window_days,
            max_retries: config.max_retries.max(1),
            retry_delay: config.retry_delay(),
        })
    }

    /// 요청 URL 생성.
    fn chart_url(&self, symbol: &str, date: NaiveDate, interval: Interval) -> Result<String> {
        let window = Duration::try_days(self.fetch_window_days);
        let (start, end) = window
            .and_then(|w| Some((date.checked_sub_signed(w)?, date.checked_add_signed(w)?)))
            .ok_or_else(|| {
                DataError::InvalidData(format!(
                    "Fetch window of {} days around {} is out of range",
                    self.fetch_window_days, date
                ))
            })?;

        let start_ts = start
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| DataError::InvalidData(format!("Invalid start date: {}", start)))?
            .and_utc()
            .timestamp();
        let end_ts = end
            .and_hms_opt(23, 59, 59)
            .ok_or_else(|| DataError::InvalidData(format!("Invalid end date: {}", end)))?
            .and_utc()
            .timestamp();

        Ok(format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval={}&events=history",
            self.base_url,
            symbol,
            start_ts,
            end_ts,
            interval.to_yahoo_str()
        ))
    }

    /// 한 번의 HTTP 요청. 404는 데이터 없음으로 처리합니다.
    async fn request_chart(&self, url: &str) -> Result<Option<YahooChartResponse>> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::FetchError(format!(
                "Yahoo Finance API error: {} - {}",
                status, body
            )));
        }

        let body = response.text().await?;
        debug!(bytes = body.len(), "Yahoo Finance response received");

        let chart: YahooChartResponse = serde_json::from_str(&body)?;
        Ok(Some(chart))
    }

    /// 재시도 포함 요청.
    async fn request_with_retry(&self, url: &str) -> Result<Option<YahooChartResponse>> {
        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            match self.request_chart(url).await {
                Ok(chart) => return Ok(chart),
                Err(e) => {
                    warn!(
                        attempt = attempt,
                        max_retries = self.max_retries,
                        error = %e,
                        "Yahoo Finance request failed"
                    );
                    last_error = Some(e);
                    if attempt < self.max_retries {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            DataError::FetchError("Yahoo Finance request was never attempted".to_string())
        }))
    }
}

/// chart 응답을 시세 테이블로 변환합니다. 결과가 없으면 `None`.
fn parse_chart(symbol: &str, chart: YahooChartResponse) -> Option<QuoteTable> {
    if let Some(error) = chart.chart.error {
        debug!(
            symbol = symbol,
            code = %error.code,
            description = %error.description,
            "Yahoo Finance returned an error payload"
        );
    }

    let result = chart.chart.result?.into_iter().next()?;
    let offset = result.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next()?;

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();

    let price = |values: &[Option<f64>], i: usize| -> Option<Decimal> {
        values
            .get(i)
            .copied()
            .flatten()
            .and_then(Decimal::from_f64)
            .map(|d| d.round_dp(4))
    };

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let Some(date) = DateTime::from_timestamp(ts + offset, 0).map(|dt| dt.date_naive()) else {
            continue;
        };

        // 모든 필드가 유효한 경우만 추가
        let (Some(open), Some(high), Some(low), Some(close)) = (
            price(&opens, i),
            price(&highs, i),
            price(&lows, i),
            price(&closes, i),
        ) else {
            continue;
        };
        let volume = volumes.get(i).copied().flatten().unwrap_or(0).max(0) as u64;

        let bar = Bar::new(date, open, high, low, close, volume);
        if !bar.is_consistent() {
            warn!(symbol = symbol, date = %date, "Dropping inconsistent OHLC bar");
            continue;
        }
        bars.push(bar);
    }

    Some(QuoteTable::new(bars))
}

#[async_trait]
impl QuoteProvider for YahooChartProvider {
    async fn fetch(
        &self,
        symbol: &str,
        date: NaiveDate,
        interval: Interval,
    ) -> Result<Option<QuoteTable>> {
        let yahoo_symbol = normalize_symbol(symbol, &self.exchange_suffix);
        let url = self.chart_url(&yahoo_symbol, date, interval)?;

        debug!(symbol = %yahoo_symbol, date = %date, interval = %interval, "Fetching daily window");

        let Some(chart) = self.request_with_retry(&url).await? else {
            debug!(symbol = %yahoo_symbol, "Symbol not found on Yahoo Finance");
            return Ok(None);
        };

        let Some(table) = parse_chart(&yahoo_symbol, chart) else {
            return Ok(None);
        };

        if table.is_empty() {
            debug!(symbol = %yahoo_symbol, "No data available");
            return Ok(None);
        }

        // 조회일 봉이 있을 때만 전체 구간 반환
        if !table.contains_date(date) {
            debug!(
                symbol = %yahoo_symbol,
                date = %date,
                "No bar for requested date (market holiday or weekend)"
            );
            return Ok(None);
        }

        Ok(Some(table))
    }
}
