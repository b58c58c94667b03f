//! 단일 종목 시세 구간 조회 명령.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use ohl_core::{return_pct, AnalyzerConfig, Interval, QuoteTable};
use ohl_data::{normalize_symbol, QuoteProvider, YahooChartProvider};
use rust_decimal::Decimal;
use std::fmt::Write;
use tracing::info;

/// 조회 구간 요약.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSummary {
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub total_volume: u64,
    /// (종가 - 시가) / 시가 × 100
    pub change_pct: Decimal,
    /// (고가 - 저가) / 저가 × 100
    pub range_pct: Decimal,
}

impl PeriodSummary {
    pub fn from_table(table: &QuoteTable) -> Option<Self> {
        let first = table.bars().first()?;
        let last = table.bars().last()?;
        let high = table.max_high()?;
        let low = table.min_low()?;

        Some(Self {
            open: first.open,
            high,
            low,
            close: last.close,
            total_volume: table.total_volume(),
            change_pct: return_pct(first.open, last.close),
            range_pct: return_pct(low, high),
        })
    }
}

/// 시세 테이블과 구간 요약을 텍스트로 만듭니다.
pub fn render_window(symbol: &str, date: NaiveDate, table: &QuoteTable) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Daily OHLC Data for {} on {}:", symbol, date);
    let _ = writeln!(
        out,
        "{:<12}  {:>10} {:>10} {:>10} {:>10} {:>14}",
        "Date", "Open", "High", "Low", "Close", "Volume"
    );
    let _ = writeln!(out, "{}", "-".repeat(72));
    for bar in table.bars() {
        let marker = if bar.date == date { " *" } else { "" };
        let _ = writeln!(
            out,
            "{:<12}  {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>14}{}",
            bar.date.format("%Y-%m-%d").to_string(),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume,
            marker
        );
    }

    if let Some(summary) = PeriodSummary::from_table(table) {
        let _ = write!(
            out,
            "\nPeriod Summary:\n\
             Open:          {:.2}\n\
             High:          {:.2}\n\
             Low:           {:.2}\n\
             Close:         {:.2}\n\
             Total Volume:  {}\n\
             Change:        {:+.2}%\n\
             Range:         {:.2}%\n",
            summary.open,
            summary.high,
            summary.low,
            summary.close,
            summary.total_volume,
            summary.change_pct,
            summary.range_pct,
        );
    }

    out
}

/// `fetch` 명령 실행.
pub async fn run(config: &AnalyzerConfig, symbol: &str, date: NaiveDate, interval: Interval) -> Result<()> {
    let provider =
        YahooChartProvider::new(&config.provider).context("failed to create Yahoo Finance client")?;
    let yahoo_symbol = normalize_symbol(symbol, &config.provider.exchange_suffix);

    info!(symbol = %yahoo_symbol, date = %date, interval = %interval, "Fetching quote window");

    let table = provider
        .fetch(symbol, date, interval)
        .await
        .with_context(|| format!("failed to fetch {} around {}", yahoo_symbol, date))?;

    match table {
        Some(table) => print!("{}", render_window(&yahoo_symbol, date, &table)),
        None => {
            println!("No data available for {} on {}", yahoo_symbol, date);
            println!("Note: this might be due to a market holiday or weekend");
        }
    }

    Ok(())
}
