//! OHL 패턴 백테스터 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 패턴 목록 일괄 분석
//! ohl analyze -i patterns.csv -o results
//!
//! # 이후 구간을 15일로 늘려 분석
//! ohl analyze -i patterns.csv --window-days 15
//!
//! # 단일 종목 시세 구간 조회 (.NS 자동 추가)
//! ohl fetch RELIANCE 2024-03-15
//!
//! # 주말 보정 확인
//! ohl adjust-date 2024-03-16
//!
//! # 유효 설정 출력
//! ohl config
//! ```

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use ohl_cli::commands::{analyze, dates, fetch, settings};
use ohl_core::{init_logging, Interval, LogConfig};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "ohl")]
#[command(about = "OHL pattern backtester - 패턴 발생일 이후 목표가/손절가 선착 분석", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (기본: config/default.toml, 없으면 기본값)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 패턴 목록 CSV 일괄 분석
    Analyze {
        /// 패턴 목록 CSV (symbol, date 컬럼)
        #[arg(short, long)]
        input: PathBuf,

        /// 결과 디렉토리 (기본: 설정의 output.dir)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// 패턴일 이후 조회할 달력일 수
        #[arg(short, long)]
        window_days: Option<i64>,
    },

    /// 단일 종목의 조회일 앞뒤 시세 구간 출력
    Fetch {
        /// 종목 코드 (예: RELIANCE, RELIANCE.NS)
        symbol: String,

        /// 조회 날짜 (YYYY-MM-DD)
        date: String,

        /// 시세 주기 (1d: 일봉, 1w: 주봉, 1m: 월봉)
        #[arg(long, default_value = "1d")]
        interval: String,
    },

    /// 날짜의 주말 보정 결과 확인
    AdjustDate {
        /// 날짜 (YYYY-MM-DD 또는 DD-MM-YYYY)
        date: String,
    },

    /// 유효 설정을 TOML로 출력
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let window_days = match &cli.command {
        Commands::Analyze { window_days, .. } => *window_days,
        _ => None,
    };
    let config = settings::load_config(cli.config.as_deref(), window_days)?;

    init_logging(LogConfig::from_settings(&config.logging))
        .map_err(|e| anyhow!("failed to initialize logging: {}", e))?;

    match cli.command {
        Commands::Analyze {
            input, output_dir, ..
        } => {
            let output_dir = output_dir.unwrap_or_else(|| PathBuf::from(&config.output.dir));
            info!(
                input = %input.display(),
                output_dir = %output_dir.display(),
                window_days = config.analysis.forward_window_days,
                "Starting analysis"
            );

            match analyze::run(&config, analyze::AnalyzeConfig { input, output_dir }).await {
                Ok(output) => {
                    info!(
                        results = output.results,
                        errors = output.errors,
                        summary = %output.summary.display(),
                        "Analysis finished"
                    );
                }
                Err(e) => {
                    error!("Analysis failed: {:#}", e);
                    return Err(e);
                }
            }
        }

        Commands::Fetch {
            symbol,
            date,
            interval,
        } => {
            let date = dates::parse_date(&date)?;
            let interval: Interval = interval.parse().map_err(|e: String| anyhow!(e))?;
            fetch::run(&config, &symbol, date, interval).await?;
        }

        Commands::AdjustDate { date } => {
            let date = dates::parse_date(&date)?;
            println!("{}", dates::describe_adjustment(date));
        }

        Commands::Config => {
            print!("{}", settings::render_config(&config)?);
        }
    }

    Ok(())
}
