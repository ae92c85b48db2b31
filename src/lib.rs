//! # Rust Scalp
//!
//! 急涨/急跌剥头皮策略的多标的回测
//!
//! ## 核心组件
//! - `app::cli`: 命令行参数
//! - [`app_init`]: 环境变量与日志初始化
//! - [`run`]: 回测、打印汇总、写出交易明细

use anyhow::Result;
use dotenv::dotenv;
use tracing::info;

pub mod app;

// 重新导出核心依赖
pub use rust_scalp_analytics::{write_ledger_csv, BacktestSummary};
pub use rust_scalp_core::error::{AppError, AppResult};
pub use rust_scalp_domain::{Candle, CandleTable, ExitKind, ExitPriority, Signal, Trade, TradeSide};
pub use rust_scalp_market::{CandleSource, FileCandleSource, MemoryCandleSource};
pub use rust_scalp_orchestration::{BacktestReport, BacktestRunner, RunSettings};
pub use rust_scalp_risk::PyramidPolicy;
pub use rust_scalp_strategies::{StrategyConfig, StrategyKind};

use app::Args;

/// 应用初始化
pub fn app_init() -> Result<()> {
    dotenv().ok();
    rust_scalp_core::logger::setup_logging()?;
    info!("应用初始化完成");
    Ok(())
}

/// 运行一次回测
pub async fn run(args: Args) -> Result<BacktestReport> {
    let settings = args.run_settings();
    let data_dir = args.data_dir();

    print_banner(&settings, &data_dir.display().to_string());

    let runner = BacktestRunner::from_data_dir(&data_dir, settings)?;
    let report = runner.run().await?;

    if report.is_empty() {
        println!("\nNo trades generated.");
        return Ok(report);
    }

    println!("\nRESULTS");
    println!("{}", "-".repeat(50));
    print!("{}", report.summary);
    println!("{}", "-".repeat(50));
    println!(
        "Instruments: {} ({} skipped, {} failed), raw trades: {}, rejected by pyramid: {}",
        report.instruments, report.skipped, report.failed, report.raw_trades, report.rejected
    );

    write_ledger_csv(&args.output, &report.trades)?;
    println!("\nSaved results to {}", args.output.display());
    Ok(report)
}

fn print_banner(settings: &RunSettings, data_dir: &str) {
    println!("{}", "=".repeat(50));
    println!("RUST SCALP BACKTEST");
    println!("{}", "=".repeat(50));
    println!("{}", settings.strategy.describe());
    println!(
        "max_pos={} avg_thresh={:.2}% workers={} parallel={} tf={}",
        settings.pyramid.max_positions,
        settings.pyramid.avg_threshold * 100.0,
        settings.workers,
        !settings.serial,
        settings.timeframe.as_deref().unwrap_or("all")
    );
    println!("data_dir={}", data_dir);
    println!("{}", "=".repeat(50));
}
