//! 端到端回测：数据目录 → 分发 → 加仓过滤 → 汇总 / CSV

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use approx::assert_relative_eq;
use arrow::array::{ArrayRef, Float64Array, Int64Array, TimestampSecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use tempfile::TempDir;

use rust_scalp::app::Args;
use rust_scalp::{BacktestRunner, ExitKind, PyramidPolicy, RunSettings, StrategyConfig};
use rust_scalp_strategies::TrendFilter;

type Row = (i64, f64, f64, f64, f64);

fn write_parquet(path: &Path, rows: &[Row]) {
    let times = Int64Array::from(rows.iter().map(|r| r.0).collect::<Vec<_>>());
    write_parquet_with_time(path, DataType::Int64, Arc::new(times), rows);
}

/// 时间列以秒为单位的 parquet，行中的时间戳按秒写入
fn write_parquet_seconds(path: &Path, rows: &[Row]) {
    let times = TimestampSecondArray::from(rows.iter().map(|r| r.0).collect::<Vec<_>>());
    write_parquet_with_time(
        path,
        DataType::Timestamp(TimeUnit::Second, None),
        Arc::new(times),
        rows,
    );
}

fn write_parquet_with_time(path: &Path, time_type: DataType, times: ArrayRef, rows: &[Row]) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("open_time", time_type, false),
        Field::new("open", DataType::Float64, false),
        Field::new("high", DataType::Float64, false),
        Field::new("low", DataType::Float64, false),
        Field::new("close", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            times,
            Arc::new(Float64Array::from(rows.iter().map(|r| r.1).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.2).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.3).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.4).collect::<Vec<_>>())),
        ],
    )
    .unwrap();
    let file = File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

fn write_csv(path: &Path, rows: &[Row]) {
    let mut body = String::from("timestamp,open,high,low,close\n");
    for (ts, o, h, l, c) in rows {
        body.push_str(&format!("{},{},{},{},{}\n", ts, o, h, l, c));
    }
    fs::write(path, body).unwrap();
}

/// 数据目录：
/// - BTCUSDT_1m: 60s 急涨做空 103，120s 止盈
/// - BTCUSDT_30s: 90s 急涨做空 113.3（BTCUSDT_1m 仍持仓），120s 止盈
/// - ETHUSDT_1m: 60s 急涨做空 51.5，120s 止盈
/// - EMPTY_1m: 只有表头
/// - BROKEN_1m: 缺少 close 列
fn data_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write_parquet(
        &root.join("BTCUSDT_1m.parquet"),
        &[
            (0, 100.0, 100.3, 99.9, 100.1),
            (60_000, 100.0, 103.0, 100.0, 103.0),
            (120_000, 103.0, 103.0, 98.0, 99.0),
        ],
    );
    write_csv(
        &root.join("BTCUSDT_30s.csv"),
        &[
            (0, 110.0, 110.2, 109.9, 110.0),
            (90_000, 110.0, 113.3, 110.0, 113.3),
            (120_000, 113.3, 113.3, 108.0, 108.5),
        ],
    );
    write_csv(
        &root.join("ETHUSDT_1m.csv"),
        &[
            (0, 50.0, 50.1, 49.95, 50.05),
            (60_000, 50.0, 51.5, 50.0, 51.5),
            (120_000, 51.5, 51.5, 49.0, 49.5),
        ],
    );
    write_csv(&root.join("EMPTY_1m.csv"), &[]);
    fs::write(root.join("BROKEN_1m.csv"), "timestamp,open,high,low\n0,1,1,1\n").unwrap();
    fs::write(root.join("README.txt"), "not a candle table").unwrap();
    dir
}

fn settings(serial: bool) -> RunSettings {
    RunSettings {
        strategy: StrategyConfig {
            trend: TrendFilter::Off,
            ..StrategyConfig::default()
        },
        workers: 3,
        serial,
        ..RunSettings::default()
    }
}

#[tokio::test]
async fn test_serial_and_parallel_runs_match() {
    let dir = data_dir();
    let serial = BacktestRunner::from_data_dir(dir.path(), settings(true))
        .unwrap()
        .run()
        .await
        .unwrap();
    let parallel = BacktestRunner::from_data_dir(dir.path(), settings(false))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(serial.trades, parallel.trades);
    assert_eq!(serial.summary, parallel.summary);

    assert_eq!(serial.instruments, 5);
    assert_eq!(serial.completed, 4);
    assert_eq!(serial.skipped, 1);
    assert_eq!(serial.raw_trades, 3);
    assert_eq!(serial.rejected, 1);

    let symbols: Vec<&str> = serial.trades.iter().map(|t| t.instrument_id.as_str()).collect();
    assert_eq!(symbols, vec!["BTCUSDT_1m", "ETHUSDT_1m"]);
    assert!(serial.trades.iter().all(|t| t.exit_kind == ExitKind::TakeProfit));
    assert_eq!(serial.summary.wins, 2);
    assert_relative_eq!(serial.summary.total_pnl, 2.0 * 7.0 * 0.04, epsilon = 1e-9);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_corrupt_timestamps_skip_only_that_table() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_parquet(
        &root.join("BTCUSDT_1m.parquet"),
        &[
            (0, 100.0, 100.3, 99.9, 100.1),
            (60_000, 100.0, 103.0, 100.0, 103.0),
            (120_000, 103.0, 103.0, 98.0, 99.0),
        ],
    );
    // 秒换算毫秒后超出 i64
    write_parquet_seconds(
        &root.join("CORRUPT_1m.parquet"),
        &[
            (0, 50.0, 50.1, 49.95, 50.05),
            (i64::MAX / 10, 50.0, 51.5, 50.0, 51.5),
        ],
    );

    let serial = BacktestRunner::from_data_dir(root, settings(true))
        .unwrap()
        .run()
        .await
        .unwrap();
    let parallel = BacktestRunner::from_data_dir(root, settings(false))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(serial.trades, parallel.trades);
    for report in [&serial, &parallel] {
        assert_eq!(report.instruments, 2);
        assert_eq!(report.completed, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(report.trades.len(), 1);
        assert_eq!(report.trades[0].instrument_id, "BTCUSDT_1m");
    }
}

#[tokio::test]
async fn test_pyramiding_across_timeframe_variants() {
    let dir = data_dir();
    let mut settings = settings(false);
    settings.pyramid = PyramidPolicy::new(2, 0.05);

    let report = BacktestRunner::from_data_dir(dir.path(), settings)
        .unwrap()
        .run()
        .await
        .unwrap();

    // 113.3 > 103 × 1.05，作为第二层加仓准入
    assert_eq!(report.rejected, 0);
    let added = report
        .trades
        .iter()
        .find(|t| t.instrument_id == "BTCUSDT_30s")
        .unwrap();
    assert_eq!(added.pyramid_level, 2);
    assert_eq!(report.summary.trades_by_level.get(&2), Some(&1));

    let mut strict = self::settings(false);
    strict.pyramid = PyramidPolicy::new(2, 0.15);
    let report = BacktestRunner::from_data_dir(dir.path(), strict)
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(report.rejected, 1);
    assert!(report.trades.iter().all(|t| t.pyramid_level == 1));
}

#[tokio::test]
async fn test_timeframe_filter_keeps_matching_tables() {
    let dir = data_dir();
    let mut settings = settings(true);
    settings.timeframe = Some("30s".to_string());
    let report = BacktestRunner::from_data_dir(dir.path(), settings)
        .unwrap()
        .run()
        .await
        .unwrap();
    assert_eq!(report.instruments, 1);
    assert_eq!(report.trades.len(), 1);
    assert_relative_eq!(report.trades[0].exit_price, 113.3 * 0.96, epsilon = 1e-9);
}

#[tokio::test]
async fn test_configuration_errors_are_fatal() {
    assert!(BacktestRunner::from_data_dir("/definitely/not/here", settings(true)).is_err());

    let dir = data_dir();
    let mut bad = settings(true);
    bad.pyramid = PyramidPolicy::new(1, -0.01);
    let runner = BacktestRunner::from_data_dir(dir.path(), bad).unwrap();
    assert!(runner.run().await.is_err());
}

#[tokio::test]
async fn test_cli_run_writes_ledger() {
    let dir = data_dir();
    let out_dir = tempfile::tempdir().unwrap();
    let output = out_dir.path().join("ledger.csv");

    let args = Args::try_parse_from([
        "rust_scalp",
        "--ema",
        "off",
        "--serial",
        "--data-dir",
        dir.path().to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ])
    .unwrap();
    let report = rust_scalp::run(args).await.unwrap();
    assert_eq!(report.trades.len(), 2);

    let content = fs::read_to_string(&output).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("symbol,level,side,entry_time,exit_time,type,entry_price,exit_price,pnl_percent,pnl_usd,duration_min")
    );
    let first = lines.next().unwrap();
    assert!(first.starts_with("BTCUSDT_1m,1,SHORT,1970-01-01T00:01:00.000Z,1970-01-01T00:02:00.000Z,TP,"));
    assert_eq!(lines.count(), 1);
}

#[tokio::test]
async fn test_cli_run_without_trades_skips_ledger() {
    let dir = data_dir();
    let out_dir = tempfile::tempdir().unwrap();
    let output = out_dir.path().join("ledger.csv");

    // 默认 SHORT 使用 all_bear 趋势，三根K线 EMA 未定义，不产生交易
    let args = Args::try_parse_from([
        "rust_scalp",
        "--data-dir",
        dir.path().to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
    ])
    .unwrap();
    let report = rust_scalp::run(args).await.unwrap();
    assert!(report.is_empty());
    assert!(!output.exists());
}
