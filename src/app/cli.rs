//! 命令行参数
//!
//! 百分比参数以百分数给出（`--tp 4` 即 4%），转换为配置时除以 100；
//! `--marubozu` 是 0 到 1 的比值，不做转换

use std::path::PathBuf;

use clap::Parser;

use rust_scalp_analytics::DEFAULT_LEDGER_PATH;
use rust_scalp_core::config::environment::{data_root, default_workers};
use rust_scalp_domain::{ExitPriority, TradeSide};
use rust_scalp_orchestration::RunSettings;
use rust_scalp_risk::PyramidPolicy;
use rust_scalp_strategies::{EntryCondition, StrategyConfig, StrategyKind, TrendFilter};

#[derive(Debug, Clone, Parser)]
#[command(name = "rust_scalp", version, about = "急涨/急跌剥头皮策略多标的回测")]
pub struct Args {
    /// 策略：vectorized | pump-short | ema-pump
    #[arg(short, long, default_value = "vectorized")]
    pub strategy: StrategyKind,

    /// 止盈百分比
    #[arg(long, default_value_t = 4.0)]
    pub tp: f64,

    /// 止损百分比
    #[arg(long, default_value_t = 2.0)]
    pub sl: f64,

    /// 方向：LONG | SHORT
    #[arg(long, default_value = "SHORT")]
    pub side: TradeSide,

    /// 入场条件：pump | dump
    #[arg(long, default_value = "pump")]
    pub cond: EntryCondition,

    /// 急涨阈值百分比
    #[arg(long, default_value_t = 2.0)]
    pub pump: f64,

    /// 急跌阈值百分比
    #[arg(long, default_value_t = 2.0)]
    pub dump: f64,

    /// 移动止损百分比，0 为关闭
    #[arg(long, default_value_t = 0.0)]
    pub tsl: f64,

    /// 光头光脚阈值（实体 / 振幅）
    #[arg(long, default_value_t = 0.80)]
    pub marubozu: f64,

    /// 每笔名义仓位
    #[arg(long, default_value_t = 7.0)]
    pub bet: f64,

    /// 并发数，默认为 CPU 核数
    #[arg(long)]
    pub workers: Option<usize>,

    /// 同一基础标的最大同时持仓数
    #[arg(long = "max-pos", default_value_t = 1)]
    pub max_pos: usize,

    /// 加仓均价阈值百分比
    #[arg(long = "avg-thresh", default_value_t = 0.0)]
    pub avg_thresh: f64,

    /// 串行执行
    #[arg(long)]
    pub serial: bool,

    /// 周期过滤，如 30s
    #[arg(long)]
    pub tf: Option<String>,

    /// 趋势过滤
    #[arg(long, default_value = "none")]
    pub ema: TrendFilter,

    /// K线数据目录，默认读取 DATA_ROOT
    #[arg(long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// 交易明细输出路径
    #[arg(long, default_value = DEFAULT_LEDGER_PATH)]
    pub output: PathBuf,

    /// 同一根K线同时触及止损与止盈时按止损处理（默认）
    #[arg(long = "stop-first", conflicts_with = "target_first")]
    pub stop_first: bool,

    /// 同一根K线同时触及止损与止盈时按止盈处理
    #[arg(long = "target-first")]
    pub target_first: bool,
}

impl Args {
    pub fn strategy_config(&self) -> StrategyConfig {
        StrategyConfig {
            strategy: self.strategy,
            side: self.side,
            take_profit: self.tp / 100.0,
            stop_loss: self.sl / 100.0,
            trailing_stop: self.tsl / 100.0,
            entry_condition: self.cond,
            pump_threshold: self.pump / 100.0,
            dump_threshold: self.dump / 100.0,
            marubozu_threshold: self.marubozu,
            trend: self.ema,
            bet_size: self.bet,
            exit_priority: self.exit_priority(),
        }
    }

    pub fn exit_priority(&self) -> ExitPriority {
        if self.target_first {
            ExitPriority::TargetFirst
        } else {
            ExitPriority::StopFirst
        }
    }

    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            strategy: self.strategy_config(),
            pyramid: PyramidPolicy::new(self.max_pos, self.avg_thresh / 100.0),
            workers: self.workers.unwrap_or_else(default_workers),
            serial: self.serial,
            timeframe: self.tf.clone(),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(data_root()))
    }
}
