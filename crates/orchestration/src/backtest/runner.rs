//! 端到端回测运行器
//!
//! 配置校验 → 标的发现 → 分发（屏障）→ 加仓过滤 → 汇总

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use rust_scalp_analytics::BacktestSummary;
use rust_scalp_core::config::environment::default_workers;
use rust_scalp_core::error::{AppError, AppResult};
use rust_scalp_domain::Trade;
use rust_scalp_market::{CandleSource, FileCandleSource};
use rust_scalp_risk::{apply_pyramid, PyramidPolicy};
use rust_scalp_strategies::StrategyConfig;

use super::dispatcher::{Dispatcher, ParallelDispatcher, SerialDispatcher};
use super::job::{JobOutcome, JobStatus};

/// 一次回测运行的全部参数
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSettings {
    pub strategy: StrategyConfig,
    pub pyramid: PyramidPolicy,
    pub workers: usize,
    /// 串行执行，用于调试与校验并行结果
    pub serial: bool,
    /// 只回测该周期后缀的标的，如 `1m`
    pub timeframe: Option<String>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            strategy: StrategyConfig::default(),
            pyramid: PyramidPolicy::default(),
            workers: default_workers(),
            serial: false,
            timeframe: None,
        }
    }
}

impl RunSettings {
    /// 任何参数非法都在加载数据前报错
    pub fn validate(&self) -> AppResult<()> {
        self.strategy
            .validate()
            .map_err(|e| AppError::ConfigError(e.to_string()))?;
        self.pyramid.validate().map_err(AppError::ConfigError)?;
        if self.workers == 0 {
            return Err(AppError::ConfigError("workers 必须大于 0".to_string()));
        }
        Ok(())
    }

    fn dispatcher(&self) -> Box<dyn Dispatcher> {
        if self.serial {
            Box::new(SerialDispatcher)
        } else {
            Box::new(ParallelDispatcher::new(self.workers))
        }
    }
}

/// 回测结果
#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    pub run_id: Uuid,
    pub instruments: usize,
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
    /// 加仓过滤前的交易数
    pub raw_trades: usize,
    pub rejected: usize,
    /// 准入交易，按开仓时间排序
    pub trades: Vec<Trade>,
    pub summary: BacktestSummary,
    pub elapsed_ms: u128,
}

impl BacktestReport {
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

/// 回测运行器
pub struct BacktestRunner {
    source: Arc<dyn CandleSource>,
    settings: RunSettings,
}

impl BacktestRunner {
    pub fn new(source: Arc<dyn CandleSource>, settings: RunSettings) -> Self {
        Self { source, settings }
    }

    /// 以数据目录构建，目录不存在视为配置错误
    pub fn from_data_dir(data_dir: impl AsRef<Path>, settings: RunSettings) -> AppResult<Self> {
        let source = FileCandleSource::new(data_dir.as_ref())
            .map_err(|e| AppError::ConfigError(e.to_string()))?;
        Ok(Self::new(Arc::new(source), settings))
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// 执行回测
    ///
    /// 单标的错误只影响该标的；配置错误与加仓过滤错误直接返回 Err
    pub async fn run(&self) -> Result<BacktestReport> {
        let start = Instant::now();
        let run_id = Uuid::new_v4();
        self.settings.validate()?;

        let instruments = self
            .source
            .list_instruments(self.settings.timeframe.as_deref())
            .context("标的列表读取失败")?;
        if instruments.is_empty() {
            warn!(
                "[回测] 没有可回测的标的: run_id={}, timeframe={:?}",
                run_id, self.settings.timeframe
            );
        }

        let dispatcher = self.settings.dispatcher();
        info!(
            "[回测] 开始: run_id={}, instruments={}, dispatcher={}, {}",
            run_id,
            instruments.len(),
            dispatcher.name(),
            self.settings.strategy.describe()
        );

        let total = instruments.len();
        let outcomes = dispatcher
            .dispatch(Arc::clone(&self.source), instruments, self.settings.strategy)
            .await;
        if outcomes.len() != total {
            return Err(anyhow!(
                "分发结果数量不一致: expected={}, actual={}",
                total,
                outcomes.len()
            ));
        }

        let (completed, skipped, failed) = count_status(&outcomes);
        let raw: Vec<Trade> = outcomes.into_iter().flat_map(|o| o.trades).collect();
        let raw_trades = raw.len();

        let report = apply_pyramid(raw, &self.settings.pyramid).context("加仓过滤失败")?;
        let summary = BacktestSummary::from_trades(&report.admitted);
        let elapsed_ms = start.elapsed().as_millis();

        info!(
            "[回测] 完成: run_id={}, completed={}, skipped={}, failed={}, raw={}, admitted={}, 耗时={}ms",
            run_id,
            completed,
            skipped,
            failed,
            raw_trades,
            report.admitted.len(),
            elapsed_ms
        );

        Ok(BacktestReport {
            run_id,
            instruments: total,
            completed,
            skipped,
            failed,
            raw_trades,
            rejected: report.rejected,
            trades: report.admitted,
            summary,
            elapsed_ms,
        })
    }
}

fn count_status(outcomes: &[JobOutcome]) -> (usize, usize, usize) {
    outcomes
        .iter()
        .fold((0, 0, 0), |(c, s, f), o| match o.status {
            JobStatus::Completed => (c + 1, s, f),
            JobStatus::Skipped(_) => (c, s + 1, f),
            JobStatus::Failed(_) => (c, s, f + 1),
        })
}
