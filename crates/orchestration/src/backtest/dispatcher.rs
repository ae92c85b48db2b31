//! 多标的分发
//!
//! 任务队列进、结果通道出：每个标的独立加载与模拟，worker 之间不共享可变状态。
//! 分发器只保证全部任务都有结果（成功或空结果）后才返回，不保证结果顺序。

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::{mpsc, Semaphore};
use tracing::{error, info};

use rust_scalp_market::CandleSource;
use rust_scalp_strategies::StrategyConfig;

use super::job::{run_instrument, JobOutcome};

/// 分发器
#[async_trait]
pub trait Dispatcher: Send + Sync {
    fn name(&self) -> &'static str;

    /// 对全部标的运行回测，返回按标的标识排序的结果
    async fn dispatch(
        &self,
        source: Arc<dyn CandleSource>,
        instruments: Vec<String>,
        config: StrategyConfig,
    ) -> Vec<JobOutcome>;
}

/// 在阻塞线程池中运行单个标的，worker panic 转换为失败结果
async fn run_isolated(
    source: Arc<dyn CandleSource>,
    instrument_id: String,
    config: StrategyConfig,
) -> JobOutcome {
    let blocking_id = instrument_id.clone();
    tokio::task::spawn_blocking(move || run_instrument(source.as_ref(), &blocking_id, &config))
        .await
        .unwrap_or_else(|e| {
            error!(
                "[回测调度] worker 异常退出: inst_id={}, err={}",
                instrument_id, e
            );
            // JoinError 的描述带任务编号，结果中只保留稳定的原因
            let reason = if e.is_panic() { "worker panic" } else { "worker cancelled" };
            JobOutcome::failed(instrument_id, reason.to_string())
        })
}

/// 串行分发，逐个标的运行，用于调试与校验并行结果
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialDispatcher;

#[async_trait]
impl Dispatcher for SerialDispatcher {
    fn name(&self) -> &'static str {
        "serial"
    }

    async fn dispatch(
        &self,
        source: Arc<dyn CandleSource>,
        instruments: Vec<String>,
        config: StrategyConfig,
    ) -> Vec<JobOutcome> {
        let start = Instant::now();
        let mut outcomes = Vec::with_capacity(instruments.len());
        for instrument_id in instruments {
            outcomes.push(run_isolated(Arc::clone(&source), instrument_id, config).await);
        }
        outcomes.sort_by(|a, b| a.instrument_id.cmp(&b.instrument_id));
        info!(
            "[回测调度] 串行完成: instruments={}, 耗时={}ms",
            outcomes.len(),
            start.elapsed().as_millis()
        );
        outcomes
    }
}

/// 并行分发：信号量限制同时运行的 worker 数，模拟在阻塞线程池中执行
#[derive(Debug, Clone, Copy)]
pub struct ParallelDispatcher {
    workers: usize,
}

impl ParallelDispatcher {
    /// worker 数至少为 1
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

#[async_trait]
impl Dispatcher for ParallelDispatcher {
    fn name(&self) -> &'static str {
        "parallel"
    }

    async fn dispatch(
        &self,
        source: Arc<dyn CandleSource>,
        instruments: Vec<String>,
        config: StrategyConfig,
    ) -> Vec<JobOutcome> {
        let start = Instant::now();
        let total = instruments.len();
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let (tx, mut rx) = mpsc::unbounded_channel::<JobOutcome>();

        let mut tasks = Vec::with_capacity(total);
        for instrument_id in instruments {
            let permit = Arc::clone(&semaphore);
            let source = Arc::clone(&source);
            let tx = tx.clone();
            let task_id = instrument_id.clone();

            let handle = tokio::spawn(async move {
                let _permit = match permit.acquire_owned().await {
                    Ok(p) => p,
                    Err(e) => {
                        let _ = tx.send(JobOutcome::failed(task_id, e.to_string()));
                        return;
                    }
                };
                let outcome = run_isolated(source, task_id, config).await;
                // 接收端在全部任务结束前不会关闭
                let _ = tx.send(outcome);
            });
            tasks.push((instrument_id, handle));
        }
        drop(tx);

        let mut outcomes = Vec::with_capacity(total);
        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
        }

        // 屏障：确认所有任务都已退出，异常退出且未上报的标的补空结果
        let (ids, handles): (Vec<String>, Vec<_>) = tasks.into_iter().unzip();
        for (instrument_id, joined) in ids.into_iter().zip(join_all(handles).await) {
            if let Err(e) = joined {
                if !outcomes.iter().any(|o| o.instrument_id == instrument_id) {
                    error!(
                        "[回测调度] 任务异常退出: inst_id={}, err={}",
                        instrument_id, e
                    );
                    outcomes.push(JobOutcome::failed(instrument_id, e.to_string()));
                }
            }
        }

        outcomes.sort_by(|a, b| a.instrument_id.cmp(&b.instrument_id));
        info!(
            "[回测调度] 并行完成: instruments={}, workers={}, 耗时={}ms",
            outcomes.len(),
            self.workers,
            start.elapsed().as_millis()
        );
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_scalp_domain::{Candle, CandleTable};
    use rust_scalp_market::{CandleLoadError, MemoryCandleSource};
    use rust_scalp_strategies::TrendFilter;

    use crate::backtest::job::JobStatus;

    fn pump_table(id: &str, offset: i64) -> CandleTable {
        let mut candles = Vec::new();
        for i in 0..30 {
            let ts = (offset + i) * 60_000;
            let candle = match i % 5 {
                0 => Candle::new(ts, 100.0, 103.0, 100.0, 103.0),
                1 => Candle::new(ts, 103.0, 103.0, 98.0, 99.0),
                _ => Candle::new(ts, 100.0, 100.4, 99.8, 100.1),
            };
            candles.push(candle);
        }
        CandleTable::new(id, candles).unwrap()
    }

    /// 指定标的加载失败的数据源
    struct Flaky {
        inner: MemoryCandleSource,
        broken: &'static str,
    }

    impl CandleSource for Flaky {
        fn list_instruments(
            &self,
            timeframe: Option<&str>,
        ) -> Result<Vec<String>, CandleLoadError> {
            let mut ids = self.inner.list_instruments(timeframe)?;
            ids.push(self.broken.to_string());
            ids.sort();
            Ok(ids)
        }

        fn load(&self, instrument_id: &str) -> Result<CandleTable, CandleLoadError> {
            if instrument_id == self.broken {
                return Err(CandleLoadError::MissingColumn("close"));
            }
            self.inner.load(instrument_id)
        }
    }

    /// 指定标的加载时 panic 的数据源
    struct Panicky {
        inner: MemoryCandleSource,
    }

    impl CandleSource for Panicky {
        fn list_instruments(
            &self,
            timeframe: Option<&str>,
        ) -> Result<Vec<String>, CandleLoadError> {
            let mut ids = self.inner.list_instruments(timeframe)?;
            ids.push("PANIC_1m".to_string());
            ids.sort();
            Ok(ids)
        }

        fn load(&self, instrument_id: &str) -> Result<CandleTable, CandleLoadError> {
            if instrument_id == "PANIC_1m" {
                panic!("corrupted table: {}", instrument_id);
            }
            self.inner.load(instrument_id)
        }
    }

    fn source() -> Arc<dyn CandleSource> {
        let inner: MemoryCandleSource = (0..6)
            .map(|i| pump_table(&format!("SYM{}_1m", i), i))
            .chain(std::iter::once(CandleTable::empty("EMPTY_1m")))
            .collect();
        Arc::new(Flaky {
            inner,
            broken: "BROKEN_1m",
        })
    }

    fn config() -> StrategyConfig {
        StrategyConfig {
            trend: TrendFilter::Off,
            ..StrategyConfig::default()
        }
    }

    #[tokio::test]
    async fn test_parallel_matches_serial() {
        let source = source();
        let ids = source.list_instruments(None).unwrap();

        let serial = SerialDispatcher
            .dispatch(Arc::clone(&source), ids.clone(), config())
            .await;
        let parallel = ParallelDispatcher::new(3)
            .dispatch(Arc::clone(&source), ids.clone(), config())
            .await;

        assert_eq!(serial.len(), ids.len());
        assert_eq!(serial, parallel);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_failures_are_isolated() {
        let source = source();
        let ids = source.list_instruments(None).unwrap();
        let outcomes = ParallelDispatcher::new(2)
            .dispatch(source, ids, config())
            .await;

        let broken = outcomes
            .iter()
            .find(|o| o.instrument_id == "BROKEN_1m")
            .unwrap();
        assert!(matches!(broken.status, JobStatus::Skipped(_)));
        assert!(broken.trades.is_empty());

        let empty = outcomes
            .iter()
            .find(|o| o.instrument_id == "EMPTY_1m")
            .unwrap();
        assert!(empty.is_completed() && empty.trades.is_empty());

        let traded: usize = outcomes.iter().map(|o| o.trades.len()).sum();
        assert_eq!(traded, 6 * 6);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_worker_panic_isolated_in_both_modes() {
        let inner: MemoryCandleSource = (0..3)
            .map(|i| pump_table(&format!("SYM{}_1m", i), i))
            .collect();
        let source: Arc<dyn CandleSource> = Arc::new(Panicky { inner });
        let ids = source.list_instruments(None).unwrap();

        let serial = SerialDispatcher
            .dispatch(Arc::clone(&source), ids.clone(), config())
            .await;
        let parallel = ParallelDispatcher::new(2)
            .dispatch(Arc::clone(&source), ids.clone(), config())
            .await;
        assert_eq!(serial, parallel);
        assert_eq!(serial.len(), 4);

        let panicked = serial
            .iter()
            .find(|o| o.instrument_id == "PANIC_1m")
            .unwrap();
        assert_eq!(panicked.status, JobStatus::Failed("worker panic".to_string()));
        assert!(panicked.trades.is_empty());

        let completed = serial.iter().filter(|o| o.is_completed()).count();
        assert_eq!(completed, 3);
        let traded: usize = serial.iter().map(|o| o.trades.len()).sum();
        assert_eq!(traded, 3 * 6);
    }

    #[test]
    fn test_workers_at_least_one() {
        assert_eq!(ParallelDispatcher::new(0).workers(), 1);
    }
}
