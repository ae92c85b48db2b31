//! 目录文件数据源

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use rust_scalp_domain::CandleTable;

use super::{matches_timeframe, CandleSource};
use crate::error::CandleLoadError;
use crate::readers::{read_csv_table, read_parquet_table};

/// 支持的文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TableFormat {
    Parquet,
    Csv,
}

impl TableFormat {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "parquet" => Some(TableFormat::Parquet),
            "csv" => Some(TableFormat::Csv),
            _ => None,
        }
    }
}

/// 数据目录下每个 `SYMBOL_TF.parquet` / `SYMBOL_TF.csv` 文件是一个标的
#[derive(Debug, Clone)]
pub struct FileCandleSource {
    root: PathBuf,
}

impl FileCandleSource {
    /// 数据目录不存在时直接报错（配置错误）
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, CandleLoadError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(CandleLoadError::DataRootMissing(root.display().to_string()));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 扫描目录：标识 -> (格式, 路径)，同名时 parquet 优先
    fn scan(&self) -> Result<BTreeMap<String, (TableFormat, PathBuf)>, CandleLoadError> {
        let mut tables: BTreeMap<String, (TableFormat, PathBuf)> = BTreeMap::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(format) = TableFormat::from_path(&path) else {
                continue;
            };
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let shadowed = tables
                .get(stem)
                .map_or(false, |(existing, _)| *existing <= format);
            if shadowed {
                warn!("重复的K线表，忽略: inst_id={}, path={}", stem, path.display());
                continue;
            }
            tables.insert(stem.to_string(), (format, path.clone()));
        }
        Ok(tables)
    }
}

impl CandleSource for FileCandleSource {
    fn list_instruments(&self, timeframe: Option<&str>) -> Result<Vec<String>, CandleLoadError> {
        let instruments: Vec<String> = self
            .scan()?
            .into_keys()
            .filter(|id| timeframe.map_or(true, |tf| matches_timeframe(id, tf)))
            .collect();
        debug!(
            "发现K线表: root={}, timeframe={:?}, count={}",
            self.root.display(),
            timeframe,
            instruments.len()
        );
        Ok(instruments)
    }

    fn load(&self, instrument_id: &str) -> Result<CandleTable, CandleLoadError> {
        for (format, ext) in [(TableFormat::Parquet, "parquet"), (TableFormat::Csv, "csv")] {
            let path = self.root.join(format!("{}.{}", instrument_id, ext));
            if path.is_file() {
                return match format {
                    TableFormat::Parquet => read_parquet_table(&path, instrument_id),
                    TableFormat::Csv => read_csv_table(&path, instrument_id),
                };
            }
        }
        Err(CandleLoadError::InstrumentNotFound(instrument_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn test_missing_root_is_error() {
        let err = FileCandleSource::new("/definitely/not/here").unwrap_err();
        assert!(matches!(err, CandleLoadError::DataRootMissing(_)));
    }

    #[test]
    fn test_list_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let header = "open_time,open,high,low,close\n";
        write(dir.path(), "ETHUSDT_30s.csv", header);
        write(dir.path(), "BTCUSDT_30s.csv", header);
        write(dir.path(), "BTCUSDT_1m.csv", header);
        write(dir.path(), "notes.txt", "ignored");

        let source = FileCandleSource::new(dir.path()).unwrap();
        assert_eq!(
            source.list_instruments(None).unwrap(),
            vec!["BTCUSDT_1m", "BTCUSDT_30s", "ETHUSDT_30s"]
        );
        assert_eq!(
            source.list_instruments(Some("30s")).unwrap(),
            vec!["BTCUSDT_30s", "ETHUSDT_30s"]
        );
    }

    #[test]
    fn test_load_csv_and_missing_instrument() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "SOLUSDT_5s.csv",
            "open_time,open,high,low,close\n5000,1,2,0.5,1.5\n",
        );
        let source = FileCandleSource::new(dir.path()).unwrap();

        let table = source.load("SOLUSDT_5s").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.instrument_id(), "SOLUSDT_5s");

        assert!(matches!(
            source.load("DOGEUSDT_5s"),
            Err(CandleLoadError::InstrumentNotFound(_))
        ));
    }
}
