use std::env;
use std::str::FromStr;

/// 默认K线数据目录（相对工作目录）
pub const DEFAULT_DATA_ROOT: &str = "data/processed";

/// 未能探测CPU核数时的并发度
const FALLBACK_WORKERS: usize = 8;

/// 读取布尔型环境变量：支持 true/false/1/0（大小写不敏感）
pub fn env_is_true(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => {
            let v = v.trim();
            v.eq_ignore_ascii_case("true") || v == "1"
        }
        Err(_) => default,
    }
}

/// 读取字符串环境变量，若不存在则返回默认值
pub fn env_or_default(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(v) => v,
        Err(_) => default.to_string(),
    }
}

/// 读取可解析的环境变量，不存在或解析失败返回默认值
pub fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(v) => v.trim().parse::<T>().ok().unwrap_or(default),
        Err(_) => default,
    }
}

/// K线数据根目录
///
/// 优先级：
/// 1) DATA_ROOT 环境变量
/// 2) 代码默认值 `data/processed`
pub fn data_root() -> String {
    env_or_default("DATA_ROOT", DEFAULT_DATA_ROOT)
}

/// 回测并发度
///
/// 优先级：
/// 1) BACKTEST_WORKERS 环境变量（必须 > 0）
/// 2) 可用CPU核数
/// 3) 固定回退值 8
pub fn default_workers() -> usize {
    let from_env = env_parse::<usize>("BACKTEST_WORKERS", 0);
    if from_env > 0 {
        return from_env;
    }
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(FALLBACK_WORKERS)
}
