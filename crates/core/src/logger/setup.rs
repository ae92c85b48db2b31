use std::env;
use std::sync::OnceLock;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::config::env_is_true;

// 全局变量用于保持日志文件句柄
static INFO_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static ERROR_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

// 日志配置结构体
#[derive(Debug, Clone)]
struct LogConfig {
    app_env: String,
    log_level: String,
    log_dir: String,
    log_rotation: String,
    info_file_name: String,
    error_file_name: String,
    enable_console_logging: bool,
}

impl LogConfig {
    fn from_env() -> Self {
        Self {
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "local".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "log_files".to_string()),
            log_rotation: env::var("LOG_ROTATION").unwrap_or_else(|_| "daily".to_string()),
            info_file_name: env::var("LOG_INFO_FILE").unwrap_or_else(|_| "info.log".to_string()),
            error_file_name: env::var("LOG_ERROR_FILE")
                .unwrap_or_else(|_| "error.log".to_string()),
            enable_console_logging: env_is_true("ENABLE_CONSOLE_LOGGING", true),
        }
    }

    fn is_local(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("local")
    }
}

// 解析时间轮转策略
fn parse_rotation(s: &str) -> Rotation {
    match s.to_lowercase().as_str() {
        "minutely" | "minute" | "min" => Rotation::MINUTELY,
        "hourly" | "hour" | "hr" => Rotation::HOURLY,
        "daily" | "day" => Rotation::DAILY,
        _ => Rotation::DAILY,
    }
}

/// 设置日志
///
/// - `APP_ENV=local`（默认）：仅控制台输出
/// - 其他环境：按 `LOG_ROTATION` 滚动写入 `LOG_DIR`，error 级别单独成文件，可选控制台
///
/// 重复调用返回错误（全局订阅者只能设置一次）
pub fn setup_logging() -> anyhow::Result<()> {
    let config = LogConfig::from_env();

    // 本地环境：仅控制台输出
    if config.is_local() {
        let subscriber = Registry::default().with(
            fmt::layer()
                .with_ansi(true)
                .with_target(false)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .with_writer(std::io::stdout)
                .with_filter(EnvFilter::new(&config.log_level)),
        );
        tracing::subscriber::set_global_default(subscriber)?;

        info!(
            "日志初始化完成: env={}, level={}, file_logging=false",
            config.app_env, config.log_level
        );
        return Ok(());
    }

    // 非本地环境：文件输出（可选控制台）
    std::fs::create_dir_all(&config.log_dir).map_err(|e| {
        anyhow::anyhow!("Failed to create log directory '{}': {}", config.log_dir, e)
    })?;

    let info_file = RollingFileAppender::new(
        parse_rotation(&config.log_rotation),
        &config.log_dir,
        &config.info_file_name,
    );
    let error_file = RollingFileAppender::new(
        parse_rotation(&config.log_rotation),
        &config.log_dir,
        &config.error_file_name,
    );

    let (info_non_blocking, info_guard) = tracing_appender::non_blocking(info_file);
    let (error_non_blocking, error_guard) = tracing_appender::non_blocking(error_file);

    // 保存guard到全局，防止被丢弃
    INFO_GUARD
        .set(info_guard)
        .map_err(|_| anyhow::anyhow!("Failed to set INFO_GUARD"))?;
    ERROR_GUARD
        .set(error_guard)
        .map_err(|_| anyhow::anyhow!("Failed to set ERROR_GUARD"))?;

    let console_layer = config.enable_console_logging.then(|| {
        fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_thread_ids(true)
            .with_level(true)
            .with_writer(std::io::stdout)
            .with_filter(EnvFilter::new(&config.log_level))
    });

    let subscriber = Registry::default()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .with_writer(info_non_blocking)
                .with_filter(EnvFilter::new(&config.log_level)),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .with_writer(error_non_blocking)
                .with_filter(EnvFilter::new("error")),
        )
        .with(console_layer);

    tracing::subscriber::set_global_default(subscriber)?;

    info!(
        "日志初始化完成: env={}, level={}, dir={}, console={}",
        config.app_env, config.log_level, config.log_dir, config.enable_console_logging
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rotation() {
        assert_eq!(parse_rotation("hourly"), Rotation::HOURLY);
        assert_eq!(parse_rotation("MIN"), Rotation::MINUTELY);
        assert_eq!(parse_rotation("weekly"), Rotation::DAILY);
    }
}
