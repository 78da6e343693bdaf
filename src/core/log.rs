//! 日志系统
//!
//! 基于 `tracing` 的结构化日志。总是输出到控制台，可选再输出到按天滚动的文件。
//!
//! # 使用示例
//!
//! ```no_run
//! use dx12_anim::core::{config::LogLevel, log};
//!
//! log::init_logger(LogLevel::Info, false, None)?;
//!
//! tracing::info!(width = 800, height = 600, "Window created");
//! dx12_anim::engine_info!("Device ready");
//! # Ok::<(), dx12_anim::core::AnimError>(())
//! ```
//!
//! `engine_*` 宏使用 `dx12_anim::engine` 目标（窗口、设备、帧循环），
//! `app_*` 宏使用 `dx12_anim::app` 目标（用户回调），可以用 `RUST_LOG` 分别过滤。

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use super::config::LogLevel;
use super::error::{AnimError, Result};

/// 开启文件输出但未指定路径时使用的文件名
const DEFAULT_LOG_FILE: &str = "dx12_anim.log";

/// 初始化全局日志订阅器
///
/// 设置了 `RUST_LOG` 时它优先于 `level`。
///
/// # 参数
///
/// * `level` - 日志级别
/// * `file_output` - 是否同时输出到文件
/// * `log_file_path` - 日志文件路径，`None` 时使用默认文件名
///
/// # 返回值
///
/// 已经安装过订阅器时返回 `AnimError::Log`
///
/// ```no_run
/// use dx12_anim::core::{config::LogLevel, log};
///
/// // 仅控制台
/// log::init_logger(LogLevel::Info, false, None)?;
///
/// // 控制台 + logs/app.log（按天滚动）
/// log::init_logger(LogLevel::Debug, true, Some("logs/app.log"))?;
/// # Ok::<(), dx12_anim::core::AnimError>(())
/// ```
pub fn init_logger(level: LogLevel, file_output: bool, log_file_path: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(level)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true);

    let file_layer = if file_output {
        let (directory, filename) = split_log_path(log_file_path.unwrap_or(DEFAULT_LOG_FILE));
        let file_appender = RollingFileAppender::new(Rotation::DAILY, directory, filename);

        Some(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_ansi(false)
                .with_writer(file_appender),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| AnimError::Log(e.to_string()))
}

/// 配置级别对应的 `EnvFilter` 指令
fn filter_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}

/// 把日志路径拆成 appender 需要的目录和文件名
fn split_log_path(log_path: &str) -> (&Path, &str) {
    let path = Path::new(log_path);
    let directory = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(DEFAULT_LOG_FILE);
    (directory, filename)
}

/// 引擎日志 - Info 级别
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "dx12_anim::engine", $($arg)*)
    };
}

/// 引擎日志 - Debug 级别
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "dx12_anim::engine", $($arg)*)
    };
}

/// 引擎日志 - Warn 级别
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "dx12_anim::engine", $($arg)*)
    };
}

/// 引擎日志 - Error 级别
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {
        tracing::error!(target: "dx12_anim::engine", $($arg)*)
    };
}

/// 应用日志 - Info 级别
#[macro_export]
macro_rules! app_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "dx12_anim::app", $($arg)*)
    };
}

/// 应用日志 - Debug 级别
#[macro_export]
macro_rules! app_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "dx12_anim::app", $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        assert_eq!(filter_directive(LogLevel::Trace), "trace");
        assert_eq!(filter_directive(LogLevel::Info), "info");
        assert_eq!(filter_directive(LogLevel::Error), "error");
    }

    #[test]
    fn test_split_log_path() {
        let (dir, name) = split_log_path("logs/app.log");
        assert_eq!(dir, Path::new("logs"));
        assert_eq!(name, "app.log");

        let (dir, name) = split_log_path("plain.log");
        assert_eq!(dir, Path::new("."));
        assert_eq!(name, "plain.log");
    }
}
