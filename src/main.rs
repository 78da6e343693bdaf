//! dx12_anim - 窗口化 Direct3D 12 动画框架
//!
//! # 使用方法
//!
//! ```bash
//! # 从工作目录读取 config.toml
//! cargo run
//!
//! # 命令行覆盖配置
//! cargo run -- --width 1280 --height 720 --no-vsync --log-level debug
//! ```
//!
//! # 启动流程
//!
//! 1. 加载 `config.toml`（不存在时使用默认配置）
//! 2. 应用命令行参数
//! 3. 校验
//! 4. 初始化日志
//! 5. 运行动画循环直到窗口关闭

use anyhow::Context;
use dx12_anim::anim::{Anim, AnimContext, AnimHandler};
use dx12_anim::core::{log, Config};
use dx12_anim::{app_debug, app_info};

/// 记录生命周期回调，只绘制清屏颜色
struct LoggingHandler;

impl AnimHandler for LoggingHandler {
    fn init(&mut self, ctx: &mut AnimContext) {
        let (width, height) = ctx.size();
        app_info!(width, height, "Init");
    }

    fn close(&mut self, ctx: &mut AnimContext) {
        app_info!(time = ctx.timer.global_time(), "Close");
    }

    fn resize(&mut self, ctx: &mut AnimContext) {
        let (width, height) = ctx.size();
        app_debug!(width, height, "Resize");
    }

    fn timer(&mut self, ctx: &mut AnimContext) {
        app_debug!(fps = ctx.timer.fps(), "Timer");
    }

    fn activate(&mut self, _ctx: &mut AnimContext, active: bool) {
        app_debug!(active, "Activate");
    }
}

fn main() -> anyhow::Result<()> {
    // 1. 配置（在日志之前）
    let mut config = Config::from_file_or_default("config.toml");

    // 2. 命令行参数
    config.apply_args(std::env::args());

    // 3. 校验
    config.validate().context("Invalid configuration")?;

    // 4. 日志
    let log_file = config
        .logging
        .file_output
        .then_some(config.logging.log_file.as_str());
    log::init_logger(config.logging.level, config.logging.file_output, log_file)
        .context("Failed to initialize logging")?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "dx12_anim starting...");

    tracing::info!(
        width = config.window.width,
        height = config.window.height,
        buffers = config.graphics.buffer_count,
        vsync = config.graphics.vsync,
        feature_level = config.graphics.feature_level.name(),
        "Graphics configuration"
    );

    // 5. 主循环
    if let Err(e) = Anim::run(config, LoggingHandler) {
        tracing::error!("Animation failed: {}", e);
        return Err(e).context("Animation loop failed");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
