//! 核心模块
//!
//! 窗口循环和渲染器共用的平台无关组件
//!
//! # 模块
//!
//! - `config`：从 `config.toml` 加载的配置及命令行覆盖
//! - `error`：错误类型
//! - `log`：`tracing` 订阅器初始化和日志宏
//! - `timer`：支持暂停和 FPS 统计的帧计时器
//! - `input`：每帧的键盘和鼠标状态

pub mod config;
pub mod error;
pub mod input;
pub mod log;
pub mod timer;

pub use config::Config;
pub use error::{AnimError, ConfigError, GraphicsError, Result};
pub use input::InputState;
pub use timer::FrameTimer;
