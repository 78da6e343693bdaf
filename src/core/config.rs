//! 配置管理
//!
//! 从 TOML 文件加载配置，命令行参数可以覆盖其中的值。
//! 每个字段都有默认值，文件不完整或不存在都可以。
//!
//! # 配置文件格式 (config.toml)
//!
//! ```toml
//! [window]
//! width = 800
//! height = 600
//! title = "DX12 Animation"
//! resizable = true
//!
//! [graphics]
//! buffer_count = 2
//! vsync = true
//! debug_layer = false
//! clear_color = [0.3, 0.5, 0.7, 1.0]
//! feature_level = "12_0"
//! allow_software_adapter = false
//!
//! [anim]
//! timer_interval_ms = 100
//! show_fps_in_title = true
//!
//! [logging]
//! level = "info"      # trace, debug, info, warn, error
//! file_output = false
//! log_file = "dx12_anim.log"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use super::error::{ConfigError, Result};

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 窗口配置
    #[serde(default)]
    pub window: WindowConfig,

    /// 设备和交换链配置
    #[serde(default)]
    pub graphics: GraphicsConfig,

    /// 帧循环配置
    #[serde(default)]
    pub anim: AnimConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 窗口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// 客户区宽度（像素）
    #[serde(default = "default_width")]
    pub width: u32,

    /// 客户区高度（像素）
    #[serde(default = "default_height")]
    pub height: u32,

    /// 窗口标题，FPS 显示追加在其后
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_resizable")]
    pub resizable: bool,
}

/// 设备和交换链配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsConfig {
    /// 后台缓冲数量（2 或 3）
    #[serde(default = "default_buffer_count")]
    pub buffer_count: u32,

    /// 垂直同步（Present 的同步间隔为 1）
    #[serde(default = "default_vsync")]
    pub vsync: bool,

    /// 启用 D3D12 调试层和 DXGI 调试工厂
    #[serde(default)]
    pub debug_layer: bool,

    /// 每帧清除后台缓冲的 RGBA 颜色
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 4],

    /// 创建设备时要求的最低功能级别
    #[serde(default)]
    pub feature_level: FeatureLevel,

    /// 选择适配器时考虑软件适配器（WARP）
    #[serde(default)]
    pub allow_software_adapter: bool,
}

/// Direct3D 功能级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeatureLevel {
    #[serde(rename = "11_0")]
    Level11_0,
    #[default]
    #[serde(rename = "12_0")]
    Level12_0,
    #[serde(rename = "12_1")]
    Level12_1,
}

/// 帧循环配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimConfig {
    /// `timer` 回调和标题刷新的周期
    #[serde(default = "default_timer_interval")]
    pub timer_interval_ms: u64,

    /// 在窗口标题中显示 FPS
    #[serde(default = "default_show_fps")]
    pub show_fps_in_title: bool,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// 同时写入按天滚动的日志文件
    #[serde(default = "default_file_output")]
    pub file_output: bool,

    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }
fn default_title() -> String { "DX12 Animation".to_string() }
fn default_resizable() -> bool { true }
fn default_buffer_count() -> u32 { 2 }
fn default_vsync() -> bool { true }
fn default_clear_color() -> [f32; 4] { [0.3, 0.5, 0.7, 1.0] }
fn default_timer_interval() -> u64 { 100 }
fn default_show_fps() -> bool { true }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_file_output() -> bool { false }
fn default_log_file() -> String { "dx12_anim.log".to_string() }

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
            resizable: default_resizable(),
        }
    }
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            buffer_count: default_buffer_count(),
            vsync: default_vsync(),
            debug_layer: false,
            clear_color: default_clear_color(),
            feature_level: FeatureLevel::default(),
            allow_software_adapter: false,
        }
    }
}

impl Default for AnimConfig {
    fn default() -> Self {
        Self {
            timer_interval_ms: default_timer_interval(),
            show_fps_in_title: default_show_fps(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: default_file_output(),
            log_file: default_log_file(),
        }
    }
}

impl Config {
    /// 从文件加载配置
    ///
    /// ```no_run
    /// use dx12_anim::core::Config;
    ///
    /// let config = Config::from_file("config.toml")?;
    /// # Ok::<(), dx12_anim::core::AnimError>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path_str.clone()))?;

        Self::from_toml_str(&contents)
    }

    /// 解析配置文本
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// 从文件加载配置，文件不存在或无法解析时使用默认配置
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path).unwrap_or_default()
    }

    /// 以 TOML 格式保存配置
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 应用命令行参数覆盖配置
    ///
    /// 支持的参数：
    /// - `--width <value>` / `--height <value>`：窗口尺寸
    /// - `--debug-layer`：启用 D3D12 调试层
    /// - `--no-vsync`：关闭垂直同步
    /// - `--warp`：允许软件适配器
    /// - `--log-level <level>`：trace / debug / info / warn / error
    ///
    /// 无法解析的值会被忽略，保留原配置
    pub fn apply_args<I>(&mut self, args: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

        let value_of = |flag: &str| -> Option<&String> {
            args.iter()
                .position(|a| a == flag)
                .and_then(|idx| args.get(idx + 1))
        };

        if let Some(width) = value_of("--width").and_then(|v| v.parse::<u32>().ok()) {
            self.window.width = width;
        }

        if let Some(height) = value_of("--height").and_then(|v| v.parse::<u32>().ok()) {
            self.window.height = height;
        }

        if let Some(level) = value_of("--log-level").and_then(|v| v.parse::<LogLevel>().ok()) {
            self.logging.level = level;
        }

        if args.iter().any(|a| a == "--debug-layer") {
            self.graphics.debug_layer = true;
        }

        if args.iter().any(|a| a == "--no-vsync") {
            self.graphics.vsync = false;
        }

        if args.iter().any(|a| a == "--warp") {
            self.graphics.allow_software_adapter = true;
        }
    }

    /// 校验配置取值范围
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "window.width/height".to_string(),
                reason: "Window dimensions must be greater than 0".to_string(),
            }.into());
        }

        if !(2..=3).contains(&self.graphics.buffer_count) {
            return Err(ConfigError::InvalidValue {
                field: "graphics.buffer_count".to_string(),
                reason: "Swap chain buffer count must be 2 or 3".to_string(),
            }.into());
        }

        if self.graphics.clear_color.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(ConfigError::InvalidValue {
                field: "graphics.clear_color".to_string(),
                reason: "Color components must be in [0, 1]".to_string(),
            }.into());
        }

        if self.anim.timer_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "anim.timer_interval_ms".to_string(),
                reason: "Timer interval must be greater than 0".to_string(),
            }.into());
        }

        Ok(())
    }
}

impl FeatureLevel {
    /// 可读名称，如 `"12_0"`
    pub fn name(&self) -> &'static str {
        match self {
            FeatureLevel::Level11_0 => "11_0",
            FeatureLevel::Level12_0 => "12_0",
            FeatureLevel::Level12_1 => "12_1",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("unknown level '{}'", other),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.graphics.buffer_count, 2);
        assert_eq!(config.graphics.feature_level, FeatureLevel::Level12_0);
        assert_eq!(config.anim.timer_interval_ms, 100);
        assert!(config.anim.show_fps_in_title);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            [window]
            width = 1280

            [graphics]
            feature_level = "11_0"
            "#,
        )
        .unwrap();

        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.graphics.feature_level, FeatureLevel::Level11_0);
        assert!(config.graphics.vsync);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_parse_error() {
        let result = Config::from_toml_str("[graphics]\nfeature_level = \"9_1\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = Config::from_file_or_default("definitely/not/here.toml");
        assert_eq!(config.window.title, "DX12 Animation");
        assert!(Config::from_file("definitely/not/here.toml").is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let path = std::env::temp_dir().join(format!("dx12_anim_config_{}.toml", std::process::id()));
        let mut config = Config::default();
        config.window.title = "Saved".to_string();
        config.graphics.buffer_count = 3;

        config.save_to_file(&path).unwrap();
        let reloaded = Config::from_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(reloaded.window.title, "Saved");
        assert_eq!(reloaded.graphics.buffer_count, 3);
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        config.apply_args([
            "dx12_anim", "--width", "1024", "--height", "bogus",
            "--no-vsync", "--warp", "--debug-layer", "--log-level", "debug",
        ]);

        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 600);
        assert!(!config.graphics.vsync);
        assert!(config.graphics.allow_software_adapter);
        assert!(config.graphics.debug_layer);
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.window.width = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.graphics.buffer_count = 4;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.graphics.clear_color[1] = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.anim.timer_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }
}
