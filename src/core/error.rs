//! 错误类型
//!
//! 框架共用的错误枚举，手写实现，变体按产生它们的子系统划分。
//!
//! # 结构
//!
//! - [`AnimError`]：大多数可失败调用返回的顶层错误
//! - [`ConfigError`]：加载和校验 `config.toml`
//! - [`GraphicsError`]：设备初始化和每帧 GPU 调用

use std::fmt;

/// 本库统一的 Result 类型
pub type Result<T> = std::result::Result<T, AnimError>;

/// 顶层错误
#[derive(Debug)]
pub enum AnimError {
    /// 配置错误
    Config(ConfigError),

    /// 图形 API 错误
    Graphics(GraphicsError),

    /// 窗口或事件循环创建失败
    Window(String),

    /// IO 错误
    Io(std::io::Error),

    /// 日志初始化失败
    Log(String),
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件不存在
    FileNotFound(String),

    /// 配置文件解析失败
    ParseError(String),

    /// 取值超出范围
    InvalidValue { field: String, reason: String },
}

/// 图形 API 错误
#[derive(Debug)]
pub enum GraphicsError {
    /// 找不到可用的适配器
    NoAdapter(String),

    /// 工厂或设备创建失败
    DeviceCreation(String),

    /// 交换链创建、呈现或缩放失败
    SwapchainError(String),

    /// 堆、缓冲或视图创建失败
    ResourceCreation(String),

    /// 命令录制、提交或 Fence 等待失败
    CommandExecution(String),

    /// 当前平台不支持 Direct3D 12
    Unsupported(String),
}

impl fmt::Display for AnimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimError::Config(e) => write!(f, "Configuration error: {}", e),
            AnimError::Graphics(e) => write!(f, "Graphics error: {}", e),
            AnimError::Window(msg) => write!(f, "Window error: {}", msg),
            AnimError::Io(e) => write!(f, "IO error: {}", e),
            AnimError::Log(msg) => write!(f, "Log error: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsError::NoAdapter(msg) => write!(f, "No usable adapter: {}", msg),
            GraphicsError::DeviceCreation(msg) => write!(f, "Device creation failed: {}", msg),
            GraphicsError::SwapchainError(msg) => write!(f, "Swapchain error: {}", msg),
            GraphicsError::ResourceCreation(msg) => write!(f, "Resource creation failed: {}", msg),
            GraphicsError::CommandExecution(msg) => write!(f, "Command execution failed: {}", msg),
            GraphicsError::Unsupported(msg) => write!(f, "Unsupported platform: {}", msg),
        }
    }
}

impl std::error::Error for AnimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnimError::Config(e) => Some(e),
            AnimError::Graphics(e) => Some(e),
            AnimError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for GraphicsError {}

impl From<std::io::Error> for AnimError {
    fn from(err: std::io::Error) -> Self {
        AnimError::Io(err)
    }
}

impl From<ConfigError> for AnimError {
    fn from(err: ConfigError) -> Self {
        AnimError::Config(err)
    }
}

impl From<GraphicsError> for AnimError {
    fn from(err: GraphicsError) -> Self {
        AnimError::Graphics(err)
    }
}

impl From<winit::error::EventLoopError> for AnimError {
    fn from(err: winit::error::EventLoopError) -> Self {
        AnimError::Window(err.to_string())
    }
}

impl From<winit::error::OsError> for AnimError {
    fn from(err: winit::error::OsError) -> Self {
        AnimError::Window(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_display_includes_context() {
        let err: AnimError = GraphicsError::DeviceCreation("D3D12CreateDevice: E_FAIL".into()).into();
        let text = err.to_string();
        assert!(text.starts_with("Graphics error"));
        assert!(text.contains("D3D12CreateDevice"));
    }

    #[test]
    fn test_invalid_value_display() {
        let err = ConfigError::InvalidValue {
            field: "graphics.buffer_count".into(),
            reason: "must be 2 or 3".into(),
        };
        assert_eq!(err.to_string(), "Invalid value for 'graphics.buffer_count': must be 2 or 3");
    }

    #[test]
    fn test_source_chain() {
        let err: AnimError = ConfigError::ParseError("bad".into()).into();
        assert!(err.source().is_some());
        assert!(AnimError::Window("x".into()).source().is_none());
    }
}
