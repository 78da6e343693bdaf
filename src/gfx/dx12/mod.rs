//! Direct3D 12 后端
//!
//! - `adapter`：DXGI 适配器枚举、选择和输出信息日志
//! - `descriptor`：描述符堆封装
//! - `context`：[`Dx12Core`] 的创建（设备、队列、交换链、描述符堆、Fence）
//! - `frame`：等待 GPU、每帧清屏与呈现、常量上传、缩放

pub mod adapter;
pub mod context;
pub mod descriptor;
mod frame;

pub use context::Dx12Core;
pub use descriptor::Dx12DescriptorHeap;

use crate::core::error::{GraphicsError, Result};

/// 给 `windows` 错误附上失败的调用名，并转换为本库的错误类型
pub(crate) trait HrContext<T> {
    fn hr_context(self, kind: fn(String) -> GraphicsError, call: &str) -> Result<T>;
}

impl<T> HrContext<T> for windows::core::Result<T> {
    fn hr_context(self, kind: fn(String) -> GraphicsError, call: &str) -> Result<T> {
        self.map_err(|e| kind(format!("{} failed: {}", call, e)).into())
    }
}
