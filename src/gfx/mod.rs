//! 图形层
//!
//! - `adapter` / `descriptor` / `sync`：与设备代码共享的数据和策略，可在任意平台测试
//! - `dx12`：Direct3D 12 设备初始化和每帧操作（仅 Windows）

pub mod adapter;
pub mod descriptor;
pub mod sync;
#[cfg(target_os = "windows")]
pub mod dx12;

pub use adapter::{select_best_adapter, AdapterInfo, DisplayMode};
pub use descriptor::{HeapKind, HeapLayout, HeapSpec};
pub use sync::{FenceTracker, FenceValue};
#[cfg(target_os = "windows")]
pub use dx12::Dx12Core;
