//! dx12_anim - 窗口化 Direct3D 12 应用框架
//!
//! 创建窗口，初始化 Direct3D 12 设备、交换链、描述符堆和 Fence，
//! 然后运行逐帧调用用户回调的动画循环。附带一个小型 3D 数学库。
//!
//! # 模块结构
//!
//! - `math`：向量、4x4 矩阵、变换和投影矩阵
//! - `core`：配置、错误、日志、帧计时器、输入状态
//! - `gfx`：适配器选择、描述符布局、Fence 记录以及 Direct3D 12 后端（仅 Windows）
//! - `anim`：事件循环外观和 [`anim::AnimHandler`] trait
//!
//! # 示例
//!
//! ```no_run
//! use dx12_anim::anim::{Anim, AnimContext, AnimHandler};
//! use dx12_anim::core::Config;
//! use dx12_anim::math::Matrf;
//!
//! struct Spin;
//!
//! impl AnimHandler for Spin {
//!     fn idle(&mut self, ctx: &mut AnimContext) {
//!         let angle = (ctx.timer.time() * 45.0) as f32;
//!         if let Some(render) = ctx.render() {
//!             render.set_constants(Matrf::rotate_y(angle));
//!         }
//!     }
//! }
//!
//! Anim::run(Config::default(), Spin)?;
//! # Ok::<(), dx12_anim::core::AnimError>(())
//! ```

pub mod anim;
pub mod core;
pub mod gfx;
pub mod math;
