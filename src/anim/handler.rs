//! 应用回调

use super::AnimContext;

/// 应用接入 [`Anim`](super::Anim) 的回调集合
///
/// 每个方法都有空的默认实现，只需覆盖用到的部分。
pub trait AnimHandler {
    /// 窗口创建后第一次循环迭代时调用一次
    fn init(&mut self, _ctx: &mut AnimContext) {}

    /// 关闭前调用，仅当 `init` 已执行
    fn close(&mut self, _ctx: &mut AnimContext) {}

    /// 客户区尺寸变化，`init` 之后也会立即调用一次
    fn resize(&mut self, _ctx: &mut AnimContext) {}

    /// 周期回调，间隔为 `anim.timer_interval_ms`
    fn timer(&mut self, _ctx: &mut AnimContext) {}

    /// 窗口获得或失去焦点
    ///
    /// # 参数
    ///
    /// * `ctx` - 动画上下文
    /// * `active` - 是否获得焦点
    fn activate(&mut self, _ctx: &mut AnimContext, _active: bool) {}

    /// 每帧更新，在提交 GPU 帧之前
    fn idle(&mut self, _ctx: &mut AnimContext) {}

    /// 擦除背景，每次重绘时在 `paint` 之前调用
    fn erase(&mut self, _ctx: &mut AnimContext) {}

    /// 窗口系统请求重绘
    fn paint(&mut self, _ctx: &mut AnimContext) {}
}

/// 什么都不做的回调
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHandler;

impl AnimHandler for NoopHandler {}
