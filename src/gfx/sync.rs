//! CPU-GPU 同步记录
//!
//! 设备 Fence 是单调递增的计数器：队列在提交的工作之后写入一个值，
//! CPU 等待 Fence 到达该值。[`FenceTracker`] 维护计数器在 CPU 侧的状态。

/// Fence 值
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct FenceValue(u64);

impl FenceValue {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn increment(&mut self) {
        self.0 += 1;
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

/// 设备 Fence 在 CPU 侧的视图
///
/// 从 0 开始，与 Fence 的初始值一致
#[derive(Debug, Default)]
pub struct FenceTracker {
    /// 最近一次分配的信号值
    current: FenceValue,
    /// 已知 GPU 到达的最大值
    completed: FenceValue,
}

impl FenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 下一个信号值，严格大于之前的所有值
    pub fn signal_value(&mut self) -> FenceValue {
        self.current.increment();
        self.current
    }

    /// 最近一次分配的值
    pub fn current(&self) -> FenceValue {
        self.current
    }

    pub fn completed(&self) -> FenceValue {
        self.completed
    }

    /// 记录从 Fence 读回的完成值，不会回退
    pub fn mark_completed(&mut self, value: FenceValue) {
        self.completed = self.completed.max(value);
    }

    pub fn is_completed(&self, value: FenceValue) -> bool {
        self.completed >= value
    }

    /// GPU 尚未到达的信号值数量
    pub fn pending(&self) -> u64 {
        self.current.value().saturating_sub(self.completed.value())
    }
}
