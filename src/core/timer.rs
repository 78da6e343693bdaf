//! 帧计时器
//!
//! 记录全局时间、可暂停的动画时间和 FPS 估计。
//! 每帧调用一次 [`FrameTimer::response`]。

use std::time::{Duration, Instant};

/// 第一个一秒采样完成前报告的 FPS
const INITIAL_FPS: f64 = 30.0;

/// FPS 采样窗口长度
const FPS_WINDOW: Duration = Duration::from_secs(1);

/// 每帧计时器
#[derive(Debug, Clone)]
pub struct FrameTimer {
    start_time: Instant,
    old_time: Instant,
    old_time_fps: Instant,
    pause_time: Duration,
    frame_counter: u64,

    global_time: f64,
    global_delta_time: f64,
    time: f64,
    delta_time: f64,
    fps: f64,
    is_pause: bool,
}

impl FrameTimer {
    /// 以当前时间启动计时器
    pub fn new() -> Self {
        Self::started_at(Instant::now())
    }

    /// 以指定时刻启动计时器
    pub fn started_at(start: Instant) -> Self {
        Self {
            start_time: start,
            old_time: start,
            old_time_fps: start,
            pause_time: Duration::ZERO,
            frame_counter: 0,
            global_time: 0.0,
            global_delta_time: 0.0,
            time: 0.0,
            delta_time: 0.0,
            fps: INITIAL_FPS,
            is_pause: false,
        }
    }

    /// 用当前时间做每帧更新
    pub fn response(&mut self) {
        self.response_at(Instant::now());
    }

    /// 以 `now` 做每帧更新
    ///
    /// 全局值总是前进。暂停期间增量为 0，
    /// 暂停时长被累计，使 [`time`](Self::time) 保持不变
    pub fn response_at(&mut self, now: Instant) {
        let frame = now.saturating_duration_since(self.old_time);

        self.global_time = now.saturating_duration_since(self.start_time).as_secs_f64();
        self.global_delta_time = frame.as_secs_f64();

        if self.is_pause {
            self.delta_time = 0.0;
            self.pause_time += frame;
        } else {
            self.delta_time = self.global_delta_time;
            self.time = now
                .saturating_duration_since(self.start_time)
                .saturating_sub(self.pause_time)
                .as_secs_f64();
        }

        self.frame_counter += 1;
        let since_fps = now.saturating_duration_since(self.old_time_fps);
        if since_fps > FPS_WINDOW {
            self.fps = self.frame_counter as f64 / since_fps.as_secs_f64();
            self.old_time_fps = now;
            self.frame_counter = 0;
        }

        self.old_time = now;
    }

    pub fn set_pause(&mut self, pause: bool) {
        self.is_pause = pause;
    }

    pub fn toggle_pause(&mut self) {
        self.is_pause = !self.is_pause;
    }

    /// 启动以来的秒数
    pub fn global_time(&self) -> f64 {
        self.global_time
    }

    /// 最近两次更新之间的秒数
    pub fn global_delta_time(&self) -> f64 {
        self.global_delta_time
    }

    /// 启动以来的秒数，不含暂停时长
    pub fn time(&self) -> f64 {
        self.time
    }

    /// 帧间隔，暂停时为 0
    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn is_pause(&self) -> bool {
        self.is_pause
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_initial_state() {
        let timer = FrameTimer::new();
        assert_eq!(timer.fps(), 30.0);
        assert_eq!(timer.time(), 0.0);
        assert!(!timer.is_pause());
    }

    #[test]
    fn test_advances_time() {
        let start = Instant::now();
        let mut timer = FrameTimer::started_at(start);

        timer.response_at(start + ms(100));
        assert!((timer.global_time() - 0.1).abs() < 1e-9);
        assert!((timer.delta_time() - 0.1).abs() < 1e-9);
        assert!((timer.time() - 0.1).abs() < 1e-9);

        timer.response_at(start + ms(250));
        assert!((timer.global_delta_time() - 0.15).abs() < 1e-9);
        assert!((timer.time() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_pause_freezes_time() {
        let start = Instant::now();
        let mut timer = FrameTimer::started_at(start);

        timer.response_at(start + ms(100));
        timer.set_pause(true);
        timer.response_at(start + ms(300));
        timer.response_at(start + ms(500));

        assert_eq!(timer.delta_time(), 0.0);
        assert!((timer.time() - 0.1).abs() < 1e-9);
        assert!((timer.global_time() - 0.5).abs() < 1e-9);

        // 从停止处继续
        timer.toggle_pause();
        timer.response_at(start + ms(600));
        assert!((timer.time() - 0.2).abs() < 1e-9);
        assert!((timer.delta_time() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_fps_sampled_after_one_second() {
        let start = Instant::now();
        let mut timer = FrameTimer::started_at(start);

        // 10 帧间隔 100 ms：恰好一秒还不够
        for i in 1..=10 {
            timer.response_at(start + ms(100 * i));
        }
        assert_eq!(timer.fps(), 30.0);

        // 第 11 帧越过窗口：1.1 秒 11 帧
        timer.response_at(start + ms(1100));
        assert!((timer.fps() - 10.0).abs() < 1e-9);
    }
}
