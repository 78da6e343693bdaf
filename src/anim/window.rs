//! 窗口创建和全屏切换

use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event_loop::EventLoop;
use winit::window::{Fullscreen, Window, WindowBuilder};

use crate::core::config::WindowConfig;
use crate::core::error::Result;

/// 窗口的位置和尺寸（物理像素）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowPlacement {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// 切换后窗口要执行的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenTransition {
    /// 在当前显示器上进入无边框全屏
    Enter,
    /// 按保存的位置回到窗口模式
    Leave(WindowPlacement),
}

/// 记录窗口原位置的全屏切换状态
#[derive(Debug, Default)]
pub struct FullscreenState {
    saved: Option<WindowPlacement>,
}

impl FullscreenState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.saved.is_some()
    }

    /// 切换状态
    ///
    /// # 参数
    ///
    /// * `current` - 进入全屏时保存、之后恢复的位置，退出全屏时忽略
    pub fn toggle(&mut self, current: WindowPlacement) -> FullscreenTransition {
        match self.saved.take() {
            Some(saved) => FullscreenTransition::Leave(saved),
            None => {
                self.saved = Some(current);
                FullscreenTransition::Enter
            }
        }
    }
}

/// 按 `[window]` 配置创建主窗口
pub fn build_window(config: &WindowConfig, event_loop: &EventLoop<()>) -> Result<Window> {
    let window = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(PhysicalSize::new(config.width, config.height))
        .with_resizable(config.resizable)
        .build(event_loop)?;
    Ok(window)
}

fn placement_of(window: &Window) -> WindowPlacement {
    let (x, y) = window
        .outer_position()
        .map(|p| (p.x, p.y))
        .unwrap_or((0, 0));
    let size = window.inner_size();
    WindowPlacement {
        x,
        y,
        width: size.width,
        height: size.height,
    }
}

/// 切换无边框全屏，退出时恢复原位置
pub fn toggle_fullscreen(window: &Window, state: &mut FullscreenState) {
    match state.toggle(placement_of(window)) {
        FullscreenTransition::Enter => {
            tracing::debug!("Entering fullscreen");
            window.set_fullscreen(Some(Fullscreen::Borderless(window.current_monitor())));
        }
        FullscreenTransition::Leave(saved) => {
            tracing::debug!(?saved, "Leaving fullscreen");
            window.set_fullscreen(None);
            window.set_outer_position(PhysicalPosition::new(saved.x, saved.y));
            let _ = window.request_inner_size(PhysicalSize::new(saved.width, saved.height));
        }
    }
}
