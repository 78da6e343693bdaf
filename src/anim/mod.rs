//! 动画循环
//!
//! [`Anim`] 持有窗口、帧计时器、输入状态和渲染器，把 winit 事件转换为
//! [`AnimHandler`] 回调：
//!
//! ```text
//! 第一次 AboutToWait -> init, resize
//! Resized            -> 交换链缩放, resize
//! Focused            -> activate
//! RedrawRequested    -> erase, paint
//! AboutToWait        -> 计时器/输入更新, idle, GPU 帧
//!   每个周期         -> timer, 标题显示 FPS
//! CloseRequested/Esc -> close, 等待 GPU, 退出
//! ```
//!
//! `F` 切换无边框全屏。

mod driver;
mod handler;
mod render;
mod window;

pub use handler::{AnimHandler, NoopHandler};
pub use render::Render;
pub use window::{build_window, toggle_fullscreen, FullscreenState, FullscreenTransition, WindowPlacement};

use std::time::Instant;

use winit::event::{Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::keyboard::PhysicalKey;
use winit::window::Window;

use crate::core::config::Config;
use crate::core::error::{AnimError, GraphicsError, Result};
use crate::core::input::InputState;
use crate::core::timer::FrameTimer;
use crate::{engine_info, engine_warn};
use driver::{LoopAction, LoopDriver, LoopEvent};

/// 传给每个 [`AnimHandler`] 回调的状态
pub struct AnimContext {
    pub timer: FrameTimer,
    pub input: InputState,
    width: u32,
    height: u32,
    active: bool,
    render: Option<Render>,
    exit_requested: bool,
    failure: Option<AnimError>,
}

impl AnimContext {
    fn new(width: u32, height: u32, render: Option<Render>) -> Self {
        Self {
            timer: FrameTimer::new(),
            input: InputState::new(),
            width,
            height,
            active: true,
            render,
            exit_requested: false,
            failure: None,
        }
    }

    /// 客户区尺寸（物理像素）
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// 窗口是否拥有焦点
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// 渲染器，当前平台无法创建 GPU 设备时为 `None`
    pub fn render(&mut self) -> Option<&mut Render> {
        self.render.as_mut()
    }

    /// 当前回调结束后关闭循环
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// 以错误结束循环，[`Anim::run`] 返回第一个记录的错误
    pub fn fail(&mut self, err: AnimError) {
        if self.failure.is_none() {
            self.failure = Some(err);
        }
        self.exit_requested = true;
    }
}

/// 追加帧率后的窗口标题
pub fn fps_title(title: &str, fps: f64) -> String {
    format!("{} FPS: {:.2}", title, fps)
}

/// 事件循环驱动的窗口和动画状态
pub struct Anim<H: AnimHandler> {
    // 先于 `window` 释放：交换链引用它的 HWND
    driver: LoopDriver<H>,
    window: Window,
    fullscreen: FullscreenState,
}

/// 提取循环关心的窗口事件
fn loop_event(event: WindowEvent) -> Option<LoopEvent> {
    let event = match event {
        WindowEvent::CloseRequested => LoopEvent::CloseRequested,
        WindowEvent::Resized(size) => LoopEvent::Resized {
            width: size.width,
            height: size.height,
        },
        WindowEvent::Focused(focused) => LoopEvent::Focused(focused),
        WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(key),
                    state,
                    repeat,
                    ..
                },
            ..
        } => LoopEvent::Key { key, state, repeat },
        WindowEvent::CursorMoved { position, .. } => LoopEvent::CursorMoved(position.x, position.y),
        WindowEvent::MouseWheel { delta, .. } => LoopEvent::Wheel(delta),
        WindowEvent::MouseInput { state, button, .. } => LoopEvent::MouseButton { button, state },
        WindowEvent::RedrawRequested => LoopEvent::Redraw,
        _ => return None,
    };
    Some(event)
}

impl<H: AnimHandler> Anim<H> {
    /// 创建窗口和渲染器，运行事件循环直到窗口关闭
    ///
    /// # 参数
    ///
    /// * `config` - 应用配置
    /// * `handler` - 应用回调
    ///
    /// # 返回值
    ///
    /// 循环中第一个帧错误或回调通过 [`AnimContext::fail`] 记录的错误
    pub fn run(config: Config, handler: H) -> Result<()> {
        let event_loop = EventLoop::new()?;
        let window = build_window(&config.window, &event_loop)?;
        engine_info!(
            width = config.window.width,
            height = config.window.height,
            title = %config.window.title,
            "Window created"
        );

        let render = match Render::new(&window, &config.graphics) {
            Ok(render) => Some(render),
            Err(AnimError::Graphics(GraphicsError::Unsupported(reason))) => {
                engine_warn!(%reason, "Running without a GPU device");
                None
            }
            Err(e) => return Err(e),
        };

        let size = window.inner_size();
        let ctx = AnimContext::new(size.width, size.height, render);
        let mut anim = Anim {
            driver: LoopDriver::new(ctx, handler, config.window.title.clone(), &config.anim, Instant::now()),
            window,
            fullscreen: FullscreenState::new(),
        };

        engine_info!("Entering main loop...");
        event_loop.run(|event, elwt| anim.handle_event(event, elwt))?;

        anim.driver.into_result()
    }

    fn handle_event(&mut self, event: Event<()>, elwt: &EventLoopWindowTarget<()>) {
        elwt.set_control_flow(ControlFlow::Poll);

        let event = match event {
            Event::WindowEvent { event, window_id } if window_id == self.window.id() => loop_event(event),
            Event::AboutToWait => Some(LoopEvent::Frame(Instant::now())),
            _ => None,
        };

        let Some(event) = event else {
            return;
        };

        for action in self.driver.handle(event) {
            match action {
                LoopAction::ToggleFullscreen => toggle_fullscreen(&self.window, &mut self.fullscreen),
                LoopAction::SetTitle(title) => self.window.set_title(&title),
                LoopAction::Exit => elwt.exit(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_title() {
        assert_eq!(fps_title("DX12 Animation", 59.876), "DX12 Animation FPS: 59.88");
        assert_eq!(fps_title("", 30.0), " FPS: 30.00");
    }

    #[test]
    fn test_context_exit_request() {
        let mut ctx = AnimContext::new(800, 600, None);
        assert_eq!(ctx.size(), (800, 600));
        assert!(ctx.is_active());
        assert!(ctx.render().is_none());
        assert!(!ctx.exit_requested);
        ctx.request_exit();
        assert!(ctx.exit_requested);
    }

    #[test]
    fn test_context_keeps_first_failure() {
        let mut ctx = AnimContext::new(1, 1, None);
        ctx.fail(AnimError::Window("first".into()));
        ctx.fail(AnimError::Window("second".into()));

        assert!(ctx.exit_requested);
        assert!(matches!(ctx.failure, Some(AnimError::Window(ref msg)) if msg == "first"));
    }

    #[derive(Default)]
    struct Counting {
        inits: u32,
        idles: u32,
    }

    impl AnimHandler for Counting {
        fn init(&mut self, _ctx: &mut AnimContext) {
            self.inits += 1;
        }

        fn idle(&mut self, ctx: &mut AnimContext) {
            self.idles += 1;
            if self.idles == 3 {
                ctx.request_exit();
            }
        }
    }

    #[test]
    fn test_handler_defaults_are_noops() {
        let mut ctx = AnimContext::new(1, 1, None);
        let mut handler = Counting::default();
        handler.init(&mut ctx);
        handler.resize(&mut ctx);
        handler.timer(&mut ctx);
        handler.erase(&mut ctx);
        handler.paint(&mut ctx);
        handler.activate(&mut ctx, false);
        for _ in 0..3 {
            handler.idle(&mut ctx);
        }
        handler.close(&mut ctx);

        assert_eq!(handler.inits, 1);
        assert_eq!(handler.idles, 3);
        assert!(ctx.exit_requested);

        let mut noop = NoopHandler;
        noop.idle(&mut ctx);
    }

    #[test]
    fn test_loop_event_mapping() {
        use winit::dpi::PhysicalSize;

        assert_eq!(loop_event(WindowEvent::CloseRequested), Some(LoopEvent::CloseRequested));
        assert_eq!(loop_event(WindowEvent::Focused(false)), Some(LoopEvent::Focused(false)));
        assert_eq!(loop_event(WindowEvent::RedrawRequested), Some(LoopEvent::Redraw));
        assert_eq!(
            loop_event(WindowEvent::Resized(PhysicalSize::new(640, 480))),
            Some(LoopEvent::Resized { width: 640, height: 480 })
        );
        assert_eq!(loop_event(WindowEvent::Destroyed), None);
    }
}
