//! 与窗口无关的事件分发
//!
//! [`LoopDriver`] 持有回调的全部状态（是否已初始化、是否正在关闭、计时周期），
//! 把 [`LoopEvent`] 转换为 [`AnimHandler`] 回调，并返回需要窗口执行的 [`LoopAction`]。

use std::time::{Duration, Instant};

use winit::event::{ElementState, MouseButton, MouseScrollDelta};
use winit::keyboard::KeyCode;

use super::{fps_title, AnimContext, AnimHandler};
use crate::core::config::AnimConfig;
use crate::core::error::Result;
use crate::{engine_debug, engine_error, engine_info, engine_warn};

/// 从窗口事件中提取的循环事件
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LoopEvent {
    Resized { width: u32, height: u32 },
    Focused(bool),
    Key { key: KeyCode, state: ElementState, repeat: bool },
    CursorMoved(f64, f64),
    Wheel(MouseScrollDelta),
    MouseButton { button: MouseButton, state: ElementState },
    Redraw,
    CloseRequested,
    /// 一次循环迭代（事件队列清空后）
    Frame(Instant),
}

/// 需要窗口或事件循环执行的操作
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LoopAction {
    ToggleFullscreen,
    SetTitle(String),
    Exit,
}

pub(crate) struct LoopDriver<H: AnimHandler> {
    ctx: AnimContext,
    handler: H,
    title: String,
    timer_interval: Duration,
    show_fps_in_title: bool,
    last_tick: Instant,
    is_init: bool,
    closing: bool,
}

impl<H: AnimHandler> LoopDriver<H> {
    /// # 参数
    ///
    /// * `ctx` - 回调使用的上下文
    /// * `handler` - 应用回调
    /// * `title` - 窗口标题（FPS 追加在其后）
    /// * `config` - 帧循环配置
    /// * `start` - 计时周期的起点
    pub(crate) fn new(ctx: AnimContext, handler: H, title: String, config: &AnimConfig, start: Instant) -> Self {
        Self {
            ctx,
            handler,
            title,
            timer_interval: Duration::from_millis(config.timer_interval_ms),
            show_fps_in_title: config.show_fps_in_title,
            last_tick: start,
            is_init: false,
            closing: false,
        }
    }

    /// 分发一个事件
    ///
    /// # 返回值
    ///
    /// 窗口需要执行的操作，关闭时最后一个为 [`LoopAction::Exit`]
    pub(crate) fn handle(&mut self, event: LoopEvent) -> Vec<LoopAction> {
        let mut actions = Vec::new();
        if self.closing {
            return actions;
        }

        if let Err(e) = self.dispatch(event, &mut actions) {
            engine_error!("Frame failed: {}", e);
            self.ctx.fail(e);
        }

        if self.ctx.exit_requested {
            self.shutdown();
            actions.push(LoopAction::Exit);
        }
        actions
    }

    /// 循环结束后的结果，回调或帧中记录的第一个错误
    pub(crate) fn into_result(self) -> Result<()> {
        match self.ctx.failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn dispatch(&mut self, event: LoopEvent, actions: &mut Vec<LoopAction>) -> Result<()> {
        match event {
            LoopEvent::CloseRequested => {
                engine_info!("Close requested, shutting down...");
                self.ctx.request_exit();
            }
            LoopEvent::Resized { width, height } => {
                engine_debug!(width, height, "Window resized");
                self.ctx.width = width;
                self.ctx.height = height;
                if let Some(render) = self.ctx.render.as_mut() {
                    render.resize(width, height)?;
                }
                if self.is_init {
                    self.handler.resize(&mut self.ctx);
                }
            }
            LoopEvent::Focused(focused) => {
                self.ctx.active = focused;
                if !focused {
                    self.ctx.input.on_focus_lost();
                }
                self.handler.activate(&mut self.ctx, focused);
            }
            LoopEvent::Key { key, state, repeat } => {
                self.ctx.input.on_keyboard_input(key, state);
                if state == ElementState::Pressed && !repeat {
                    match key {
                        KeyCode::Escape => self.ctx.request_exit(),
                        KeyCode::KeyF => actions.push(LoopAction::ToggleFullscreen),
                        _ => {}
                    }
                }
            }
            LoopEvent::CursorMoved(x, y) => self.ctx.input.on_cursor_moved((x, y)),
            LoopEvent::Wheel(delta) => self.ctx.input.on_mouse_wheel(delta),
            LoopEvent::MouseButton { button, state } => self.ctx.input.on_mouse_button(button, state),
            LoopEvent::Redraw => {
                if self.is_init {
                    self.handler.erase(&mut self.ctx);
                    self.handler.paint(&mut self.ctx);
                }
            }
            LoopEvent::Frame(now) => self.frame(now, actions)?,
        }
        Ok(())
    }

    /// 一次循环迭代，第一次调用时初始化
    fn frame(&mut self, now: Instant, actions: &mut Vec<LoopAction>) -> Result<()> {
        if !self.is_init {
            engine_debug!("Initializing animation");
            self.is_init = true;
            self.handler.init(&mut self.ctx);
            self.handler.resize(&mut self.ctx);
        }

        self.ctx.timer.response_at(now);
        self.ctx.input.response();
        self.handler.idle(&mut self.ctx);

        if let Some(render) = self.ctx.render.as_mut() {
            render.render_frame()?;
        }

        if now.saturating_duration_since(self.last_tick) >= self.timer_interval {
            self.last_tick = now;
            self.handler.timer(&mut self.ctx);
            if self.show_fps_in_title {
                actions.push(LoopAction::SetTitle(fps_title(&self.title, self.ctx.timer.fps())));
            }
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        self.closing = true;
        if self.is_init {
            self.handler.close(&mut self.ctx);
        }
        if let Some(render) = self.ctx.render.as_mut() {
            if let Err(e) = render.flush() {
                engine_warn!("GPU flush on shutdown failed: {}", e);
            }
        }
        engine_info!("Animation closed");
    }
}
