//! 键盘和鼠标状态
//!
//! 窗口事件到达时写入，然后每帧调用一次 [`InputState::response`]
//! 计算每帧的值：按键单击、鼠标位移和滚轮变化。

use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};
use winit::keyboard::KeyCode;

/// 滚轮一格对应的单位（Win32 `WHEEL_DELTA`）
pub const WHEEL_DELTA: f64 = 120.0;

/// 轮询式输入状态
#[derive(Debug, Default)]
pub struct InputState {
    // 键盘
    keys: HashSet<KeyCode>,
    keys_old: HashSet<KeyCode>,
    keys_click: HashSet<KeyCode>,

    // 鼠标
    mouse_buttons: HashSet<MouseButton>,
    cursor_pos: (f64, f64),
    mouse_pos: (f64, f64),
    mouse_delta: (f64, f64),
    mouse_z: f64,
    mouse_dz: f64,
    wheel: f64,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_keyboard_input(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.keys.insert(key);
            }
            ElementState::Released => {
                self.keys.remove(&key);
            }
        }
    }

    pub fn on_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.mouse_buttons.insert(button);
            }
            ElementState::Released => {
                self.mouse_buttons.remove(&button);
            }
        }
    }

    /// 记录客户区坐标下的光标位置
    pub fn on_cursor_moved(&mut self, position: (f64, f64)) {
        self.cursor_pos = position;
    }

    /// 累计滚轮移动，直到下一次 [`response`](Self::response)
    pub fn on_mouse_wheel(&mut self, delta: MouseScrollDelta) {
        self.wheel += match delta {
            MouseScrollDelta::LineDelta(_, y) => y as f64 * WHEEL_DELTA,
            MouseScrollDelta::PixelDelta(pos) => pos.y,
        };
    }

    /// 释放所有按下的键和按钮，失去焦点后不会再收到抬起事件
    pub fn on_focus_lost(&mut self) {
        self.keys.clear();
        self.mouse_buttons.clear();
    }

    /// 每帧更新
    pub fn response(&mut self) {
        self.keys_click = self.keys.difference(&self.keys_old).copied().collect();
        self.keys_old.clone_from(&self.keys);

        self.mouse_delta = (
            self.cursor_pos.0 - self.mouse_pos.0,
            self.cursor_pos.1 - self.mouse_pos.1,
        );
        self.mouse_pos = self.cursor_pos;
        self.mouse_dz = self.wheel;
        self.mouse_z += self.wheel;
        self.wheel = 0.0;
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    /// 本帧按下而上一帧未按下
    pub fn is_key_click(&self, key: KeyCode) -> bool {
        self.keys_click.contains(&key)
    }

    pub fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }

    /// 最近一次更新时的光标位置
    pub fn mouse_pos(&self) -> (f64, f64) {
        self.mouse_pos
    }

    pub fn mouse_delta(&self) -> (f64, f64) {
        self.mouse_delta
    }

    /// 累计的滚轮位置
    pub fn mouse_z(&self) -> f64 {
        self.mouse_z
    }

    /// 上一帧内的滚轮变化
    pub fn mouse_dz(&self) -> f64 {
        self.mouse_dz
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_lasts_one_frame() {
        let mut input = InputState::new();
        input.on_keyboard_input(KeyCode::KeyW, ElementState::Pressed);

        input.response();
        assert!(input.is_key_down(KeyCode::KeyW));
        assert!(input.is_key_click(KeyCode::KeyW));

        input.response();
        assert!(input.is_key_down(KeyCode::KeyW));
        assert!(!input.is_key_click(KeyCode::KeyW));

        input.on_keyboard_input(KeyCode::KeyW, ElementState::Released);
        input.response();
        assert!(!input.is_key_down(KeyCode::KeyW));

        input.on_keyboard_input(KeyCode::KeyW, ElementState::Pressed);
        input.response();
        assert!(input.is_key_click(KeyCode::KeyW));
    }

    #[test]
    fn test_mouse_delta_between_responses() {
        let mut input = InputState::new();
        input.on_cursor_moved((10.0, 20.0));
        input.on_cursor_moved((15.0, 18.0));
        input.response();
        assert_eq!(input.mouse_pos(), (15.0, 18.0));
        assert_eq!(input.mouse_delta(), (15.0, 18.0));

        input.on_cursor_moved((20.0, 20.0));
        input.response();
        assert_eq!(input.mouse_delta(), (5.0, 2.0));

        input.response();
        assert_eq!(input.mouse_delta(), (0.0, 0.0));
    }

    #[test]
    fn test_wheel_accumulates() {
        let mut input = InputState::new();
        input.on_mouse_wheel(MouseScrollDelta::LineDelta(0.0, 1.0));
        input.on_mouse_wheel(MouseScrollDelta::LineDelta(0.0, 1.0));
        input.response();
        assert_eq!(input.mouse_dz(), 240.0);
        assert_eq!(input.mouse_z(), 240.0);

        input.on_mouse_wheel(MouseScrollDelta::LineDelta(0.0, -1.0));
        input.response();
        assert_eq!(input.mouse_dz(), -120.0);
        assert_eq!(input.mouse_z(), 120.0);

        input.response();
        assert_eq!(input.mouse_dz(), 0.0);
    }

    #[test]
    fn test_focus_lost_releases_keys() {
        let mut input = InputState::new();
        input.on_keyboard_input(KeyCode::ShiftLeft, ElementState::Pressed);
        input.on_mouse_button(MouseButton::Left, ElementState::Pressed);
        assert!(input.is_mouse_button_down(MouseButton::Left));

        input.on_focus_lost();
        input.response();
        assert!(!input.is_key_down(KeyCode::ShiftLeft));
        assert!(!input.is_mouse_button_down(MouseButton::Left));
    }
}
