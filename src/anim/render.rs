//! 动画循环持有的渲染器

use winit::window::Window;

use crate::core::config::GraphicsConfig;
use crate::core::error::Result;
use crate::math::Matrf;

#[cfg(target_os = "windows")]
use crate::engine_info;
#[cfg(target_os = "windows")]
use crate::gfx::dx12::Dx12Core;

/// 在 D3D12 设备之上保存清屏颜色和每帧常量
pub struct Render {
    #[cfg(target_os = "windows")]
    core: Dx12Core,
    clear_color: [f32; 4],
    constants: Matrf,
}

impl Render {
    /// 为窗口创建 GPU 设备
    ///
    /// # 参数
    ///
    /// * `window` - 目标窗口
    /// * `config` - 图形配置
    #[cfg(target_os = "windows")]
    pub fn new(window: &Window, config: &GraphicsConfig) -> Result<Self> {
        let core = Dx12Core::new(window, config)?;
        engine_info!(adapter = %core.adapter().summary(), "Renderer ready");
        Ok(Self {
            core,
            clear_color: config.clear_color,
            constants: Matrf::identity(),
        })
    }

    /// 只有 Windows 上有 Direct3D 12
    #[cfg(not(target_os = "windows"))]
    pub fn new(_window: &Window, _config: &GraphicsConfig) -> Result<Self> {
        Err(crate::core::error::GraphicsError::Unsupported(
            "Direct3D 12 is only available on Windows".to_string(),
        )
        .into())
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        self.clear_color = color;
    }

    /// 每帧上传到常量缓冲的矩阵
    pub fn constants(&self) -> &Matrf {
        &self.constants
    }

    pub fn set_constants(&mut self, matrix: Matrf) {
        self.constants = matrix;
    }

    #[cfg(target_os = "windows")]
    pub fn render_frame(&mut self) -> Result<()> {
        self.core.update_constants(&self.constants);
        self.core.render_frame(self.clear_color)
    }

    #[cfg(not(target_os = "windows"))]
    pub fn render_frame(&mut self) -> Result<()> {
        Ok(())
    }

    #[cfg(target_os = "windows")]
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.core.resize(width, height)
    }

    #[cfg(not(target_os = "windows"))]
    pub fn resize(&mut self, _width: u32, _height: u32) -> Result<()> {
        Ok(())
    }

    #[cfg(target_os = "windows")]
    pub fn flush(&mut self) -> Result<()> {
        self.core.flush()
    }

    #[cfg(not(target_os = "windows"))]
    pub fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
