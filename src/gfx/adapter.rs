//! 适配器信息和选择策略
//!
//! DXGI 枚举在 Direct3D 12 后端中完成，这里只保存枚举得到的数据和选择规则，
//! 因此规则不需要 GPU 也能测试。

use std::fmt;

const MIB: u64 = 1024 * 1024;

/// 枚举到的单个适配器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterInfo {
    /// 枚举序号
    pub index: u32,
    pub name: String,
    pub vendor_id: u32,
    pub device_id: u32,
    /// 专用显存（字节）
    pub dedicated_video_memory: u64,
    pub dedicated_system_memory: u64,
    pub shared_system_memory: u64,
    /// 是否为软件光栅化器（WARP / Basic Render Driver）
    pub is_software: bool,
}

impl AdapterInfo {
    /// 用于日志的单行描述
    pub fn summary(&self) -> String {
        format!(
            "#{} {} (vendor {:#06x}, device {:#06x}) VRAM {} MiB, system {} MiB, shared {} MiB{}",
            self.index,
            self.name,
            self.vendor_id,
            self.device_id,
            self.dedicated_video_memory / MIB,
            self.dedicated_system_memory / MIB,
            self.shared_system_memory / MIB,
            if self.is_software { " [software]" } else { "" },
        )
    }
}

/// 选择用于创建设备的适配器
///
/// 专用显存最大的硬件适配器胜出，相同时取先枚举到的。
/// 只有 `allow_software` 为真或没有任何硬件适配器时才考虑软件适配器。
///
/// # 参数
///
/// * `adapters` - 枚举结果
/// * `allow_software` - 是否允许软件适配器
///
/// # 返回值
///
/// 列表为空时返回 `None`
pub fn select_best_adapter(adapters: &[AdapterInfo], allow_software: bool) -> Option<&AdapterInfo> {
    let has_hardware = adapters.iter().any(|a| !a.is_software);
    let software_ok = allow_software || !has_hardware;

    adapters
        .iter()
        .filter(|a| software_ok || !a.is_software)
        .fold(None, |best: Option<&AdapterInfo>, a| match best {
            Some(b) if a.dedicated_video_memory <= b.dedicated_video_memory => Some(b),
            _ => Some(a),
        })
}

/// 输出报告的一个显示模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayMode {
    pub width: u32,
    pub height: u32,
    pub refresh_numerator: u32,
    pub refresh_denominator: u32,
}

impl DisplayMode {
    /// 刷新率（Hz），分母为 0 时返回 0
    pub fn refresh_hz(&self) -> f64 {
        if self.refresh_denominator == 0 {
            0.0
        } else {
            self.refresh_numerator as f64 / self.refresh_denominator as f64
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} @ {:.2} Hz", self.width, self.height, self.refresh_hz())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(index: u32, vram_mib: u64, is_software: bool) -> AdapterInfo {
        AdapterInfo {
            index,
            name: format!("Adapter {}", index),
            vendor_id: 0x10de,
            device_id: 0x2484,
            dedicated_video_memory: vram_mib * MIB,
            dedicated_system_memory: 0,
            shared_system_memory: 8192 * MIB,
            is_software,
        }
    }

    #[test]
    fn test_largest_vram_wins() {
        let adapters = [adapter(0, 2048, false), adapter(1, 8192, false), adapter(2, 4096, false)];
        assert_eq!(select_best_adapter(&adapters, false).map(|a| a.index), Some(1));
    }

    #[test]
    fn test_tie_goes_to_first() {
        let adapters = [adapter(0, 4096, false), adapter(1, 4096, false)];
        assert_eq!(select_best_adapter(&adapters, false).map(|a| a.index), Some(0));
    }

    #[test]
    fn test_software_skipped_when_hardware_exists() {
        let adapters = [adapter(0, 0, false), adapter(1, 16384, true)];
        assert_eq!(select_best_adapter(&adapters, false).map(|a| a.index), Some(0));
        assert_eq!(select_best_adapter(&adapters, true).map(|a| a.index), Some(1));
    }

    #[test]
    fn test_software_only_system() {
        let adapters = [adapter(0, 0, true)];
        assert_eq!(select_best_adapter(&adapters, false).map(|a| a.index), Some(0));
        assert!(select_best_adapter(&[], true).is_none());
    }

    #[test]
    fn test_summary() {
        let text = adapter(3, 1024, true).summary();
        assert!(text.starts_with("#3 Adapter 3"));
        assert!(text.contains("VRAM 1024 MiB"));
        assert!(text.ends_with("[software]"));
    }

    #[test]
    fn test_display_mode_refresh() {
        let mode = DisplayMode { width: 1920, height: 1080, refresh_numerator: 60000, refresh_denominator: 1001 };
        assert!((mode.refresh_hz() - 59.94).abs() < 0.01);
        assert_eq!(mode.to_string(), "1920x1080 @ 59.94 Hz");

        let bad = DisplayMode { refresh_denominator: 0, ..mode };
        assert_eq!(bad.refresh_hz(), 0.0);
    }
}
