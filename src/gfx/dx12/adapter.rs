//! DXGI 适配器枚举

use tracing::{debug, info, warn};
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::*;

use super::HrContext;
use crate::core::error::{GraphicsError, Result};
use crate::gfx::adapter::{select_best_adapter, AdapterInfo, DisplayMode};

/// 把定长 UTF-16 缓冲转换为字符串，截止到第一个 NUL
fn wide_to_string(wide: &[u16]) -> String {
    let len = wide.iter().position(|&c| c == 0).unwrap_or(wide.len());
    String::from_utf16_lossy(&wide[..len])
}

fn describe(index: u32, adapter: &IDXGIAdapter1) -> Result<AdapterInfo> {
    let desc = unsafe { adapter.GetDesc1() }
        .hr_context(GraphicsError::NoAdapter, "IDXGIAdapter1::GetDesc1")?;

    Ok(AdapterInfo {
        index,
        name: wide_to_string(&desc.Description),
        vendor_id: desc.VendorId,
        device_id: desc.DeviceId,
        dedicated_video_memory: desc.DedicatedVideoMemory as u64,
        dedicated_system_memory: desc.DedicatedSystemMemory as u64,
        shared_system_memory: desc.SharedSystemMemory as u64,
        is_software: desc.Flags & DXGI_ADAPTER_FLAG_SOFTWARE.0 as u32 != 0,
    })
}

/// 列出工厂能找到的全部适配器
pub fn enumerate_adapters(factory: &IDXGIFactory4) -> Result<Vec<(IDXGIAdapter1, AdapterInfo)>> {
    let mut adapters = Vec::new();

    for i in 0.. {
        let adapter = match unsafe { factory.EnumAdapters1(i) } {
            Ok(a) => a,
            Err(e) if e.code() == DXGI_ERROR_NOT_FOUND => break,
            Err(e) => {
                return Err(GraphicsError::NoAdapter(format!("EnumAdapters1({}) failed: {}", i, e)).into())
            }
        };

        let info = describe(i, &adapter)?;
        adapters.push((adapter, info));
    }

    Ok(adapters)
}

/// 选择用于创建设备的适配器
///
/// # 参数
///
/// * `factory` - DXGI 工厂
/// * `allow_software` - 是否允许选择软件适配器
///
/// # 返回值
///
/// 没有可用的硬件适配器时返回 WARP 适配器
pub fn choose_adapter(factory: &IDXGIFactory4, allow_software: bool) -> Result<(IDXGIAdapter1, AdapterInfo)> {
    let adapters = enumerate_adapters(factory)?;

    for (adapter, info) in &adapters {
        debug!("Adapter {}", info.summary());
        log_adapter_outputs(adapter);
    }

    let infos: Vec<AdapterInfo> = adapters.iter().map(|(_, info)| info.clone()).collect();
    if let Some(best) = select_best_adapter(&infos, allow_software) {
        let chosen = best.index;
        if let Some(pair) = adapters.into_iter().find(|(_, info)| info.index == chosen) {
            info!(adapter = %pair.1.name, "Selected adapter");
            return Ok(pair);
        }
    }

    warn!("No usable adapter enumerated, falling back to WARP");
    let warp = unsafe { factory.EnumWarpAdapter::<IDXGIAdapter1>() }
        .hr_context(GraphicsError::NoAdapter, "IDXGIFactory4::EnumWarpAdapter")?;
    let info = describe(u32::MAX, &warp)?;
    Ok((warp, info))
}

/// 记录适配器连接的输出（显示器）及其显示模式
///
/// 仅用于诊断，失败时记录并跳过
pub fn log_adapter_outputs(adapter: &IDXGIAdapter1) {
    for i in 0.. {
        let output = match unsafe { adapter.EnumOutputs(i) } {
            Ok(o) => o,
            Err(e) if e.code() == DXGI_ERROR_NOT_FOUND => break,
            Err(e) => {
                warn!(output = i, error = %e, "EnumOutputs failed");
                break;
            }
        };

        match unsafe { output.GetDesc() } {
            Ok(desc) => debug!(output = i, name = %wide_to_string(&desc.DeviceName), "  Output"),
            Err(e) => warn!(output = i, error = %e, "IDXGIOutput::GetDesc failed"),
        }

        log_output_display_modes(&output, DXGI_FORMAT_R8G8B8A8_UNORM);
    }
}

/// 记录输出在 `format` 格式下支持的全部显示模式
pub fn log_output_display_modes(output: &IDXGIOutput, format: DXGI_FORMAT) {
    match display_modes(output, format) {
        Ok(modes) => {
            for mode in modes {
                debug!("    {}", mode);
            }
        }
        Err(e) => warn!(error = %e, "Failed to query display modes"),
    }
}

fn display_modes(output: &IDXGIOutput, format: DXGI_FORMAT) -> Result<Vec<DisplayMode>> {
    let flags = DXGI_ENUM_MODES::default();
    let mut count = 0u32;
    unsafe { output.GetDisplayModeList(format, flags, &mut count, None) }
        .hr_context(GraphicsError::NoAdapter, "IDXGIOutput::GetDisplayModeList")?;

    let mut modes = vec![DXGI_MODE_DESC::default(); count as usize];
    unsafe { output.GetDisplayModeList(format, flags, &mut count, Some(modes.as_mut_ptr())) }
        .hr_context(GraphicsError::NoAdapter, "IDXGIOutput::GetDisplayModeList")?;
    modes.truncate(count as usize);

    Ok(modes
        .iter()
        .map(|m| DisplayMode {
            width: m.Width,
            height: m.Height,
            refresh_numerator: m.RefreshRate.Numerator,
            refresh_denominator: m.RefreshRate.Denominator,
        })
        .collect())
}
