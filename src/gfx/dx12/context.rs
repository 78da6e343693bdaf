//! DX12 设备初始化
//!
//! [`Dx12Core::new`] 按顺序创建帧循环需要的全部对象：
//!
//! 1. 读取窗口尺寸
//! 2. 启用调试层（可选），创建 DXGI 工厂
//! 3. 枚举并选择适配器（找不到时使用 WARP）
//! 4. 创建设备
//! 5. 创建直接命令队列
//! 6. 为窗口创建交换链
//! 7. 创建 RTV / DSV / CBV-SRV-UAV 描述符堆
//! 8. 为每个后台缓冲创建渲染目标视图
//! 9. 创建深度缓冲及其视图
//! 10. 创建命令分配器和命令列表
//! 11. 创建并映射常量缓冲，创建其视图
//! 12. 创建 Fence 及等待用的事件

use std::ffi::c_void;

use raw_window_handle::{HasWindowHandle, RawWindowHandle};
use tracing::{debug, info, warn};
use windows::core::Interface;
use windows::Win32::Foundation::{HANDLE, HWND};
use windows::Win32::Graphics::Direct3D::*;
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::Common::*;
use windows::Win32::Graphics::Dxgi::*;
use windows::Win32::System::Threading::CreateEventA;
use winit::window::Window;

use super::adapter::choose_adapter;
use super::descriptor::Dx12DescriptorHeap;
use super::HrContext;
use crate::core::config::{FeatureLevel, GraphicsConfig};
use crate::core::error::{GraphicsError, Result};
use crate::gfx::adapter::AdapterInfo;
use crate::gfx::descriptor::{HeapLayout, CONSTANTS_SLOT, DEPTH_SLOT};
use crate::gfx::sync::FenceTracker;

/// 后台缓冲格式
pub(super) const BACK_BUFFER_FORMAT: DXGI_FORMAT = DXGI_FORMAT_R8G8B8A8_UNORM;

/// 深度缓冲格式
pub(super) const DEPTH_FORMAT: DXGI_FORMAT = DXGI_FORMAT_D32_FLOAT;

/// 常量缓冲大小（按 256 字节对齐）
pub(super) const CONSTANT_BUFFER_SIZE: u64 = 256;

/// DX12 设备、交换链以及每帧需要的对象
pub struct Dx12Core {
    pub(super) adapter: AdapterInfo,
    pub(super) device: ID3D12Device,
    pub(super) command_queue: ID3D12CommandQueue,
    pub(super) swap_chain: IDXGISwapChain3,

    // 描述符堆
    pub(super) layout: HeapLayout,
    pub(super) rtv_heap: Dx12DescriptorHeap,
    pub(super) dsv_heap: Dx12DescriptorHeap,
    pub(super) cbv_heap: Dx12DescriptorHeap,

    pub(super) render_targets: Vec<ID3D12Resource>,
    pub(super) depth_buffer: ID3D12Resource,

    pub(super) command_allocator: ID3D12CommandAllocator,
    pub(super) command_list: ID3D12GraphicsCommandList,

    pub(super) constant_buffer: ID3D12Resource,
    /// `constant_buffer` 持久映射后的 CPU 地址
    pub(super) constant_data: *mut u8,

    // 同步
    pub(super) fence: ID3D12Fence,
    pub(super) fence_event: HANDLE,
    pub(super) fences: FenceTracker,

    pub(super) frame_index: u32,
    pub(super) vsync: bool,
    pub(super) width: u32,
    pub(super) height: u32,
}

fn d3d_feature_level(level: FeatureLevel) -> D3D_FEATURE_LEVEL {
    match level {
        FeatureLevel::Level11_0 => D3D_FEATURE_LEVEL_11_0,
        FeatureLevel::Level12_0 => D3D_FEATURE_LEVEL_12_0,
        FeatureLevel::Level12_1 => D3D_FEATURE_LEVEL_12_1,
    }
}

fn window_hwnd(window: &Window) -> Result<HWND> {
    let handle = window
        .window_handle()
        .map_err(|e| GraphicsError::SwapchainError(format!("window handle unavailable: {}", e)))?;

    match handle.as_raw() {
        RawWindowHandle::Win32(win32) => Ok(HWND(win32.hwnd.get() as *mut c_void)),
        other => Err(GraphicsError::Unsupported(format!("expected a Win32 window handle, got {:?}", other)).into()),
    }
}

/// 后台缓冲索引对应的 RTV 槽位
pub(super) fn back_buffer_slot(layout: &HeapLayout, frame: u32) -> Result<u32> {
    layout.back_buffer_slot(frame).ok_or_else(|| {
        GraphicsError::SwapchainError(format!(
            "back buffer {} out of range ({} buffers)",
            frame, layout.buffer_count
        ))
        .into()
    })
}

impl Dx12Core {
    /// 为窗口创建设备及所有每帧对象
    ///
    /// # 参数
    ///
    /// * `window` - 目标窗口（必须是 Win32 窗口）
    /// * `config` - 图形配置
    ///
    /// # 返回值
    ///
    /// 任一 API 调用失败都返回带调用名的 `GraphicsError`
    pub fn new(window: &Window, config: &GraphicsConfig) -> Result<Self> {
        // 1. 窗口尺寸
        let size = window.inner_size();
        let (width, height) = (size.width.max(1), size.height.max(1));
        let layout = HeapLayout::for_buffers(config.buffer_count);

        unsafe {
            // 2. 调试层 + 工厂
            let mut factory_flags = DXGI_CREATE_FACTORY_FLAGS(0);
            if config.debug_layer {
                let mut debug: Option<ID3D12Debug> = None;
                match D3D12GetDebugInterface(&mut debug) {
                    Ok(()) => {
                        if let Some(debug) = debug {
                            debug.EnableDebugLayer();
                            factory_flags = DXGI_CREATE_FACTORY_DEBUG;
                            info!("D3D12 debug layer enabled");
                        }
                    }
                    Err(e) => warn!(error = %e, "D3D12 debug layer unavailable"),
                }
            }

            let factory: IDXGIFactory4 = CreateDXGIFactory2(factory_flags)
                .hr_context(GraphicsError::DeviceCreation, "CreateDXGIFactory2")?;

            // 3. 适配器
            let (adapter, adapter_info) = choose_adapter(&factory, config.allow_software_adapter)?;

            // 4. 设备
            let mut device: Option<ID3D12Device> = None;
            D3D12CreateDevice(&adapter, d3d_feature_level(config.feature_level), &mut device)
                .hr_context(GraphicsError::DeviceCreation, "D3D12CreateDevice")?;
            let device = device.ok_or_else(|| {
                GraphicsError::DeviceCreation("D3D12CreateDevice returned no device".to_string())
            })?;
            info!(feature_level = config.feature_level.name(), "D3D12 device created");

            // 5. 命令队列
            let queue_desc = D3D12_COMMAND_QUEUE_DESC {
                Type: D3D12_COMMAND_LIST_TYPE_DIRECT,
                Priority: D3D12_COMMAND_QUEUE_PRIORITY_NORMAL.0,
                Flags: D3D12_COMMAND_QUEUE_FLAG_NONE,
                NodeMask: 0,
            };
            let command_queue: ID3D12CommandQueue = device
                .CreateCommandQueue(&queue_desc)
                .hr_context(GraphicsError::DeviceCreation, "CreateCommandQueue")?;

            // 6. 交换链
            let hwnd = window_hwnd(window)?;
            let swap_chain_desc = DXGI_SWAP_CHAIN_DESC1 {
                Width: width,
                Height: height,
                Format: BACK_BUFFER_FORMAT,
                SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
                BufferUsage: DXGI_USAGE_RENDER_TARGET_OUTPUT,
                BufferCount: layout.buffer_count,
                Scaling: DXGI_SCALING_STRETCH,
                SwapEffect: DXGI_SWAP_EFFECT_FLIP_SEQUENTIAL,
                AlphaMode: DXGI_ALPHA_MODE_IGNORE,
                ..Default::default()
            };
            let swap_chain: IDXGISwapChain1 = factory
                .CreateSwapChainForHwnd(&command_queue, hwnd, &swap_chain_desc, None, None)
                .hr_context(GraphicsError::SwapchainError, "CreateSwapChainForHwnd")?;
            let swap_chain: IDXGISwapChain3 = swap_chain
                .cast()
                .hr_context(GraphicsError::SwapchainError, "IDXGISwapChain1 -> IDXGISwapChain3")?;
            // 全屏由窗口切换，禁用 Alt+Enter
            factory
                .MakeWindowAssociation(hwnd, DXGI_MWA_NO_ALT_ENTER)
                .hr_context(GraphicsError::SwapchainError, "MakeWindowAssociation")?;
            info!(width, height, buffers = layout.buffer_count, "Swap chain created");

            // 7. 描述符堆
            let rtv_heap = Dx12DescriptorHeap::new(&device, &layout.rtv)?;
            let dsv_heap = Dx12DescriptorHeap::new(&device, &layout.dsv)?;
            let cbv_heap = Dx12DescriptorHeap::new(&device, &layout.cbv_srv_uav)?;

            // 8. 渲染目标视图
            let render_targets = create_render_targets(&device, &swap_chain, &rtv_heap, &layout)?;

            // 9. 深度缓冲
            let depth_buffer = create_depth_buffer(&device, &dsv_heap, width, height)?;

            // 10. 命令分配器 + 命令列表
            let command_allocator: ID3D12CommandAllocator = device
                .CreateCommandAllocator(D3D12_COMMAND_LIST_TYPE_DIRECT)
                .hr_context(GraphicsError::DeviceCreation, "CreateCommandAllocator")?;
            let command_list: ID3D12GraphicsCommandList = device
                .CreateCommandList(0, D3D12_COMMAND_LIST_TYPE_DIRECT, &command_allocator, None::<&ID3D12PipelineState>)
                .hr_context(GraphicsError::DeviceCreation, "CreateCommandList")?;
            // 新建的命令列表处于打开状态，帧循环要求先关闭
            command_list
                .Close()
                .hr_context(GraphicsError::CommandExecution, "ID3D12GraphicsCommandList::Close")?;

            // 11. 常量缓冲
            let (constant_buffer, constant_data) = create_constant_buffer(&device, &cbv_heap)?;

            // 12. Fence + 事件
            let fence: ID3D12Fence = device
                .CreateFence(0, D3D12_FENCE_FLAG_NONE)
                .hr_context(GraphicsError::DeviceCreation, "CreateFence")?;
            let fence_event = CreateEventA(None, false, false, None)
                .hr_context(GraphicsError::DeviceCreation, "CreateEventA")?;

            let frame_index = swap_chain.GetCurrentBackBufferIndex();
            debug!(frame_index, "D3D12 initialization complete");

            Ok(Self {
                adapter: adapter_info,
                device,
                command_queue,
                swap_chain,
                layout,
                rtv_heap,
                dsv_heap,
                cbv_heap,
                render_targets,
                depth_buffer,
                command_allocator,
                command_list,
                constant_buffer,
                constant_data,
                fence,
                fence_event,
                fences: FenceTracker::new(),
                frame_index,
                vsync: config.vsync,
                width,
                height,
            })
        }
    }

    /// 创建设备所用的适配器
    pub fn adapter(&self) -> &AdapterInfo {
        &self.adapter
    }
}

/// 取出所有后台缓冲并为每个创建 RTV
pub(super) fn create_render_targets(
    device: &ID3D12Device,
    swap_chain: &IDXGISwapChain3,
    rtv_heap: &Dx12DescriptorHeap,
    layout: &HeapLayout,
) -> Result<Vec<ID3D12Resource>> {
    (0..layout.buffer_count)
        .map(|i| unsafe {
            let buffer: ID3D12Resource = swap_chain
                .GetBuffer(i)
                .hr_context(GraphicsError::SwapchainError, "IDXGISwapChain::GetBuffer")?;
            let slot = back_buffer_slot(layout, i)?;
            device.CreateRenderTargetView(&buffer, None, rtv_heap.cpu_handle(slot));
            Ok(buffer)
        })
        .collect()
}

/// 创建指定尺寸的深度缓冲，视图写入 [`DEPTH_SLOT`]
pub(super) fn create_depth_buffer(
    device: &ID3D12Device,
    dsv_heap: &Dx12DescriptorHeap,
    width: u32,
    height: u32,
) -> Result<ID3D12Resource> {
    let heap_props = D3D12_HEAP_PROPERTIES {
        Type: D3D12_HEAP_TYPE_DEFAULT,
        ..Default::default()
    };
    let resource_desc = D3D12_RESOURCE_DESC {
        Dimension: D3D12_RESOURCE_DIMENSION_TEXTURE2D,
        Width: width as u64,
        Height: height,
        DepthOrArraySize: 1,
        MipLevels: 1,
        Format: DEPTH_FORMAT,
        SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
        Layout: D3D12_TEXTURE_LAYOUT_UNKNOWN,
        Flags: D3D12_RESOURCE_FLAG_ALLOW_DEPTH_STENCIL,
        ..Default::default()
    };
    let clear_value = D3D12_CLEAR_VALUE {
        Format: DEPTH_FORMAT,
        Anonymous: D3D12_CLEAR_VALUE_0 {
            DepthStencil: D3D12_DEPTH_STENCIL_VALUE { Depth: 1.0, Stencil: 0 },
        },
    };

    unsafe {
        let mut depth_buffer: Option<ID3D12Resource> = None;
        device
            .CreateCommittedResource(
                &heap_props,
                D3D12_HEAP_FLAG_NONE,
                &resource_desc,
                D3D12_RESOURCE_STATE_DEPTH_WRITE,
                Some(&clear_value),
                &mut depth_buffer,
            )
            .hr_context(GraphicsError::ResourceCreation, "CreateCommittedResource(depth)")?;
        let depth_buffer = depth_buffer.ok_or_else(|| {
            GraphicsError::ResourceCreation("depth buffer was not returned".to_string())
        })?;

        device.CreateDepthStencilView(&depth_buffer, None, dsv_heap.cpu_handle(DEPTH_SLOT));
        Ok(depth_buffer)
    }
}

/// 在上传堆创建常量缓冲并映射，视图写入 [`CONSTANTS_SLOT`]
fn create_constant_buffer(
    device: &ID3D12Device,
    cbv_heap: &Dx12DescriptorHeap,
) -> Result<(ID3D12Resource, *mut u8)> {
    let heap_props = D3D12_HEAP_PROPERTIES {
        Type: D3D12_HEAP_TYPE_UPLOAD,
        ..Default::default()
    };
    let resource_desc = D3D12_RESOURCE_DESC {
        Dimension: D3D12_RESOURCE_DIMENSION_BUFFER,
        Width: CONSTANT_BUFFER_SIZE,
        Height: 1,
        DepthOrArraySize: 1,
        MipLevels: 1,
        SampleDesc: DXGI_SAMPLE_DESC { Count: 1, Quality: 0 },
        Layout: D3D12_TEXTURE_LAYOUT_ROW_MAJOR,
        ..Default::default()
    };

    unsafe {
        let mut buffer: Option<ID3D12Resource> = None;
        device
            .CreateCommittedResource(
                &heap_props,
                D3D12_HEAP_FLAG_NONE,
                &resource_desc,
                D3D12_RESOURCE_STATE_GENERIC_READ,
                None,
                &mut buffer,
            )
            .hr_context(GraphicsError::ResourceCreation, "CreateCommittedResource(constants)")?;
        let buffer = buffer.ok_or_else(|| {
            GraphicsError::ResourceCreation("constant buffer was not returned".to_string())
        })?;

        let mut data: *mut c_void = std::ptr::null_mut();
        buffer
            .Map(0, None, Some(&mut data))
            .hr_context(GraphicsError::ResourceCreation, "ID3D12Resource::Map")?;

        let view_desc = D3D12_CONSTANT_BUFFER_VIEW_DESC {
            BufferLocation: buffer.GetGPUVirtualAddress(),
            SizeInBytes: CONSTANT_BUFFER_SIZE as u32,
        };
        device.CreateConstantBufferView(Some(&view_desc), cbv_heap.cpu_handle(CONSTANTS_SLOT));

        debug!(size = CONSTANT_BUFFER_SIZE, "Constant buffer created and mapped");
        Ok((buffer, data as *mut u8))
    }
}
