//! DX12 描述符堆

use tracing::{debug, warn};
use windows::core::PCWSTR;
use windows::Win32::Graphics::Direct3D12::*;

use super::HrContext;
use crate::core::error::{GraphicsError, Result};
use crate::gfx::descriptor::{slot_address, HeapKind, HeapSpec};

/// 描述符堆及按槽位取 CPU 句柄所需的信息
pub struct Dx12DescriptorHeap {
    heap: ID3D12DescriptorHeap,
    cpu_start: usize,
    increment_size: u32,
}

fn heap_type(kind: HeapKind) -> D3D12_DESCRIPTOR_HEAP_TYPE {
    match kind {
        HeapKind::Rtv => D3D12_DESCRIPTOR_HEAP_TYPE_RTV,
        HeapKind::Dsv => D3D12_DESCRIPTOR_HEAP_TYPE_DSV,
        HeapKind::CbvSrvUav => D3D12_DESCRIPTOR_HEAP_TYPE_CBV_SRV_UAV,
    }
}

fn heap_flags(kind: HeapKind) -> D3D12_DESCRIPTOR_HEAP_FLAGS {
    if kind.shader_visible() {
        D3D12_DESCRIPTOR_HEAP_FLAG_SHADER_VISIBLE
    } else {
        D3D12_DESCRIPTOR_HEAP_FLAG_NONE
    }
}

impl Dx12DescriptorHeap {
    /// 创建描述符堆并记录增量大小
    ///
    /// # 参数
    ///
    /// * `device` - DX12 设备
    /// * `spec` - 堆种类和容量
    pub fn new(device: &ID3D12Device, spec: &HeapSpec) -> Result<Self> {
        let heap_desc = D3D12_DESCRIPTOR_HEAP_DESC {
            Type: heap_type(spec.kind),
            NumDescriptors: spec.count,
            Flags: heap_flags(spec.kind),
            NodeMask: 0,
        };

        unsafe {
            let heap: ID3D12DescriptorHeap = device
                .CreateDescriptorHeap(&heap_desc)
                .hr_context(GraphicsError::ResourceCreation, "CreateDescriptorHeap")?;

            // 调试名称，失败只记录
            let wide_name: Vec<u16> = spec.kind.name().encode_utf16().chain(Some(0)).collect();
            if let Err(e) = heap.SetName(PCWSTR(wide_name.as_ptr())) {
                warn!(heap = spec.kind.name(), error = %e, "SetName failed");
            }

            let increment_size = device.GetDescriptorHandleIncrementSize(heap_desc.Type);
            let cpu_start = heap.GetCPUDescriptorHandleForHeapStart().ptr;

            debug!(heap = spec.kind.name(), count = spec.count, increment_size, "Descriptor heap created");

            Ok(Self {
                heap,
                cpu_start,
                increment_size,
            })
        }
    }

    pub fn heap(&self) -> &ID3D12DescriptorHeap {
        &self.heap
    }

    /// 第 `slot` 个描述符的 CPU 句柄
    pub fn cpu_handle(&self, slot: u32) -> D3D12_CPU_DESCRIPTOR_HANDLE {
        D3D12_CPU_DESCRIPTOR_HANDLE {
            ptr: slot_address(self.cpu_start, slot, self.increment_size),
        }
    }
}
