//! 每帧操作：清屏、呈现、常量上传、缩放

use std::mem::ManuallyDrop;

use tracing::{debug, trace, warn};
use windows::Win32::Foundation::{CloseHandle, RECT};
use windows::Win32::Graphics::Direct3D12::*;
use windows::Win32::Graphics::Dxgi::*;
use windows::Win32::System::Threading::{WaitForSingleObject, INFINITE};

use super::context::{back_buffer_slot, create_depth_buffer, create_render_targets, Dx12Core, BACK_BUFFER_FORMAT};
use super::HrContext;
use crate::core::error::{GraphicsError, Result};
use crate::gfx::descriptor::DEPTH_SLOT;
use crate::math::Matrf;

fn transition_barrier(
    resource: &ID3D12Resource,
    state_before: D3D12_RESOURCE_STATES,
    state_after: D3D12_RESOURCE_STATES,
) -> D3D12_RESOURCE_BARRIER {
    D3D12_RESOURCE_BARRIER {
        Type: D3D12_RESOURCE_BARRIER_TYPE_TRANSITION,
        Flags: D3D12_RESOURCE_BARRIER_FLAG_NONE,
        Anonymous: D3D12_RESOURCE_BARRIER_0 {
            // 借用的指针，屏障不能释放它
            Transition: ManuallyDrop::new(D3D12_RESOURCE_TRANSITION_BARRIER {
                pResource: unsafe { std::mem::transmute_copy(resource) },
                StateBefore: state_before,
                StateAfter: state_after,
                Subresource: D3D12_RESOURCE_BARRIER_ALL_SUBRESOURCES,
            }),
        },
    }
}

impl Dx12Core {
    /// 阻塞直到 GPU 完成已提交的全部命令
    pub fn flush(&mut self) -> Result<()> {
        let value = self.fences.signal_value();

        unsafe {
            self.command_queue
                .Signal(&self.fence, value.value())
                .hr_context(GraphicsError::CommandExecution, "ID3D12CommandQueue::Signal")?;

            if self.fence.GetCompletedValue() < value.value() {
                self.fence
                    .SetEventOnCompletion(value.value(), self.fence_event)
                    .hr_context(GraphicsError::CommandExecution, "ID3D12Fence::SetEventOnCompletion")?;
                WaitForSingleObject(self.fence_event, INFINITE);
            }
        }

        self.fences.mark_completed(value);
        trace!(fence = value.value(), "GPU flushed");
        Ok(())
    }

    /// 录制、提交并呈现一帧
    ///
    /// # 参数
    ///
    /// * `clear_color` - 后台缓冲的清除颜色（深度清为 1.0）
    pub fn render_frame(&mut self, clear_color: [f32; 4]) -> Result<()> {
        let frame = self.frame_index;

        unsafe {
            self.command_allocator
                .Reset()
                .hr_context(GraphicsError::CommandExecution, "ID3D12CommandAllocator::Reset")?;
            self.command_list
                .Reset(&self.command_allocator, None::<&ID3D12PipelineState>)
                .hr_context(GraphicsError::CommandExecution, "ID3D12GraphicsCommandList::Reset")?;

            let slot = back_buffer_slot(&self.layout, frame)?;
            let target = &self.render_targets[frame as usize];
            self.command_list.ResourceBarrier(&[transition_barrier(
                target,
                D3D12_RESOURCE_STATE_PRESENT,
                D3D12_RESOURCE_STATE_RENDER_TARGET,
            )]);

            let viewport = D3D12_VIEWPORT {
                TopLeftX: 0.0,
                TopLeftY: 0.0,
                Width: self.width as f32,
                Height: self.height as f32,
                MinDepth: D3D12_MIN_DEPTH,
                MaxDepth: D3D12_MAX_DEPTH,
            };
            let scissor_rect = RECT {
                left: 0,
                top: 0,
                right: self.width as i32,
                bottom: self.height as i32,
            };
            self.command_list.RSSetViewports(&[viewport]);
            self.command_list.RSSetScissorRects(&[scissor_rect]);
            self.command_list
                .SetDescriptorHeaps(&[Some(self.cbv_heap.heap().clone())]);

            let rtv = self.rtv_heap.cpu_handle(slot);
            let dsv = self.dsv_heap.cpu_handle(DEPTH_SLOT);
            self.command_list.OMSetRenderTargets(1, Some(&rtv), false, Some(&dsv));
            self.command_list.ClearRenderTargetView(rtv, &clear_color, None);
            self.command_list
                .ClearDepthStencilView(dsv, D3D12_CLEAR_FLAG_DEPTH, 1.0, 0, None);

            self.command_list.ResourceBarrier(&[transition_barrier(
                target,
                D3D12_RESOURCE_STATE_RENDER_TARGET,
                D3D12_RESOURCE_STATE_PRESENT,
            )]);

            self.command_list
                .Close()
                .hr_context(GraphicsError::CommandExecution, "ID3D12GraphicsCommandList::Close")?;
            self.command_queue
                .ExecuteCommandLists(&[Some(self.command_list.clone().into())]);

            let sync_interval = if self.vsync { 1 } else { 0 };
            self.swap_chain
                .Present(sync_interval, DXGI_PRESENT(0))
                .ok()
                .hr_context(GraphicsError::SwapchainError, "IDXGISwapChain::Present")?;
        }

        self.flush()?;
        self.frame_index = unsafe { self.swap_chain.GetCurrentBackBufferIndex() };
        Ok(())
    }

    /// 把矩阵写入已映射的常量缓冲
    pub fn update_constants(&mut self, matrix: &Matrf) {
        let bytes = bytemuck::bytes_of(matrix);
        // 映射在 drop 前一直有效，且大于一个矩阵
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), self.constant_data, bytes.len());
        }
    }

    /// 调整交换链和深度缓冲的大小
    ///
    /// 宽或高为 0（窗口最小化）时忽略
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            debug!(width, height, "Ignoring zero-sized resize");
            return Ok(());
        }
        if (width, height) == (self.width, self.height) {
            return Ok(());
        }

        self.flush()?;
        // ResizeBuffers 之前必须释放所有后台缓冲引用
        self.render_targets.clear();

        unsafe {
            self.swap_chain
                .ResizeBuffers(self.layout.buffer_count, width, height, BACK_BUFFER_FORMAT, DXGI_SWAP_CHAIN_FLAG(0))
                .hr_context(GraphicsError::SwapchainError, "IDXGISwapChain::ResizeBuffers")?;
        }

        self.render_targets =
            create_render_targets(&self.device, &self.swap_chain, &self.rtv_heap, &self.layout)?;
        self.depth_buffer = create_depth_buffer(&self.device, &self.dsv_heap, width, height)?;
        self.width = width;
        self.height = height;
        self.frame_index = unsafe { self.swap_chain.GetCurrentBackBufferIndex() };

        debug!(width, height, "Swap chain resized");
        Ok(())
    }
}

impl Drop for Dx12Core {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(error = %e, "Failed to flush GPU before shutdown");
        }

        unsafe {
            self.constant_buffer.Unmap(0, None);
            if let Err(e) = CloseHandle(self.fence_event) {
                warn!(error = %e, "Failed to close fence event");
            }
        }
        debug!("D3D12 resources released");
    }
}
