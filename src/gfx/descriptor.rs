//! 描述符堆布局
//!
//! 启动时创建三个描述符堆，本模块只描述它们的大小和各槽位的用途，
//! 与具体图形 API 无关，可在任意平台上测试。
//!
//! | 堆 | 数量 | 槽位 |
//! |---|---|---|
//! | RTV | 后台缓冲数 + 1 | `0..buffer_count` 依次对应后台缓冲，最后一个预留 |
//! | DSV | 2 | [`DEPTH_SLOT`] 为深度缓冲 |
//! | CBV/SRV/UAV | 2（着色器可见） | [`CONSTANTS_SLOT`] 为每帧常量 |

/// 深度缓冲视图所在的 DSV 槽位
pub const DEPTH_SLOT: u32 = 0;

/// 常量缓冲视图所在的 CBV/SRV/UAV 槽位
pub const CONSTANTS_SLOT: u32 = 0;

/// 描述符堆种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapKind {
    /// 渲染目标视图
    Rtv,
    /// 深度模板视图
    Dsv,
    /// 常量缓冲 / 着色器资源 / 无序访问视图
    CbvSrvUav,
}

impl HeapKind {
    /// 调试名称（设置到堆对象上）
    pub fn name(&self) -> &'static str {
        match self {
            HeapKind::Rtv => "RTV Heap",
            HeapKind::Dsv => "DSV Heap",
            HeapKind::CbvSrvUav => "CBV/SRV/UAV Heap",
        }
    }

    /// 只有 CBV/SRV/UAV 堆需要对着色器可见
    pub fn shader_visible(&self) -> bool {
        matches!(self, HeapKind::CbvSrvUav)
    }
}

/// 单个描述符堆的种类和容量
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapSpec {
    pub kind: HeapKind,
    pub count: u32,
}

/// 启动时创建的三个堆
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapLayout {
    pub buffer_count: u32,
    pub rtv: HeapSpec,
    pub dsv: HeapSpec,
    pub cbv_srv_uav: HeapSpec,
}

impl HeapLayout {
    /// 为拥有 `buffer_count` 个后台缓冲的交换链计算堆布局
    pub fn for_buffers(buffer_count: u32) -> Self {
        Self {
            buffer_count,
            rtv: HeapSpec { kind: HeapKind::Rtv, count: buffer_count + 1 },
            dsv: HeapSpec { kind: HeapKind::Dsv, count: 2 },
            cbv_srv_uav: HeapSpec { kind: HeapKind::CbvSrvUav, count: 2 },
        }
    }

    /// 第 `frame` 个后台缓冲的 RTV 槽位
    ///
    /// # 返回值
    ///
    /// `frame` 超出后台缓冲数量时返回 `None`
    pub fn back_buffer_slot(&self, frame: u32) -> Option<u32> {
        (frame < self.buffer_count).then_some(frame)
    }
}

/// 槽位对应的 CPU 句柄地址
///
/// # 参数
///
/// * `start` - 堆起始句柄
/// * `slot` - 槽位索引
/// * `increment` - 设备报告的描述符增量大小
pub fn slot_address(start: usize, slot: u32, increment: u32) -> usize {
    start + slot as usize * increment as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_sizes() {
        let layout = HeapLayout::for_buffers(2);
        assert_eq!(layout.rtv.count, 3);
        assert_eq!(layout.dsv.count, 2);
        assert_eq!(layout.cbv_srv_uav.count, 2);
        assert_eq!(HeapLayout::for_buffers(3).rtv.count, 4);
    }

    #[test]
    fn test_only_cbv_heap_is_shader_visible() {
        let layout = HeapLayout::for_buffers(2);
        assert!(!layout.rtv.kind.shader_visible());
        assert!(!layout.dsv.kind.shader_visible());
        assert!(layout.cbv_srv_uav.kind.shader_visible());
        assert_eq!(layout.cbv_srv_uav.kind.name(), "CBV/SRV/UAV Heap");
    }

    #[test]
    fn test_back_buffer_slots_fit_rtv_heap() {
        for buffers in 2..=3 {
            let layout = HeapLayout::for_buffers(buffers);
            let slots: Vec<u32> = (0..buffers)
                .map(|frame| layout.back_buffer_slot(frame).expect("slot for every back buffer"))
                .collect();

            assert!(slots.iter().all(|&slot| slot < layout.rtv.count));
            // 槽位互不相同
            let mut unique = slots.clone();
            unique.dedup();
            assert_eq!(unique.len(), slots.len());

            assert_eq!(layout.back_buffer_slot(buffers), None);
        }
    }

    #[test]
    fn test_fixed_slots_fit_their_heaps() {
        let layout = HeapLayout::for_buffers(2);
        assert!(DEPTH_SLOT < layout.dsv.count);
        assert!(CONSTANTS_SLOT < layout.cbv_srv_uav.count);
    }

    #[test]
    fn test_slot_address() {
        assert_eq!(slot_address(0x4000, 0, 64), 0x4000);
        assert_eq!(slot_address(0x4000, 3, 64), 0x4000 + 192);
    }
}
