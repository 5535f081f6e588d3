//! 架构相关操作的 Mock 实现

use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// 模拟的中断使能位
const INTR_ENABLE_BIT: usize = 0x2;

/// Mock 架构操作
///
/// 用一个原子布尔值模拟本地中断开关，并统计关中断次数。
pub struct MockArchOps {
    pub interrupt_state: AtomicBool,
    pub disable_count: AtomicUsize,
}

impl MockArchOps {
    pub const fn new() -> Self {
        Self {
            interrupt_state: AtomicBool::new(true),
            disable_count: AtomicUsize::new(0),
        }
    }

    pub unsafe fn read_and_disable_interrupts(&self) -> usize {
        self.disable_count.fetch_add(1, Ordering::Relaxed);
        if self.interrupt_state.swap(false, Ordering::SeqCst) {
            INTR_ENABLE_BIT
        } else {
            0
        }
    }

    pub unsafe fn restore_interrupts(&self, flags: usize) {
        self.interrupt_state
            .store(flags & INTR_ENABLE_BIT != 0, Ordering::SeqCst);
    }

    pub fn interrupt_enable_bit(&self) -> usize {
        INTR_ENABLE_BIT
    }

    /// 累计关中断次数（每次获取自旋锁都会关一次）
    pub fn disable_count(&self) -> usize {
        self.disable_count.load(Ordering::Relaxed)
    }
}

/// 全局 Mock 实例
pub static MOCK_ARCH_OPS: MockArchOps = MockArchOps::new();
