//! 读写自旋锁
//!
//! 基于 `lock_api` 的读写锁：多个读者可并发持有，写者独占。
//! 不关中断，只能用于非中断上下文中读多写少的数据（例如设备命名空间）。

use core::hint;
use core::sync::atomic::{AtomicUsize, Ordering};

use lock_api::{GuardSend, RawRwLock};

/// 写者占用标志（最低位）
const WRITER: usize = 1;
/// 每个读者在计数中占用的步长
const READER: usize = 2;

/// 原始读写自旋锁
///
/// 状态字：最低位表示写者，其余位为读者计数。
pub struct RawSpinRwLock {
    state: AtomicUsize,
}

unsafe impl RawRwLock for RawSpinRwLock {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = RawSpinRwLock {
        state: AtomicUsize::new(0),
    };

    type GuardMarker = GuardSend;

    fn lock_shared(&self) {
        while !self.try_lock_shared() {
            hint::spin_loop();
        }
    }

    fn try_lock_shared(&self) -> bool {
        let state = self.state.load(Ordering::Relaxed);
        if state & WRITER != 0 {
            return false;
        }
        self.state
            .compare_exchange(state, state + READER, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    unsafe fn unlock_shared(&self) {
        self.state.fetch_sub(READER, Ordering::Release);
    }

    fn lock_exclusive(&self) {
        while !self.try_lock_exclusive() {
            hint::spin_loop();
        }
    }

    fn try_lock_exclusive(&self) -> bool {
        self.state
            .compare_exchange(0, WRITER, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    unsafe fn unlock_exclusive(&self) {
        self.state.fetch_and(!WRITER, Ordering::Release);
    }

    fn is_locked(&self) -> bool {
        self.state.load(Ordering::Relaxed) != 0
    }
}

/// 读写自旋锁
pub type RwLock<T> = lock_api::RwLock<RawSpinRwLock, T>;
/// 读锁保护器
pub type RwLockReadGuard<'a, T> = lock_api::RwLockReadGuard<'a, RawSpinRwLock, T>;
/// 写锁保护器
pub type RwLockWriteGuard<'a, T> = lock_api::RwLockWriteGuard<'a, RawSpinRwLock, T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readers_share_writer_excludes() {
        let lock = RwLock::new(5u32);
        {
            let r1 = lock.read();
            let r2 = lock.read();
            assert_eq!(*r1 + *r2, 10);
            assert!(lock.try_write().is_none());
        }
        {
            let mut w = lock.write();
            *w = 6;
            assert!(lock.try_read().is_none());
        }
        assert_eq!(*lock.read(), 6);
        assert!(!lock.is_locked());
    }
}
