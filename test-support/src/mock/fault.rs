//! 故障注入点
//!
//! 用于在测试中让第 N 次调用失败，例如让注册流程在第 k 个设备处出错。

use core::sync::atomic::{AtomicUsize, Ordering};

/// 未布防
const DISARMED: usize = usize::MAX;

/// 故障注入点
///
/// `arm(n)` 之后，第 `n` 次（从 0 开始计数）`hit()` 返回 true，
/// 其余调用均返回 false。
pub struct FailPoint {
    hits: AtomicUsize,
    fail_at: AtomicUsize,
}

impl FailPoint {
    pub const fn new() -> Self {
        Self {
            hits: AtomicUsize::new(0),
            fail_at: AtomicUsize::new(DISARMED),
        }
    }

    /// 让第 `nth` 次调用失败，并清零计数
    pub fn arm(&self, nth: usize) {
        self.hits.store(0, Ordering::SeqCst);
        self.fail_at.store(nth, Ordering::SeqCst);
    }

    /// 撤销布防
    pub fn disarm(&self) {
        self.fail_at.store(DISARMED, Ordering::SeqCst);
    }

    /// 记录一次调用，返回本次是否应当失败
    pub fn hit(&self) -> bool {
        let n = self.hits.fetch_add(1, Ordering::SeqCst);
        n == self.fail_at.load(Ordering::SeqCst)
    }

    /// 已记录的调用次数
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Default for FailPoint {
    fn default() -> Self {
        Self::new()
    }
}
