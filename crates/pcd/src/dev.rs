//! 设备号编码
//!
//! 采用内核内部的 `dev_t` 布局：高 12 位为 major，低 20 位为 minor。

/// 设备号
pub type DevT = u64;

/// minor 号占用的位数
pub const MINOR_BITS: u32 = 20;
/// minor 号掩码
pub const MINOR_MASK: u64 = (1 << MINOR_BITS) - 1;
/// major 号的最大值（12 位）
pub const MAX_MAJOR: u32 = (1 << 12) - 1;

/// 由 major 和 minor 组合出设备号
#[inline]
pub const fn makedev(major: u32, minor: u32) -> DevT {
    ((major as u64) << MINOR_BITS) | (minor as u64 & MINOR_MASK)
}

/// 提取 major 号
#[inline]
pub const fn major(dev: DevT) -> u32 {
    (dev >> MINOR_BITS) as u32
}

/// 提取 minor 号
#[inline]
pub const fn minor(dev: DevT) -> u32 {
    (dev & MINOR_MASK) as u32
}
