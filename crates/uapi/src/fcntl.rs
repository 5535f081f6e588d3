//! 文件打开标志与 seek 起点定义

use bitflags::bitflags;

use crate::errno::EINVAL;

bitflags! {
    /// open(2) 标志位
    ///
    /// 只保留访问模式相关的位；`O_RDONLY` 数值为 0，判断访问模式时必须先与
    /// `O_ACCMODE` 取掩码，不能使用 `contains`。
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        const O_RDONLY = 0o0;
        const O_WRONLY = 0o1;
        const O_RDWR = 0o2;
        const O_ACCMODE = 0o3;
        const O_NONBLOCK = 0o4000;
    }
}

impl OpenFlags {
    /// 访问模式位（`flags & O_ACCMODE`）
    #[inline]
    pub fn access_mode(&self) -> u32 {
        self.bits() & Self::O_ACCMODE.bits()
    }

    /// 访问模式是否合法（`O_ACCMODE` 全置位不是合法的访问模式）
    #[inline]
    pub fn has_valid_access_mode(&self) -> bool {
        self.access_mode() != Self::O_ACCMODE.bits()
    }

    /// 以该标志打开的文件是否可读
    #[inline]
    pub fn readable(&self) -> bool {
        let mode = self.access_mode();
        mode == Self::O_RDONLY.bits() || mode == Self::O_RDWR.bits()
    }

    /// 以该标志打开的文件是否可写
    #[inline]
    pub fn writable(&self) -> bool {
        let mode = self.access_mode();
        mode == Self::O_WRONLY.bits() || mode == Self::O_RDWR.bits()
    }
}

/// lseek(2) 的起点
#[repr(usize)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekWhence {
    /// 从文件开头计算 (SEEK_SET)
    Set = 0,
    /// 从当前位置计算 (SEEK_CUR)
    Cur = 1,
    /// 从文件末尾计算 (SEEK_END)
    End = 2,
}

impl TryFrom<usize> for SeekWhence {
    type Error = i32;

    /// 未知的 whence 返回 `EINVAL`
    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SeekWhence::Set),
            1 => Ok(SeekWhence::Cur),
            2 => Ok(SeekWhence::End),
            _ => Err(EINVAL),
        }
    }
}
