//! 调用方缓冲区访问
//!
//! 设备与调用方之间的数据拷贝统一经过 [`UserWrite`] / [`UserRead`]。
//! 拷贝失败对应内核中 `copy_to_user` / `copy_from_user` 的失败，
//! 驱动将其报告为 [`PcdError::BoundaryFault`]。

use crate::PcdError;

/// 可写入的调用方缓冲区（读操作的目标）
pub trait UserWrite {
    /// 缓冲区长度，即本次请求读取的字节数
    fn user_len(&self) -> usize;

    /// 将 `src` 拷贝到缓冲区开头，`src.len()` 不超过 [`user_len`](Self::user_len)
    fn write_user(&mut self, src: &[u8]) -> Result<(), PcdError>;
}

/// 可读取的调用方缓冲区（写操作的来源）
pub trait UserRead {
    /// 缓冲区长度，即本次请求写入的字节数
    fn user_len(&self) -> usize;

    /// 将缓冲区开头的 `dst.len()` 个字节拷贝到 `dst`
    fn read_user(&self, dst: &mut [u8]) -> Result<(), PcdError>;
}

impl UserWrite for [u8] {
    fn user_len(&self) -> usize {
        self.len()
    }

    fn write_user(&mut self, src: &[u8]) -> Result<(), PcdError> {
        self.get_mut(..src.len())
            .ok_or(PcdError::BoundaryFault)?
            .copy_from_slice(src);
        Ok(())
    }
}

impl UserRead for [u8] {
    fn user_len(&self) -> usize {
        self.len()
    }

    fn read_user(&self, dst: &mut [u8]) -> Result<(), PcdError> {
        let src = self.get(..dst.len()).ok_or(PcdError::BoundaryFault)?;
        dst.copy_from_slice(src);
        Ok(())
    }
}
