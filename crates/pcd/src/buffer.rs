//! 有界缓冲区操作
//!
//! 针对固定容量字节区的读、写、seek 原语。函数只计算并拷贝，
//! 返回新的位置信息，由调用方在成功后更新游标；失败时游标保持不变。

use uapi::fcntl::SeekWhence;

use crate::uaccess::{UserRead, UserWrite};
use crate::PcdError;

/// 从 `pos` 开始读取，最多读取 `dst.user_len()` 个字节
///
/// 实际读取 `min(请求长度, 容量 - pos)` 个字节；位于末尾时返回 0，不视为错误。
pub fn bounded_read<W>(buf: &[u8], pos: usize, dst: &mut W) -> Result<usize, PcdError>
where
    W: UserWrite + ?Sized,
{
    let remaining = buf.len().checked_sub(pos).ok_or(PcdError::InvalidArgument)?;
    let count = dst.user_len().min(remaining);
    dst.write_user(&buf[pos..pos + count])?;
    Ok(count)
}

/// 从 `pos` 开始写入，最多写入 `src.user_len()` 个字节
///
/// 实际写入 `min(请求长度, 容量 - pos)` 个字节；
/// 游标已位于容量末尾时返回 `OutOfSpace`。
pub fn bounded_write<R>(buf: &mut [u8], pos: usize, src: &R) -> Result<usize, PcdError>
where
    R: UserRead + ?Sized,
{
    let remaining = buf.len().checked_sub(pos).ok_or(PcdError::InvalidArgument)?;
    if remaining == 0 {
        return Err(PcdError::OutOfSpace);
    }
    let count = src.user_len().min(remaining);
    src.read_user(&mut buf[pos..pos + count])?;
    Ok(count)
}

/// 计算 seek 后的新位置
///
/// 新位置必须落在 `[0, capacity]` 内，否则返回 `InvalidArgument`。
pub fn seek(
    capacity: usize,
    pos: usize,
    offset: isize,
    whence: SeekWhence,
) -> Result<usize, PcdError> {
    let base = match whence {
        SeekWhence::Set => 0,
        SeekWhence::Cur => pos,
        SeekWhence::End => capacity,
    };
    let base = isize::try_from(base).map_err(|_| PcdError::InvalidArgument)?;
    let target = base
        .checked_add(offset)
        .ok_or(PcdError::InvalidArgument)?;

    match usize::try_from(target) {
        Ok(new_pos) if new_pos <= capacity => Ok(new_pos),
        _ => Err(PcdError::InvalidArgument),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    struct FaultyBuf {
        len: usize,
    }

    impl UserWrite for FaultyBuf {
        fn user_len(&self) -> usize {
            self.len
        }

        fn write_user(&mut self, _src: &[u8]) -> Result<(), PcdError> {
            Err(PcdError::BoundaryFault)
        }
    }

    impl UserRead for FaultyBuf {
        fn user_len(&self) -> usize {
            self.len
        }

        fn read_user(&self, _dst: &mut [u8]) -> Result<(), PcdError> {
            Err(PcdError::BoundaryFault)
        }
    }

    #[test]
    fn test_write_truncates_at_capacity() {
        let mut dev = vec![0u8; 512];
        let data = [0xABu8; 50];
        let n = bounded_write(&mut dev[..], 500, &data[..]).unwrap();
        assert_eq!(n, 12);
        assert!(dev[500..].iter().all(|&b| b == 0xAB));
        assert!(dev[..500].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_write_at_end_is_out_of_space() {
        let mut dev = vec![0u8; 512];
        let data = [1u8; 10];
        assert_eq!(
            bounded_write(&mut dev[..], 512, &data[..]),
            Err(PcdError::OutOfSpace)
        );
    }

    #[test]
    fn test_empty_write_below_capacity() {
        let mut dev = vec![0u8; 16];
        let data: [u8; 0] = [];
        assert_eq!(bounded_write(&mut dev[..], 3, &data[..]), Ok(0));
    }

    #[test]
    fn test_read_counts() {
        let dev: alloc::vec::Vec<u8> = (0..64u8).collect();
        for (pos, want, expect) in [(0, 10, 10), (60, 10, 4), (64, 10, 0), (0, 100, 64)] {
            let mut out = vec![0u8; want];
            let n = bounded_read(&dev[..], pos, &mut out[..]).unwrap();
            assert_eq!(n, expect, "pos={pos} want={want}");
            assert_eq!(&out[..n], &dev[pos..pos + n]);
        }
    }

    #[test]
    fn test_position_past_capacity_rejected() {
        let mut dev = vec![0u8; 8];
        let mut out = [0u8; 1];
        assert_eq!(
            bounded_read(&dev[..], 9, &mut out[..]),
            Err(PcdError::InvalidArgument)
        );
        assert_eq!(
            bounded_write(&mut dev[..], 9, &out[..]),
            Err(PcdError::InvalidArgument)
        );
    }

    #[test]
    fn test_copy_fault_reported() {
        let mut dev = vec![0u8; 8];
        let mut faulty = FaultyBuf { len: 4 };
        assert_eq!(
            bounded_read(&dev[..], 0, &mut faulty),
            Err(PcdError::BoundaryFault)
        );
        assert_eq!(
            bounded_write(&mut dev[..], 0, &faulty),
            Err(PcdError::BoundaryFault)
        );
    }

    #[test]
    fn test_seek_whence() {
        assert_eq!(seek(512, 0, 100, SeekWhence::Set), Ok(100));
        assert_eq!(seek(512, 100, 12, SeekWhence::Cur), Ok(112));
        assert_eq!(seek(512, 100, -100, SeekWhence::Cur), Ok(0));
        assert_eq!(seek(512, 7, -100, SeekWhence::End), Ok(412));
        assert_eq!(seek(512, 7, 0, SeekWhence::End), Ok(512));
    }

    #[test]
    fn test_seek_out_of_range() {
        assert_eq!(
            seek(512, 0, 600, SeekWhence::Set),
            Err(PcdError::InvalidArgument)
        );
        assert_eq!(
            seek(512, 0, -1, SeekWhence::Set),
            Err(PcdError::InvalidArgument)
        );
        assert_eq!(
            seek(512, 10, -11, SeekWhence::Cur),
            Err(PcdError::InvalidArgument)
        );
        assert_eq!(
            seek(512, 0, 1, SeekWhence::End),
            Err(PcdError::InvalidArgument)
        );
        assert_eq!(
            seek(512, 512, isize::MAX, SeekWhence::Cur),
            Err(PcdError::InvalidArgument)
        );
    }
}
