//! 打开的设备文件
//!
//! [`PcdFile`] 对应一次成功的 open：记录访问模式与读写游标，
//! 并以弱引用指向设备，从不拥有设备本身。

use alloc::sync::{Arc, Weak};

use sync::SpinLock;
use uapi::fcntl::{OpenFlags, SeekWhence};

use crate::buffer;
use crate::dev::{DevT, major, minor};
use crate::device::PcdDevice;
use crate::uaccess::{UserRead, UserWrite};
use crate::PcdError;

/// 打开文件的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// 已打开，可进行读写和 seek
    Open,
    /// 已释放
    Closed,
}

#[derive(Debug)]
struct Cursor {
    pos: usize,
    state: FileState,
}

impl Cursor {
    fn ensure_open(&self) -> Result<(), PcdError> {
        match self.state {
            FileState::Open => Ok(()),
            FileState::Closed => Err(PcdError::BadFileDescriptor),
        }
    }
}

/// 伪设备文件
///
/// 游标满足 `0 <= pos <= capacity`；任何会破坏该约束的操作都被拒绝且不修改游标。
/// 读写时先锁游标再锁设备缓冲区，拷贝与游标推进在同一临界区内完成。
pub struct PcdFile {
    /// 设备号
    dev: DevT,

    /// 关联设备（弱引用）
    device: Weak<PcdDevice>,

    /// 打开标志位
    flags: OpenFlags,

    /// 读写游标与状态
    cursor: SpinLock<Cursor>,
}

impl PcdFile {
    pub(crate) fn new(device: &Arc<PcdDevice>, flags: OpenFlags) -> Self {
        device.get_file();
        Self {
            dev: device.devt(),
            device: Arc::downgrade(device),
            flags,
            cursor: SpinLock::new(Cursor {
                pos: 0,
                state: FileState::Open,
            }),
        }
    }

    fn device(&self) -> Result<Arc<PcdDevice>, PcdError> {
        self.device.upgrade().ok_or(PcdError::NotFound)
    }

    /// 是否指向 `device` 这个设备实例
    pub(crate) fn is_backed_by(&self, device: &Arc<PcdDevice>) -> bool {
        core::ptr::eq(self.device.as_ptr(), Arc::as_ptr(device))
    }

    /// 设备号
    pub fn devt(&self) -> DevT {
        self.dev
    }

    /// 打开标志
    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    /// 是否以可读模式打开
    pub fn readable(&self) -> bool {
        self.flags.readable()
    }

    /// 是否以可写模式打开
    pub fn writable(&self) -> bool {
        self.flags.writable()
    }

    /// 当前偏移量
    pub fn offset(&self) -> usize {
        self.cursor.lock().pos
    }

    /// 当前状态
    pub fn state(&self) -> FileState {
        self.cursor.lock().state
    }

    /// 是否仍处于打开状态
    pub fn is_open(&self) -> bool {
        self.state() == FileState::Open
    }

    /// 从当前位置读取，最多读取 `dst.user_len()` 个字节
    pub fn read<W: UserWrite + ?Sized>(&self, dst: &mut W) -> Result<usize, PcdError> {
        let mut cursor = self.cursor.lock();
        cursor.ensure_open()?;
        if !self.readable() {
            return Err(PcdError::BadFileDescriptor);
        }
        let device = self.device()?;

        log::debug!(
            "pcd: read requested for {} bytes at {} on <{}:{}>",
            dst.user_len(),
            cursor.pos,
            major(self.dev),
            minor(self.dev)
        );

        let count = {
            let buf = device.buffer().lock();
            buffer::bounded_read(&buf, cursor.pos, dst)?
        };
        cursor.pos += count;

        log::debug!("pcd: {} bytes read, position now {}", count, cursor.pos);
        Ok(count)
    }

    /// 从当前位置写入，最多写入 `src.user_len()` 个字节
    pub fn write<R: UserRead + ?Sized>(&self, src: &R) -> Result<usize, PcdError> {
        let mut cursor = self.cursor.lock();
        cursor.ensure_open()?;
        if !self.writable() {
            return Err(PcdError::BadFileDescriptor);
        }
        let device = self.device()?;

        log::debug!(
            "pcd: write requested for {} bytes at {} on <{}:{}>",
            src.user_len(),
            cursor.pos,
            major(self.dev),
            minor(self.dev)
        );

        let count = {
            let mut buf = device.buffer().lock();
            buffer::bounded_write(&mut buf, cursor.pos, src)
                .inspect_err(|e| {
                    if *e == PcdError::OutOfSpace {
                        log::error!("pcd: no space left on {}", device.name());
                    }
                })?
        };
        cursor.pos += count;

        log::debug!("pcd: {} bytes written, position now {}", count, cursor.pos);
        Ok(count)
    }

    /// 移动游标，返回新的绝对位置
    pub fn lseek(&self, offset: isize, whence: SeekWhence) -> Result<usize, PcdError> {
        let mut cursor = self.cursor.lock();
        cursor.ensure_open()?;
        let device = self.device()?;

        let new_pos = buffer::seek(device.capacity(), cursor.pos, offset, whence)?;
        log::debug!(
            "pcd: lseek {:?} {} moves position {} -> {}",
            whence,
            offset,
            cursor.pos,
            new_pos
        );
        cursor.pos = new_pos;
        Ok(new_pos)
    }

    /// 释放文件，重复释放不做任何事
    pub fn release(&self) {
        let mut cursor = self.cursor.lock();
        if cursor.state == FileState::Closed {
            return;
        }
        cursor.state = FileState::Closed;
        if let Some(device) = self.device.upgrade() {
            device.put_file();
        }
        log::debug!("pcd: release of <{}:{}>", major(self.dev), minor(self.dev));
    }
}

impl Drop for PcdFile {
    fn drop(&mut self) {
        self.release();
    }
}

impl core::fmt::Debug for PcdFile {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PcdFile")
            .field("dev", &self.dev)
            .field("flags", &self.flags)
            .field("cursor", &*self.cursor.lock())
            .finish()
    }
}
