//! 文件操作分发
//!
//! 所有文件操作都经由 [`PcdDriver`] 分发：先根据打开文件解析出所属设备，
//! 再交给权限检查和有界缓冲区操作。
//!
//! 除逐项调用外，也可以通过统一的 [`PcdDriver::dispatch`] 入口提交 [`FileOp`]，
//! 每种操作对应一个变体。

use alloc::sync::Arc;

use uapi::fcntl::{OpenFlags, SeekWhence};

use crate::dev::{DevT, major, minor};
use crate::device::PcdDevice;
use crate::driver::PcdDriver;
use crate::file::PcdFile;
use crate::uaccess::{UserRead, UserWrite};
use crate::{PcdError, perm};

/// 文件操作请求
#[derive(Debug)]
pub enum FileOp<'a> {
    /// 打开设备
    Open {
        /// 设备号
        dev: DevT,
        /// 打开标志
        flags: OpenFlags,
    },
    /// 读取到 `buf`，请求长度即 `buf.len()`
    Read {
        /// 打开的文件
        file: &'a PcdFile,
        /// 目标缓冲区
        buf: &'a mut [u8],
    },
    /// 写入 `buf`
    Write {
        /// 打开的文件
        file: &'a PcdFile,
        /// 源缓冲区
        buf: &'a [u8],
    },
    /// 移动游标，`whence` 为原始的 SEEK_SET / SEEK_CUR / SEEK_END 值
    Seek {
        /// 打开的文件
        file: &'a PcdFile,
        /// 偏移量
        offset: isize,
        /// 起点
        whence: usize,
    },
    /// 释放文件
    Release {
        /// 打开的文件
        file: &'a PcdFile,
    },
}

/// 文件操作结果
#[derive(Debug)]
pub enum FileOpResult {
    /// 打开成功
    Opened(PcdFile),
    /// 实际读取或写入的字节数
    Count(usize),
    /// seek 后的绝对位置
    Offset(usize),
    /// 已释放
    Released,
}

impl FileOpResult {
    /// 取出打开的文件
    pub fn into_file(self) -> Option<PcdFile> {
        match self {
            FileOpResult::Opened(file) => Some(file),
            _ => None,
        }
    }
}

impl PcdDriver {
    /// 打开设备
    ///
    /// 设备号未知时返回 `NotFound`，访问模式不被设备权限允许时返回 `PermissionDenied`。
    /// 打开不会触碰设备缓冲区。
    pub fn open(&self, dev: DevT, flags: OpenFlags) -> Result<PcdFile, PcdError> {
        let Some(device) = self.device(dev) else {
            log::warn!("pcd: open of unknown device <{}:{}>", major(dev), minor(dev));
            return Err(PcdError::NotFound);
        };

        perm::check_open(device.perm(), flags).inspect_err(|e| {
            log::warn!(
                "pcd: open of {} with {:?} refused: {}",
                device.name(),
                flags,
                e
            )
        })?;

        log::info!("pcd: open of {} was successful", device.name());
        Ok(PcdFile::new(device, flags))
    }

    /// 读取到 `dst`，返回实际读取的字节数
    pub fn read<W: UserWrite + ?Sized>(
        &self,
        file: &PcdFile,
        dst: &mut W,
    ) -> Result<usize, PcdError> {
        self.resolve(file)?;
        file.read(dst)
    }

    /// 写入 `src`，返回实际写入的字节数
    pub fn write<R: UserRead + ?Sized>(&self, file: &PcdFile, src: &R) -> Result<usize, PcdError> {
        self.resolve(file)?;
        file.write(src)
    }

    /// 移动游标，返回新的绝对位置
    pub fn lseek(
        &self,
        file: &PcdFile,
        offset: isize,
        whence: SeekWhence,
    ) -> Result<usize, PcdError> {
        self.resolve(file)?;
        file.lseek(offset, whence)
    }

    /// 释放文件，总是成功
    pub fn release(&self, file: &PcdFile) {
        file.release();
    }

    /// 统一分发入口
    pub fn dispatch(&self, op: FileOp<'_>) -> Result<FileOpResult, PcdError> {
        match op {
            FileOp::Open { dev, flags } => self.open(dev, flags).map(FileOpResult::Opened),
            FileOp::Read { file, buf } => self.read(file, buf).map(FileOpResult::Count),
            FileOp::Write { file, buf } => self.write(file, buf).map(FileOpResult::Count),
            FileOp::Seek {
                file,
                offset,
                whence,
            } => {
                let whence = SeekWhence::try_from(whence).map_err(|_| PcdError::InvalidArgument)?;
                self.lseek(file, offset, whence).map(FileOpResult::Offset)
            }
            FileOp::Release { file } => {
                self.release(file);
                Ok(FileOpResult::Released)
            }
        }
    }

    /// 确认文件属于本驱动当前的设备表
    ///
    /// 设备已注销，或设备号已被重新初始化的设备复用时，返回 `NotFound`。
    fn resolve(&self, file: &PcdFile) -> Result<&Arc<PcdDevice>, PcdError> {
        self.device(file.devt())
            .filter(|device| file.is_backed_by(device))
            .ok_or(PcdError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_devices;
    use crate::sys_registry::SysRegistry;
    use crate::test_utils;

    fn started() -> PcdDriver {
        test_utils::init();
        let mut drv = PcdDriver::new(Arc::new(SysRegistry::new()));
        drv.init(&default_devices()).unwrap();
        drv
    }

    #[test]
    fn test_open_unknown_device() {
        let drv = started();
        let base = drv.base_devt().unwrap();
        assert_eq!(
            drv.open(base + 4, OpenFlags::O_RDONLY).err(),
            Some(PcdError::NotFound)
        );
    }

    #[test]
    fn test_open_on_stopped_driver() {
        test_utils::init();
        let drv = PcdDriver::new(Arc::new(SysRegistry::new()));
        assert_eq!(
            drv.open(crate::dev::makedev(254, 0), OpenFlags::O_RDONLY)
                .err(),
            Some(PcdError::NotFound)
        );
    }

    #[test]
    fn test_open_permission_matrix() {
        let drv = started();
        let modes = [OpenFlags::O_RDONLY, OpenFlags::O_WRONLY, OpenFlags::O_RDWR];
        // pcdev-1 只读，pcdev-2 只写，pcdev-3/4 读写
        let allowed = [
            [true, false, false],
            [false, true, false],
            [true, true, true],
            [true, true, true],
        ];
        for (i, row) in allowed.iter().enumerate() {
            let dev = drv.devt(i).unwrap();
            for (mode, &ok) in modes.iter().zip(row) {
                let res = drv.open(dev, *mode);
                if ok {
                    assert!(res.is_ok(), "pcdev-{} {:?}", i + 1, mode);
                } else {
                    assert_eq!(res.err(), Some(PcdError::PermissionDenied));
                }
            }
        }
        // 失败的 open 不留下打开计数
        assert!(drv.devices().all(|d| d.open_count() == 0));
    }

    #[test]
    fn test_open_invalid_accmode() {
        let drv = started();
        let dev = drv.devt(2).unwrap();
        assert_eq!(
            drv.open(dev, OpenFlags::O_ACCMODE).err(),
            Some(PcdError::InvalidArgument)
        );
    }

    #[test]
    fn test_dispatch_roundtrip() {
        let drv = started();
        let dev = drv.devt(3).unwrap();

        let file = drv
            .dispatch(FileOp::Open {
                dev,
                flags: OpenFlags::O_RDWR,
            })
            .unwrap()
            .into_file()
            .unwrap();

        let res = drv
            .dispatch(FileOp::Write {
                file: &file,
                buf: b"pcdev",
            })
            .unwrap();
        assert!(matches!(res, FileOpResult::Count(5)));

        let res = drv
            .dispatch(FileOp::Seek {
                file: &file,
                offset: -5,
                whence: 1,
            })
            .unwrap();
        assert!(matches!(res, FileOpResult::Offset(0)));

        let mut out = [0u8; 5];
        let res = drv
            .dispatch(FileOp::Read {
                file: &file,
                buf: &mut out,
            })
            .unwrap();
        assert!(matches!(res, FileOpResult::Count(5)));
        assert_eq!(&out, b"pcdev");

        let res = drv.dispatch(FileOp::Release { file: &file }).unwrap();
        assert!(matches!(res, FileOpResult::Released));
        let res = drv.dispatch(FileOp::Release { file: &file }).unwrap();
        assert!(matches!(res, FileOpResult::Released));
    }

    #[test]
    fn test_dispatch_unknown_whence() {
        let drv = started();
        let file = drv.open(drv.devt(2).unwrap(), OpenFlags::O_RDWR).unwrap();
        drv.lseek(&file, 10, SeekWhence::Set).unwrap();
        let res = drv.dispatch(FileOp::Seek {
            file: &file,
            offset: 0,
            whence: 3,
        });
        assert_eq!(res.err().map(|e| e.to_errno()), Some(-22));
        assert_eq!(file.offset(), 10);
    }

    #[test]
    fn test_stale_file_after_reinit() {
        test_utils::init();
        let mut drv = PcdDriver::new(Arc::new(SysRegistry::new()));
        drv.init(&default_devices()).unwrap();
        let dev = drv.devt(2).unwrap();
        let file = drv.open(dev, OpenFlags::O_RDWR).unwrap();

        drv.shutdown();
        drv.init(&default_devices()).unwrap();
        // 重新初始化复用了同一个设备号
        assert_eq!(drv.devt(2), Some(dev));

        assert_eq!(drv.write(&file, &b"x"[..]), Err(PcdError::NotFound));
        assert!(drv.device(dev).unwrap().raw_data().iter().all(|&b| b == 0));
        drv.release(&file);
    }
}
