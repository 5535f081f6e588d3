//! 内存伪设备

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use sync::SpinLock;

use crate::config::{DeviceConfig, PCD_NODE_PREFIX};
use crate::dev::DevT;
use crate::{DevPerm, RegistryError};

/// 由固定容量内存缓冲区支撑的伪字符设备
///
/// 除缓冲区内容外，设备在创建后不再改变。缓冲区由自旋锁保护，
/// 同一设备上的所有打开文件在拷贝数据和推进游标时都持有该锁。
pub struct PcdDevice {
    /// 设备号
    devt: DevT,

    /// 在设备表中的下标
    index: usize,

    /// 发布的节点名
    name: String,

    /// 序列号
    serial_number: String,

    /// 权限类
    perm: DevPerm,

    /// 缓冲区容量
    capacity: usize,

    /// 存储数据，长度恒等于容量
    buffer: SpinLock<Box<[u8]>>,

    /// 当前打开的文件数
    open_count: AtomicUsize,
}

impl PcdDevice {
    /// 按配置创建设备，缓冲区清零
    ///
    /// 缓冲区分配失败时返回 `OutOfMemory`。
    pub fn new(index: usize, devt: DevT, config: &DeviceConfig) -> Result<Self, RegistryError> {
        config.validate()?;

        let mut data = Vec::new();
        data.try_reserve_exact(config.capacity)
            .map_err(|_| RegistryError::OutOfMemory)?;
        data.resize(config.capacity, 0u8);

        Ok(Self {
            devt,
            index,
            name: format!("{}{}", PCD_NODE_PREFIX, index + 1),
            serial_number: config.serial_number.clone(),
            perm: config.perm,
            capacity: config.capacity,
            buffer: SpinLock::new(data.into_boxed_slice()),
            open_count: AtomicUsize::new(0),
        })
    }

    /// 设备号
    pub fn devt(&self) -> DevT {
        self.devt
    }

    /// 在设备表中的下标
    pub fn index(&self) -> usize {
        self.index
    }

    /// 节点名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 序列号
    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    /// 权限类
    pub fn perm(&self) -> DevPerm {
        self.perm
    }

    /// 缓冲区容量
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 当前打开的文件数
    pub fn open_count(&self) -> usize {
        self.open_count.load(Ordering::Acquire)
    }

    /// 获取缓冲区内容的副本（用于调试）
    pub fn raw_data(&self) -> Vec<u8> {
        self.buffer.lock().to_vec()
    }

    pub(crate) fn buffer(&self) -> &SpinLock<Box<[u8]>> {
        &self.buffer
    }

    pub(crate) fn get_file(&self) {
        self.open_count.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn put_file(&self) {
        self.open_count.fetch_sub(1, Ordering::AcqRel);
    }
}

impl core::fmt::Debug for PcdDevice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PcdDevice")
            .field("devt", &self.devt)
            .field("name", &self.name)
            .field("serial_number", &self.serial_number)
            .field("perm", &self.perm)
            .field("capacity", &self.capacity)
            .field("open_count", &self.open_count())
            .finish()
    }
}
