//! 驱动配置
//!
//! 包括编译期常量（设备数量、各设备容量、注册名称）与每个设备的静态配置。
//! 设备表既可以直接构造，也可以从启动命令行风格的字符串解析：
//!
//! ```text
//! 1024:ro:PCDEV1XYZ123,512:wo:PCDEV2XYZ123
//! ```

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::str::FromStr;

use lazy_static::lazy_static;

use crate::{DevPerm, RegistryError};

/// 默认设备数量
pub const NO_OF_DEVICES: usize = 4;

/// pcdev-1 的缓冲区容量
pub const MEM_SIZE_MAX_PCDEV1: usize = 1024;
/// pcdev-2 的缓冲区容量
pub const MEM_SIZE_MAX_PCDEV2: usize = 512;
/// pcdev-3 的缓冲区容量
pub const MEM_SIZE_MAX_PCDEV3: usize = 1024;
/// pcdev-4 的缓冲区容量
pub const MEM_SIZE_MAX_PCDEV4: usize = 512;

/// 设备号区间名称
pub const PCD_REGION_NAME: &str = "pcdevs";
/// 设备类名称
pub const PCD_CLASS_NAME: &str = "pcd_class";
/// 设备节点名前缀，节点名为 `pcdev-<序号>`，序号从 1 开始
pub const PCD_NODE_PREFIX: &str = "pcdev-";

/// 单个设备的静态配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// 缓冲区容量（字节）
    pub capacity: usize,
    /// 权限类
    pub perm: DevPerm,
    /// 序列号，仅用于标识
    pub serial_number: String,
}

impl DeviceConfig {
    /// 创建设备配置
    pub fn new(capacity: usize, perm: DevPerm, serial_number: &str) -> Self {
        Self {
            capacity,
            perm,
            serial_number: serial_number.to_string(),
        }
    }

    /// 检查配置是否合法：容量为正，权限为三种权限类之一
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.capacity == 0 || !self.perm.is_valid() {
            return Err(RegistryError::InvalidConfig);
        }
        Ok(())
    }

    /// 解析以逗号分隔的设备表，空白项被忽略
    pub fn parse_list(s: &str) -> Result<Vec<DeviceConfig>, RegistryError> {
        s.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(DeviceConfig::from_str)
            .collect()
    }
}

impl FromStr for DeviceConfig {
    type Err = RegistryError;

    /// 格式为 `<容量>:<ro|wo|rw>:<序列号>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(3, ':');
        let capacity = parts
            .next()
            .and_then(|c| c.trim().parse::<usize>().ok())
            .ok_or(RegistryError::InvalidConfig)?;
        let perm = parts
            .next()
            .and_then(|p| DevPerm::from_token(p.trim()))
            .ok_or(RegistryError::InvalidConfig)?;
        let serial_number = parts.next().map(str::trim).unwrap_or_default();

        let config = DeviceConfig::new(capacity, perm, serial_number);
        config.validate()?;
        Ok(config)
    }
}

lazy_static! {
    /// 默认的四个参考设备
    pub static ref DEFAULT_DEVICES: Vec<DeviceConfig> = alloc::vec![
        DeviceConfig::new(MEM_SIZE_MAX_PCDEV1, DevPerm::RDONLY, "PCDEV1XYZ123"),
        DeviceConfig::new(MEM_SIZE_MAX_PCDEV2, DevPerm::WRONLY, "PCDEV2XYZ123"),
        DeviceConfig::new(MEM_SIZE_MAX_PCDEV3, DevPerm::RDWR, "PCDEV3XYZ123"),
        DeviceConfig::new(MEM_SIZE_MAX_PCDEV4, DevPerm::RDWR, "PCDEV4XYZ123"),
    ];
}

/// 获取默认设备表的副本
pub fn default_devices() -> Vec<DeviceConfig> {
    DEFAULT_DEVICES.clone()
}
