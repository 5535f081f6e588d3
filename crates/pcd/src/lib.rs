//! 伪字符设备驱动
//!
//! 此 crate 在一个驱动实例下管理多个以内存为后端的伪字符设备：
//!
//! - [`PcdDriver`] - 驱动生命周期：按设备表注册全部设备，失败时整体回滚
//! - [`PcdFile`] - 一次成功 open 得到的文件，带有读写游标
//! - [`DevPerm`] - 设备权限与打开检查
//! - [`DeviceRegistry`] - 驱动依赖的外部注册接口，[`SysRegistry`] 为其内存实现
//! - [`FileOp`] - 统一的文件操作分发入口
//!
//! # 架构依赖
//!
//! 设备缓冲区和游标由 `sync` 的自旋锁保护，使用前宿主必须先调用
//! [`sync::register_arch_ops`] 注册架构操作。

#![no_std]

extern crate alloc;

pub mod buffer;
pub mod config;
pub mod dev;
pub mod device;
pub mod driver;
pub mod error;
pub mod file;
pub mod ops;
pub mod perm;
pub mod registry;
pub mod sys_registry;
pub mod uaccess;

// Re-export 错误类型
pub use error::{PcdError, RegistryError};

// Re-export 设备号
pub use dev::{DevT, major, makedev, minor};

// Re-export 驱动与文件
pub use config::{DeviceConfig, default_devices};
pub use device::PcdDevice;
pub use driver::{DriverState, PcdDriver};
pub use file::{FileState, PcdFile};
pub use ops::{FileOp, FileOpResult};
pub use perm::DevPerm;

// Re-export 注册接口
pub use registry::{ClassHandle, DeviceRegistry};
pub use sys_registry::SysRegistry;

pub use uaccess::{UserRead, UserWrite};
pub use uapi::fcntl::{OpenFlags, SeekWhence};
