//! 设备注册接口
//!
//! 此模块定义了驱动向宿主注册设备时依赖的外部接口：设备号区间分配、
//! 设备类（命名空间分组）、向分发机制添加设备、向命名空间发布节点。
//! 清理类操作总是成功或尽力而为，不返回错误。

use core::fmt;

use crate::RegistryError;
use crate::dev::DevT;

/// 设备类句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassHandle(u32);

impl ClassHandle {
    /// 由原始值构造句柄
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// 句柄的原始值
    pub const fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ClassHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class#{}", self.0)
    }
}

/// 设备注册表
///
/// 由宿主实现并在创建驱动时注入。
pub trait DeviceRegistry: Send + Sync {
    // ========== 设备号 ==========

    /// 分配 `count` 个连续设备号，返回起始设备号
    fn allocate_id_range(&self, count: usize, name: &str) -> Result<DevT, RegistryError>;

    /// 释放之前分配的设备号区间
    fn release_id_range(&self, base: DevT, count: usize);

    // ========== 设备类 ==========

    /// 创建设备类
    fn create_group(&self, name: &str) -> Result<ClassHandle, RegistryError>;

    /// 销毁设备类
    fn destroy_group(&self, class: ClassHandle);

    // ========== 分发机制 ==========

    /// 将设备号加入分发机制，之后对该设备号的打开请求会被路由到驱动
    fn add_device(&self, dev: DevT) -> Result<(), RegistryError>;

    /// 从分发机制移除设备号
    fn remove_device(&self, dev: DevT);

    // ========== 命名空间 ==========

    /// 在设备类下发布节点
    fn publish(&self, class: ClassHandle, dev: DevT, name: &str) -> Result<(), RegistryError>;

    /// 撤销发布的节点
    fn unpublish(&self, class: ClassHandle, dev: DevT);
}
