//! 驱动错误类型
//!
//! [`PcdError`] 覆盖打开文件上的各项操作，[`RegistryError`] 覆盖设备注册流程。
//! 两者都可通过 `to_errno()` 转换为系统调用错误码。

use core::fmt;

use uapi::errno::{
    EACCES, EBADF, EBUSY, EEXIST, EFAULT, EINVAL, ENODEV, ENOMEM, ENOSPC, ENXIO,
};

/// 文件操作错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcdError {
    /// 无效参数 (-EINVAL)：seek 越界或 whence 无法识别
    InvalidArgument,
    /// 权限被拒绝 (-EACCES)：请求的访问模式不被设备权限允许
    PermissionDenied,
    /// 设备已写满 (-ENOMEM)：游标位于容量末尾时写入
    OutOfSpace,
    /// 设备不存在 (-ENXIO)
    NotFound,
    /// 用户缓冲区访问失败 (-EFAULT)
    BoundaryFault,
    /// 文件已关闭或访问模式不支持该操作 (-EBADF)
    BadFileDescriptor,
}

impl PcdError {
    /// 转换为系统调用错误码（负数）
    pub fn to_errno(&self) -> isize {
        let errno = match self {
            PcdError::InvalidArgument => EINVAL,
            PcdError::PermissionDenied => EACCES,
            PcdError::OutOfSpace => ENOMEM,
            PcdError::NotFound => ENXIO,
            PcdError::BoundaryFault => EFAULT,
            PcdError::BadFileDescriptor => EBADF,
        };
        -(errno as isize)
    }
}

impl fmt::Display for PcdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            PcdError::InvalidArgument => "invalid argument",
            PcdError::PermissionDenied => "permission denied",
            PcdError::OutOfSpace => "no space left on the device",
            PcdError::NotFound => "no such device",
            PcdError::BoundaryFault => "bad address",
            PcdError::BadFileDescriptor => "bad file descriptor",
        };
        f.write_str(msg)
    }
}

/// 设备注册错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// 没有可用的设备号区间 (-ENOSPC)
    NoIdSpace,
    /// 名称或设备号已被占用 (-EEXIST)
    AlreadyExists,
    /// 资源正忙，或驱动已初始化 (-EBUSY)
    Busy,
    /// 引用了不存在的区间、类或设备 (-ENODEV)
    NotFound,
    /// 设备配置非法 (-EINVAL)
    InvalidConfig,
    /// 设备缓冲区分配失败 (-ENOMEM)
    OutOfMemory,
}

impl RegistryError {
    /// 转换为系统调用错误码（负数）
    pub fn to_errno(&self) -> isize {
        let errno = match self {
            RegistryError::NoIdSpace => ENOSPC,
            RegistryError::AlreadyExists => EEXIST,
            RegistryError::Busy => EBUSY,
            RegistryError::NotFound => ENODEV,
            RegistryError::InvalidConfig => EINVAL,
            RegistryError::OutOfMemory => ENOMEM,
        };
        -(errno as isize)
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            RegistryError::NoIdSpace => "no device number range available",
            RegistryError::AlreadyExists => "name or device number already registered",
            RegistryError::Busy => "device or resource busy",
            RegistryError::NotFound => "no such region, class or device",
            RegistryError::InvalidConfig => "invalid device configuration",
            RegistryError::OutOfMemory => "cannot allocate device memory",
        };
        f.write_str(msg)
    }
}
