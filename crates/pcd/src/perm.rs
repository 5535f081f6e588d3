//! 设备访问权限
//!
//! 每个设备声明一个权限类，打开时请求的访问模式必须是它的子集。

use bitflags::bitflags;
use uapi::fcntl::OpenFlags;

use crate::PcdError;

bitflags! {
    /// 设备权限类
    ///
    /// 位值沿用驱动原有的权限码：只读 0x01，只写 0x10，读写 0x11。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DevPerm: u32 {
        /// 只读
        const RDONLY = 0x01;
        /// 只写
        const WRONLY = 0x10;
        /// 读写
        const RDWR = Self::RDONLY.bits() | Self::WRONLY.bits();
    }
}

impl DevPerm {
    /// 是否为三种合法权限类之一
    pub fn is_valid(&self) -> bool {
        !self.is_empty() && DevPerm::RDWR.contains(*self)
    }

    /// 简短记号，与配置字符串中的写法一致
    pub fn as_str(&self) -> &'static str {
        if *self == DevPerm::RDWR {
            "rw"
        } else if *self == DevPerm::RDONLY {
            "ro"
        } else if *self == DevPerm::WRONLY {
            "wo"
        } else {
            "--"
        }
    }

    /// 从配置记号解析
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "ro" => Some(DevPerm::RDONLY),
            "wo" => Some(DevPerm::WRONLY),
            "rw" => Some(DevPerm::RDWR),
            _ => None,
        }
    }
}

/// 将打开标志转换为请求的访问位
///
/// `O_ACCMODE` 全置位不是合法的访问模式，返回 `InvalidArgument`。
pub fn requested_access(flags: OpenFlags) -> Result<DevPerm, PcdError> {
    if !flags.has_valid_access_mode() {
        return Err(PcdError::InvalidArgument);
    }
    let mut mode = DevPerm::empty();
    if flags.readable() {
        mode |= DevPerm::RDONLY;
    }
    if flags.writable() {
        mode |= DevPerm::WRONLY;
    }
    Ok(mode)
}

/// 判断设备权限是否允许请求的访问模式
pub fn authorize(perm: DevPerm, requested: DevPerm) -> bool {
    !requested.is_empty() && perm.contains(requested)
}

/// 按打开标志检查设备权限，拒绝时返回 `PermissionDenied`
pub fn check_open(perm: DevPerm, flags: OpenFlags) -> Result<(), PcdError> {
    let requested = requested_access(flags)?;
    if authorize(perm, requested) {
        Ok(())
    } else {
        Err(PcdError::PermissionDenied)
    }
}
