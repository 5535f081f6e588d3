//! 与用户空间共用定义和声明
//!
//! 包含常量、类型和函数声明，确保驱动与调用方对错误码、打开标志、
//! seek 语义的理解保持一致

#![no_std]
#![allow(dead_code)]
// uapi 中包含大量与 Linux 兼容的常量定义；逐项补 `///` 噪声较大。
#![allow(missing_docs)]

pub mod errno;
pub mod fcntl;
