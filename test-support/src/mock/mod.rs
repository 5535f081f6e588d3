//! Mock 实现模块
//!
//! 提供架构操作的 Mock 实现和故障注入工具，用于测试

pub mod arch;
pub mod fault;
