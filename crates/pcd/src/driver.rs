//! 驱动状态与设备注册
//!
//! [`PcdDriver`] 持有设备表和所有注册句柄，是分发操作的唯一入口。
//!
//! 初始化时每完成一步注册，就把对应的撤销动作压入撤销栈：
//!
//! ```text
//! allocate_id_range  ->  ReleaseRange
//! create_group       ->  DestroyGroup
//! add_device(i)      ->  RemoveDevice(i)
//! publish(i)         ->  Unpublish(i)
//! ```
//!
//! 任一步失败时逆序弹出并执行撤销栈，注册表回到初始化前的状态；
//! 初始化成功时撤销栈保存在 [`DriverState`] 中，卸载时同样逆序执行。

use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::config::{PCD_CLASS_NAME, PCD_REGION_NAME, DeviceConfig};
use crate::dev::{DevT, major, makedev, minor};
use crate::device::PcdDevice;
use crate::registry::{ClassHandle, DeviceRegistry};
use crate::RegistryError;

/// 撤销动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Undo {
    ReleaseRange { base: DevT, count: usize },
    DestroyGroup(ClassHandle),
    RemoveDevice(DevT),
    Unpublish { class: ClassHandle, dev: DevT },
}

impl Undo {
    fn apply(self, registry: &dyn DeviceRegistry) {
        match self {
            Undo::ReleaseRange { base, count } => registry.release_id_range(base, count),
            Undo::DestroyGroup(class) => registry.destroy_group(class),
            Undo::RemoveDevice(dev) => registry.remove_device(dev),
            Undo::Unpublish { class, dev } => registry.unpublish(class, dev),
        }
    }
}

/// 逆序执行撤销栈
fn unwind(registry: &dyn DeviceRegistry, undo: Vec<Undo>, reason: &str) {
    for action in undo.into_iter().rev() {
        log::warn!("pcd: {}: {:?}", reason, action);
        action.apply(registry);
    }
}

/// 已初始化驱动的状态
pub struct DriverState {
    /// 起始设备号
    base: DevT,

    /// 设备类句柄
    class: ClassHandle,

    /// 设备表，下标即 minor 偏移
    devices: Vec<Arc<PcdDevice>>,

    /// 卸载时逆序执行的撤销栈
    undo: Vec<Undo>,
}

impl DriverState {
    /// 根据设备号查找设备
    pub fn device(&self, dev: DevT) -> Option<&Arc<PcdDevice>> {
        if major(dev) != major(self.base) {
            return None;
        }
        let index = minor(dev).checked_sub(minor(self.base))? as usize;
        self.devices.get(index)
    }
}

/// 伪字符设备驱动
///
/// 初始化与卸载需要 `&mut self`，分发操作只需要 `&self`，
/// 因此注册流程不会与文件操作并发执行。
pub struct PcdDriver {
    registry: Arc<dyn DeviceRegistry>,
    state: Option<DriverState>,
}

impl PcdDriver {
    /// 创建尚未初始化的驱动
    pub fn new(registry: Arc<dyn DeviceRegistry>) -> Self {
        Self {
            registry,
            state: None,
        }
    }

    /// 注册设备表中的全部设备
    ///
    /// 要么全部设备都被注册并发布，要么注册表回到调用前的状态并返回错误。
    pub fn init(&mut self, configs: &[DeviceConfig]) -> Result<(), RegistryError> {
        if self.state.is_some() {
            log::error!("pcd: driver already initialized");
            return Err(RegistryError::Busy);
        }
        if configs.is_empty() {
            log::error!("pcd: empty device table");
            return Err(RegistryError::InvalidConfig);
        }
        for config in configs {
            config.validate()?;
        }

        let mut undo = Vec::new();
        match Self::register_all(self.registry.as_ref(), configs, &mut undo) {
            Ok((base, class, devices)) => {
                log::info!(
                    "pcd: {} devices registered at <{}:{}>",
                    devices.len(),
                    major(base),
                    minor(base)
                );
                self.state = Some(DriverState {
                    base,
                    class,
                    devices,
                    undo,
                });
                Ok(())
            }
            Err(e) => {
                log::error!("pcd: module insertion failed: {}", e);
                unwind(self.registry.as_ref(), undo, "rollback");
                Err(e)
            }
        }
    }

    fn register_all(
        registry: &dyn DeviceRegistry,
        configs: &[DeviceConfig],
        undo: &mut Vec<Undo>,
    ) -> Result<(DevT, ClassHandle, Vec<Arc<PcdDevice>>), RegistryError> {
        let count = configs.len();

        let base = registry
            .allocate_id_range(count, PCD_REGION_NAME)
            .inspect_err(|e| log::error!("pcd: alloc chrdev region failed: {}", e))?;
        undo.push(Undo::ReleaseRange { base, count });

        let class = registry
            .create_group(PCD_CLASS_NAME)
            .inspect_err(|e| log::error!("pcd: class creation failed: {}", e))?;
        undo.push(Undo::DestroyGroup(class));

        let mut devices = Vec::with_capacity(count);
        for (i, config) in configs.iter().enumerate() {
            let offset = u32::try_from(i).map_err(|_| RegistryError::NoIdSpace)?;
            let dev = makedev(major(base), minor(base) + offset);
            log::info!("pcd: device number <major>:<minor> = {}:{}", major(dev), minor(dev));

            let device = PcdDevice::new(i, dev, config)?;

            registry
                .add_device(dev)
                .inspect_err(|e| log::error!("pcd: cdev add failed for {}: {}", device.name(), e))?;
            undo.push(Undo::RemoveDevice(dev));

            registry
                .publish(class, dev, device.name())
                .inspect_err(|e| log::error!("pcd: device create failed for {}: {}", device.name(), e))?;
            undo.push(Undo::Unpublish { class, dev });

            devices.push(Arc::new(device));
        }

        Ok((base, class, devices))
    }

    /// 注销全部设备并释放设备类和设备号区间
    ///
    /// 未初始化时什么也不做。仍处于打开状态的文件在之后的操作中会得到 `NotFound`。
    pub fn shutdown(&mut self) {
        let Some(state) = self.state.take() else {
            log::debug!("pcd: shutdown on uninitialized driver");
            return;
        };

        for device in &state.devices {
            let users = device.open_count();
            if users != 0 {
                log::warn!("pcd: {} still has {} open files", device.name(), users);
            }
        }

        unwind(self.registry.as_ref(), state.undo, "cleanup");
        log::info!("pcd: module unloaded");
    }

    /// 驱动是否已成功初始化
    pub fn is_started(&self) -> bool {
        self.state.is_some()
    }

    /// 已初始化时的驱动状态
    pub fn state(&self) -> Option<&DriverState> {
        self.state.as_ref()
    }

    /// 设备数量，未初始化时为 0
    pub fn device_count(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.devices.len())
    }

    /// 起始设备号
    pub fn base_devt(&self) -> Option<DevT> {
        self.state.as_ref().map(|s| s.base)
    }

    /// 设备类句柄
    pub fn class(&self) -> Option<ClassHandle> {
        self.state.as_ref().map(|s| s.class)
    }

    /// 第 `index` 个设备的设备号
    pub fn devt(&self, index: usize) -> Option<DevT> {
        self.device_at(index).map(|d| d.devt())
    }

    /// 第 `index` 个设备
    pub fn device_at(&self, index: usize) -> Option<&Arc<PcdDevice>> {
        self.state.as_ref()?.devices.get(index)
    }

    /// 根据设备号查找设备
    pub fn device(&self, dev: DevT) -> Option<&Arc<PcdDevice>> {
        self.state.as_ref()?.device(dev)
    }

    /// 遍历设备表
    pub fn devices(&self) -> impl Iterator<Item = &Arc<PcdDevice>> {
        self.state.iter().flat_map(|s| s.devices.iter())
    }
}

impl Drop for PcdDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}
