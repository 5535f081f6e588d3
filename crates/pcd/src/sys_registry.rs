//! 内存中的设备注册表
//!
//! 模拟内核的字符设备号分配与 sysfs 设备类命名空间：
//!
//! - 动态 major 号从 254 向下分配到 234，每个区间独占一个 major，minor 从 0 连续分配
//! - 设备类名称全局唯一，类内的节点名和设备号唯一
//! - 只有落在已分配区间内的设备号才能加入分发机制

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use sync::RwLock;

use crate::dev::{DevT, MINOR_MASK, major, makedev, minor};
use crate::registry::{ClassHandle, DeviceRegistry};
use crate::RegistryError;

/// 动态分配 major 号的上界
pub const CHRDEV_MAJOR_DYN_END: u32 = 254;
/// 动态分配 major 号的下界
pub const CHRDEV_MAJOR_DYN_START: u32 = 234;

/// 已发布节点信息（用于查询）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    /// 节点名
    pub name: String,
    /// 设备号
    pub devt: DevT,
}

impl NodeInfo {
    /// major 号
    pub fn major(&self) -> u32 {
        major(self.devt)
    }

    /// minor 号
    pub fn minor(&self) -> u32 {
        minor(self.devt)
    }
}

struct Region {
    base: DevT,
    count: usize,
    name: String,
}

impl Region {
    fn contains(&self, dev: DevT) -> bool {
        major(dev) == major(self.base)
            && minor(dev) >= minor(self.base)
            && ((minor(dev) - minor(self.base)) as usize) < self.count
    }
}

struct Class {
    handle: ClassHandle,
    name: String,
    nodes: Vec<NodeInfo>,
}

struct Namespace {
    regions: Vec<Region>,
    added: Vec<DevT>,
    classes: Vec<Class>,
    next_class: u32,
}

impl Namespace {
    fn class_mut(&mut self, handle: ClassHandle) -> Option<&mut Class> {
        self.classes.iter_mut().find(|c| c.handle == handle)
    }

    fn free_major(&self) -> Option<u32> {
        (CHRDEV_MAJOR_DYN_START..=CHRDEV_MAJOR_DYN_END)
            .rev()
            .find(|&maj| self.regions.iter().all(|r| major(r.base) != maj))
    }
}

/// 内存中的设备注册表
pub struct SysRegistry {
    ns: RwLock<Namespace>,
}

impl SysRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self {
            ns: RwLock::new(Namespace {
                regions: Vec::new(),
                added: Vec::new(),
                classes: Vec::new(),
                next_class: 1,
            }),
        }
    }

    /// 列出设备类下已发布的节点（按发布顺序）
    pub fn list_class(&self, class_name: &str) -> Vec<NodeInfo> {
        let ns = self.ns.read();
        ns.classes
            .iter()
            .find(|c| c.name == class_name)
            .map(|c| c.nodes.clone())
            .unwrap_or_default()
    }

    /// 根据节点名查找设备号
    pub fn lookup(&self, class_name: &str, node: &str) -> Option<DevT> {
        self.list_class(class_name)
            .into_iter()
            .find(|n| n.name == node)
            .map(|n| n.devt)
    }

    /// 设备类是否存在
    pub fn class_exists(&self, class_name: &str) -> bool {
        self.ns.read().classes.iter().any(|c| c.name == class_name)
    }

    /// 以 `base` 起始的区间是否已分配
    pub fn is_region_allocated(&self, base: DevT) -> bool {
        self.ns.read().regions.iter().any(|r| r.base == base)
    }

    /// 已分配区间的名称
    pub fn region_name(&self, base: DevT) -> Option<String> {
        self.ns
            .read()
            .regions
            .iter()
            .find(|r| r.base == base)
            .map(|r| r.name.clone())
    }

    /// 已分配区间数量
    pub fn region_count(&self) -> usize {
        self.ns.read().regions.len()
    }

    /// 设备号是否已加入分发机制
    pub fn is_device_added(&self, dev: DevT) -> bool {
        self.ns.read().added.contains(&dev)
    }

    /// 已加入分发机制的设备数量
    pub fn added_count(&self) -> usize {
        self.ns.read().added.len()
    }

    /// 所有设备类下已发布节点的总数
    pub fn published_count(&self) -> usize {
        self.ns.read().classes.iter().map(|c| c.nodes.len()).sum()
    }
}

impl Default for SysRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceRegistry for SysRegistry {
    fn allocate_id_range(&self, count: usize, name: &str) -> Result<DevT, RegistryError> {
        if count == 0 {
            return Err(RegistryError::InvalidConfig);
        }
        if count as u64 > MINOR_MASK + 1 {
            return Err(RegistryError::NoIdSpace);
        }

        let mut ns = self.ns.write();
        let maj = ns.free_major().ok_or(RegistryError::NoIdSpace)?;
        let base = makedev(maj, 0);
        ns.regions.push(Region {
            base,
            count,
            name: name.to_string(),
        });
        log::debug!("sysreg: region {} <{}:0> x{} allocated", name, maj, count);
        Ok(base)
    }

    fn release_id_range(&self, base: DevT, count: usize) {
        let mut ns = self.ns.write();
        match ns
            .regions
            .iter()
            .position(|r| r.base == base && r.count == count)
        {
            Some(pos) => {
                let region = ns.regions.remove(pos);
                log::debug!("sysreg: region {} released", region.name);
            }
            None => log::warn!(
                "sysreg: release of unknown region <{}:{}> x{}",
                major(base),
                minor(base),
                count
            ),
        }
    }

    fn create_group(&self, name: &str) -> Result<ClassHandle, RegistryError> {
        let mut ns = self.ns.write();
        if ns.classes.iter().any(|c| c.name == name) {
            return Err(RegistryError::AlreadyExists);
        }
        let handle = ClassHandle::new(ns.next_class);
        ns.next_class += 1;
        ns.classes.push(Class {
            handle,
            name: name.to_string(),
            nodes: Vec::new(),
        });
        Ok(handle)
    }

    fn destroy_group(&self, class: ClassHandle) {
        let mut ns = self.ns.write();
        match ns.classes.iter().position(|c| c.handle == class) {
            Some(pos) => {
                let removed = ns.classes.remove(pos);
                if !removed.nodes.is_empty() {
                    log::warn!(
                        "sysreg: class {} destroyed with {} nodes still published",
                        removed.name,
                        removed.nodes.len()
                    );
                }
            }
            None => log::warn!("sysreg: destroy of unknown {}", class),
        }
    }

    fn add_device(&self, dev: DevT) -> Result<(), RegistryError> {
        let mut ns = self.ns.write();
        if !ns.regions.iter().any(|r| r.contains(dev)) {
            return Err(RegistryError::NotFound);
        }
        if ns.added.contains(&dev) {
            return Err(RegistryError::Busy);
        }
        ns.added.push(dev);
        Ok(())
    }

    fn remove_device(&self, dev: DevT) {
        let mut ns = self.ns.write();
        match ns.added.iter().position(|&d| d == dev) {
            Some(pos) => {
                ns.added.remove(pos);
            }
            None => log::warn!(
                "sysreg: remove of unknown device <{}:{}>",
                major(dev),
                minor(dev)
            ),
        }
    }

    fn publish(&self, class: ClassHandle, dev: DevT, name: &str) -> Result<(), RegistryError> {
        let mut ns = self.ns.write();
        let class = ns.class_mut(class).ok_or(RegistryError::NotFound)?;
        if class.nodes.iter().any(|n| n.name == name || n.devt == dev) {
            return Err(RegistryError::AlreadyExists);
        }
        class.nodes.push(NodeInfo {
            name: name.to_string(),
            devt: dev,
        });
        Ok(())
    }

    fn unpublish(&self, class: ClassHandle, dev: DevT) {
        let mut ns = self.ns.write();
        let Some(class) = ns.class_mut(class) else {
            log::warn!("sysreg: unpublish from unknown {}", class);
            return;
        };
        class.nodes.retain(|n| n.devt != dev);
    }
}
