//! 集成测试公用设施

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pcd::{ClassHandle, DevT, DeviceRegistry, PcdDriver, RegistryError, SysRegistry};
use sync::ArchOps;
use test_support::mock::arch::MOCK_ARCH_OPS;
use test_support::mock::fault::FailPoint;

struct TestArchOps;

impl ArchOps for TestArchOps {
    unsafe fn read_and_disable_interrupts(&self) -> usize {
        unsafe { MOCK_ARCH_OPS.read_and_disable_interrupts() }
    }

    unsafe fn restore_interrupts(&self, flags: usize) {
        unsafe { MOCK_ARCH_OPS.restore_interrupts(flags) }
    }

    fn interrupt_enable_bit(&self) -> usize {
        MOCK_ARCH_OPS.interrupt_enable_bit()
    }
}

static TEST_ARCH_OPS: TestArchOps = TestArchOps;
// 0 = uninit, 1 = initializing, 2 = ready
static INIT: AtomicUsize = AtomicUsize::new(0);

/// 注册 Mock 架构操作，可重复调用
pub fn init() {
    match INIT.compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire) {
        Ok(_) => {
            // Safety: tests use a single global mock ArchOps.
            unsafe { sync::register_arch_ops(&TEST_ARCH_OPS) };
            INIT.store(2, Ordering::Release);
        }
        Err(_) => {
            while INIT.load(Ordering::Acquire) != 2 {
                std::hint::spin_loop();
            }
        }
    }
}

/// 带故障注入的注册表
///
/// 包装一个 [`SysRegistry`]，每类可失败的调用各有一个故障注入点。
pub struct FlakyRegistry {
    pub inner: Arc<SysRegistry>,
    pub allocate: FailPoint,
    pub group: FailPoint,
    pub add: FailPoint,
    pub publish: FailPoint,
}

impl FlakyRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SysRegistry::new()),
            allocate: FailPoint::new(),
            group: FailPoint::new(),
            add: FailPoint::new(),
            publish: FailPoint::new(),
        }
    }

    pub fn disarm(&self) {
        self.allocate.disarm();
        self.group.disarm();
        self.add.disarm();
        self.publish.disarm();
    }

    /// 注册表中没有任何区间、设备类、设备或节点
    pub fn is_pristine(&self) -> bool {
        self.inner.region_count() == 0
            && !self.inner.class_exists("pcd_class")
            && self.inner.added_count() == 0
            && self.inner.published_count() == 0
    }
}

impl DeviceRegistry for FlakyRegistry {
    fn allocate_id_range(&self, count: usize, name: &str) -> Result<DevT, RegistryError> {
        if self.allocate.hit() {
            return Err(RegistryError::NoIdSpace);
        }
        self.inner.allocate_id_range(count, name)
    }

    fn release_id_range(&self, base: DevT, count: usize) {
        self.inner.release_id_range(base, count)
    }

    fn create_group(&self, name: &str) -> Result<ClassHandle, RegistryError> {
        if self.group.hit() {
            return Err(RegistryError::OutOfMemory);
        }
        self.inner.create_group(name)
    }

    fn destroy_group(&self, class: ClassHandle) {
        self.inner.destroy_group(class)
    }

    fn add_device(&self, dev: DevT) -> Result<(), RegistryError> {
        if self.add.hit() {
            return Err(RegistryError::Busy);
        }
        self.inner.add_device(dev)
    }

    fn remove_device(&self, dev: DevT) {
        self.inner.remove_device(dev)
    }

    fn publish(&self, class: ClassHandle, dev: DevT, name: &str) -> Result<(), RegistryError> {
        if self.publish.hit() {
            return Err(RegistryError::AlreadyExists);
        }
        self.inner.publish(class, dev, name)
    }

    fn unpublish(&self, class: ClassHandle, dev: DevT) {
        self.inner.unpublish(class, dev)
    }
}

/// 使用默认设备表初始化一个驱动
pub fn started_driver() -> (Arc<SysRegistry>, PcdDriver) {
    init();
    let registry = Arc::new(SysRegistry::new());
    let mut drv = PcdDriver::new(registry.clone());
    drv.init(&pcd::default_devices()).unwrap();
    (registry, drv)
}
