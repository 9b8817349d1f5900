//! Sensor - 槽位化的数值读数存储与变更通知
//!
//! 每个 [`Sensor`] 实例存储固定长度的 `f64` 读数数组，每个槽位
//! （slot）对应一路语义独立的读数（X 轴、3 号按钮、RPM……）。
//! 写入路径 [`Sensor::set_state`] 做变更检测：仅当新值 ≠ 旧值时，
//! 在提交后通过变更总线发布**恰好一次** [`SensorEvent`]，事件携带新值。
//!
//! 传感器从不自行调度采样。具体设备的读取逻辑以
//! [`SensorDriver`] 能力对象的形式在构造时绑定，由外部的
//! [`SensorPoller`](crate::poller::SensorPoller) 周期性驱动
//! [`Sensor::poll`]。
//!
//! # 布尔约定
//!
//! 按钮类槽位使用 [`Sensor::TRUE`] / [`Sensor::FALSE`] 两个数值；
//! 越界读取返回 [`Sensor::ERROR`]（NaN）哨兵而不是 panic，
//! 保证轮询循环永不致命。

use crate::event::Bus;
use parking_lot::{Mutex, RwLock};
use tracing::warn;

/// 槽位变更事件，携带新值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorEvent {
    pub slot: usize,
    pub value: f64,
}

/// 设备读取能力
///
/// 每个采样周期调用一次 `sample`：`frame` 预填当前各槽位值，
/// 实现者把新鲜读数写回对应槽位。未触碰的槽位保持原值。
pub trait SensorDriver: Send {
    fn sample(&mut self, frame: &mut [f64]);
}

/// 槽位化传感器
///
/// 槽位数组由轮询线程写入、任意线程读取；跨槽位不保证原子性
/// （last-write-wins），读者按约定容忍这一点。
pub struct Sensor {
    name: String,
    data: RwLock<Vec<f64>>,
    driver: Mutex<Box<dyn SensorDriver>>,
    changes: Bus<SensorEvent>,
}

impl Sensor {
    /// 布尔槽位的"真"值
    pub const TRUE: f64 = 1.0;
    /// 布尔槽位的"假"值
    pub const FALSE: f64 = 0.0;
    /// 越界访问哨兵
    pub const ERROR: f64 = f64::NAN;

    /// 创建传感器，所有槽位初始为 0.0
    pub fn new(name: impl Into<String>, slots: usize, driver: Box<dyn SensorDriver>) -> Self {
        Sensor {
            name: name.into(),
            data: RwLock::new(vec![0.0; slots]),
            driver: Mutex::new(driver),
            changes: Bus::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 槽位数量
    pub fn num_slots(&self) -> usize {
        self.data.read().len()
    }

    /// 读取一个槽位；越界返回 [`Sensor::ERROR`]
    pub fn state(&self, slot: usize) -> f64 {
        self.data.read().get(slot).copied().unwrap_or(Self::ERROR)
    }

    /// 写入一个槽位，值发生变化时发布恰好一次变更事件
    ///
    /// 越界写入被拒绝并记录 warn，不 panic。
    pub fn set_state(&self, slot: usize, value: f64) {
        let changed = {
            let mut data = self.data.write();
            let Some(cell) = data.get_mut(slot) else {
                warn!(sensor = %self.name, slot, "set_state out of range, ignoring");
                return;
            };
            let changed = *cell != value;
            *cell = value;
            changed
        };
        // 锁外发布，事件反映已提交的新值
        if changed {
            self.changes.publish(&SensorEvent { slot, value });
        }
    }

    /// 执行一次采样：驱动读取设备，随后逐槽位走 `set_state` 变更检测
    pub fn poll(&self) {
        let mut frame = self.data.read().clone();
        self.driver.lock().sample(&mut frame);
        for (slot, value) in frame.iter().enumerate() {
            self.set_state(slot, *value);
        }
    }

    /// 变更事件总线（插入有序投递）
    pub fn changes(&self) -> &Bus<SensorEvent> {
        &self.changes
    }
}

impl std::fmt::Debug for Sensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sensor")
            .field("name", &self.name)
            .field("slots", &self.num_slots())
            .finish()
    }
}
