//! SensorPoller - 周期性驱动一组传感器采样
//!
//! 一个 [`SensorPoller`] 就是一个轮询 [`Process`]：它持有一组
//! [`Sensor`]，在自己的后台线程上按固定周期逐个调用
//! [`Sensor::poll`]。允许多个 poller 以不同周期并存——例如摇杆/
//! 按钮走快速 poller，正交编码器走较慢的 poller 以稳定速率计算。

use crate::error::CoreError;
use crate::process::{Pollable, Process};
use crate::sensor::Sensor;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// 缺省采样周期
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// 传感器轮询器
pub struct SensorPoller {
    process: Process,
    sensors: Mutex<Vec<Arc<Sensor>>>,
}

impl SensorPoller {
    /// 创建一个空的轮询器
    ///
    /// 返回 `Arc`：启动时轮询线程需要持有自身引用。
    pub fn new(name: impl Into<String>, interval: Duration) -> Arc<Self> {
        Arc::new(SensorPoller {
            process: Process::polling(name, interval),
            sensors: Mutex::new(Vec::new()),
        })
    }

    /// 以缺省周期创建
    pub fn with_default_interval(name: impl Into<String>) -> Arc<Self> {
        Self::new(name, DEFAULT_POLL_INTERVAL)
    }

    pub fn add_sensor(&self, sensor: Arc<Sensor>) {
        self.sensors.lock().push(sensor);
    }

    /// 按实例同一性移除传感器
    pub fn remove_sensor(&self, sensor: &Arc<Sensor>) {
        self.sensors.lock().retain(|s| !Arc::ptr_eq(s, sensor));
    }

    pub fn num_sensors(&self) -> usize {
        self.sensors.lock().len()
    }

    /// 启动后台采样线程
    pub fn start(self: &Arc<Self>) -> Result<(), CoreError> {
        let target: Arc<dyn Pollable> = Arc::clone(self) as Arc<dyn Pollable>;
        self.process.start_polling(target)
    }

    /// 请求停止；线程在下一个周期退出
    pub fn halt(&self) {
        self.process.halt();
    }

    pub fn is_running(&self) -> bool {
        self.process.is_running()
    }
}

impl Pollable for SensorPoller {
    fn poll(&self) {
        // 快照集合，采样期间允许 add/remove
        let sensors: Vec<Arc<Sensor>> = self.sensors.lock().clone();
        for sensor in sensors {
            sensor.poll();
        }
    }
}
