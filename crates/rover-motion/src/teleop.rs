//! 手动驾驶：坦克模式事件控制器
//!
//! [`TankDriveController`] 订阅摇杆传感器的变更总线，把左右两个
//! 槽位的读数直接映射为底盘左右轮速。使能即订阅、失能即退订并
//! 停住底盘，符合 [`EventController`] 的二态契约。
//!
//! 映射是纯反应式的：只有槽位值发生变化才会下发新速度，两侧
//! 各自独立更新（最近一次看到的另一侧值被缓存复用）。

use crate::platform::DrivePlatform;
use parking_lot::Mutex;
use rover_core::event::SubscriberId;
use rover_core::{CoreError, EventController, Sensor, SensorEvent};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::debug;

/// 坦克模式手动控制器
pub struct TankDriveController {
    name: String,
    enabled: AtomicBool,
    joystick: Arc<Sensor>,
    left_slot: usize,
    right_slot: usize,
    platform: Arc<dyn DrivePlatform>,
    subscription: Mutex<Option<SubscriberId>>,
    latest: Arc<Mutex<(f64, f64)>>,
}

impl TankDriveController {
    pub fn new(
        name: impl Into<String>,
        joystick: Arc<Sensor>,
        left_slot: usize,
        right_slot: usize,
        platform: Arc<dyn DrivePlatform>,
    ) -> Result<Self, CoreError> {
        let slots = joystick.num_slots();
        if left_slot >= slots || right_slot >= slots {
            return Err(CoreError::InvalidConfig(format!(
                "joystick slots {left_slot}/{right_slot} out of range (sensor has {slots})"
            )));
        }
        Ok(TankDriveController {
            name: name.into(),
            enabled: AtomicBool::new(false),
            joystick,
            left_slot,
            right_slot,
            platform,
            subscription: Mutex::new(None),
            latest: Arc::new(Mutex::new((0.0, 0.0))),
        })
    }
}

impl EventController for TankDriveController {
    fn name(&self) -> &str {
        &self.name
    }

    fn enabled_flag(&self) -> &AtomicBool {
        &self.enabled
    }

    fn subscribe(&self) -> Result<(), CoreError> {
        let platform = Arc::clone(&self.platform);
        let latest = Arc::clone(&self.latest);
        let (left_slot, right_slot) = (self.left_slot, self.right_slot);

        let id = self.joystick.changes().subscribe(move |event: &SensorEvent| {
            let mut speeds = latest.lock();
            if event.slot == left_slot {
                speeds.0 = event.value;
            } else if event.slot == right_slot {
                speeds.1 = event.value;
            } else {
                return;
            }
            debug!(left = speeds.0, right = speeds.1, "tank drive update");
            platform.set_speeds(speeds.0, speeds.1);
        });
        *self.subscription.lock() = Some(id);
        Ok(())
    }

    fn unsubscribe(&self) -> Result<(), CoreError> {
        if let Some(id) = self.subscription.lock().take() {
            self.joystick.changes().unsubscribe(id);
        }
        // 退订后摇杆事件不再到达，主动归零避免底盘带速滑行
        self.platform.halt();
        *self.latest.lock() = (0.0, 0.0);
        Ok(())
    }
}
