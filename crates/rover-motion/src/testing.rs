//! 单元测试共享的硬件桩

use crate::platform::{DrivePlatform, FeedbackLoop, MotionProbe};
use parking_lot::Mutex;
use rover_core::event::Bus;
use rover_core::{ConstantsEvent, ConstantsSource, CoreError};
use std::collections::HashMap;
use std::sync::Arc;

/// 记录底盘收到的命令
pub struct StubPlatform {
    pub speeds: Mutex<Vec<(f64, f64)>>,
    pub shifts: Mutex<Vec<&'static str>>,
}

impl StubPlatform {
    pub fn new() -> Self {
        StubPlatform {
            speeds: Mutex::new(Vec::new()),
            shifts: Mutex::new(Vec::new()),
        }
    }

    pub fn last_speeds(&self) -> Option<(f64, f64)> {
        self.speeds.lock().last().copied()
    }

    pub fn is_halted(&self) -> bool {
        self.last_speeds() == Some((0.0, 0.0))
    }
}

impl DrivePlatform for StubPlatform {
    fn set_speeds(&self, left: f64, right: f64) {
        self.speeds.lock().push((left, right));
    }
    fn shift_up(&self) {
        self.shifts.lock().push("up");
    }
    fn shift_down(&self) {
        self.shifts.lock().push("down");
    }
}

/// 可手动推进的里程/角度探头
pub struct StubProbe {
    distance: Mutex<f64>,
    rate: Mutex<f64>,
    angle: Mutex<f64>,
}

impl StubProbe {
    pub fn new() -> Self {
        StubProbe {
            distance: Mutex::new(0.0),
            rate: Mutex::new(0.0),
            angle: Mutex::new(0.0),
        }
    }

    pub fn set_distance(&self, value: f64) {
        *self.distance.lock() = value;
    }

    pub fn set_rate(&self, value: f64) {
        *self.rate.lock() = value;
    }

    pub fn set_angle(&self, value: f64) {
        *self.angle.lock() = value;
    }
}

impl MotionProbe for StubProbe {
    fn distance(&self) -> f64 {
        *self.distance.lock()
    }
    fn rate(&self) -> f64 {
        *self.rate.lock()
    }
    fn angle(&self) -> f64 {
        *self.angle.lock()
    }
}

/// 桩反馈环记录下的配置
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeedbackSettings {
    pub gains: (f64, f64, f64),
    pub tolerance: f64,
    pub armed_setpoint: Option<f64>,
    pub disarm_count: usize,
}

/// 按脚本回答 `on_target` 的反馈环桩
///
/// 脚本耗尽后重复最后一个值（空脚本恒为 false）。
pub struct StubFeedback {
    script: Vec<bool>,
    cursor: Mutex<usize>,
    settings: Arc<Mutex<FeedbackSettings>>,
}

impl StubFeedback {
    pub fn scripted(script: &[bool]) -> Self {
        StubFeedback {
            script: script.to_vec(),
            cursor: Mutex::new(0),
            settings: Arc::new(Mutex::new(FeedbackSettings::default())),
        }
    }

    /// 配置记录的共享句柄，装箱前先拿走
    pub fn settings_handle(&self) -> Arc<Mutex<FeedbackSettings>> {
        Arc::clone(&self.settings)
    }
}

impl FeedbackLoop for StubFeedback {
    fn arm(&mut self, setpoint: f64) {
        self.settings.lock().armed_setpoint = Some(setpoint);
    }

    fn disarm(&mut self) {
        let mut settings = self.settings.lock();
        settings.armed_setpoint = None;
        settings.disarm_count += 1;
    }

    fn on_target(&self) -> bool {
        let mut cursor = self.cursor.lock();
        let answer = match self.script.get(*cursor) {
            Some(v) => *v,
            None => self.script.last().copied().unwrap_or(false),
        };
        *cursor += 1;
        answer
    }

    fn set_tolerance(&mut self, tolerance: f64) {
        self.settings.lock().tolerance = tolerance;
    }

    fn set_gains(&mut self, p: f64, i: f64, d: f64) {
        self.settings.lock().gains = (p, i, d);
    }
}

/// 内存常量表桩
pub struct StubConstants {
    table: HashMap<String, f64>,
    updates: Bus<ConstantsEvent>,
}

impl StubConstants {
    pub fn with(entries: &[(&str, f64)]) -> Self {
        StubConstants {
            table: entries.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            updates: Bus::new(),
        }
    }
}

impl ConstantsSource for StubConstants {
    fn value(&self, key: &str) -> Result<f64, CoreError> {
        self.table
            .get(key)
            .copied()
            .ok_or_else(|| CoreError::MissingConstant(key.to_string()))
    }

    fn updates(&self) -> &Bus<ConstantsEvent> {
        &self.updates
    }
}
