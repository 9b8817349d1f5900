//! 转向宏：闭环原地转过指定角度
//!
//! `initialize` 降到低速挡、采陀螺仪基线并以 `起始角 + 转角`
//! 武装反馈环；`perform` 与直行宏同样做连续两周期的到位去抖；
//! `die` 撤防、停住底盘、升回高速挡，并把实际转过的角度提交给
//! [`PositionTracker`]。
//!
//! 常量键：`turn_p` / `turn_i` / `turn_d` / `turn_tolerance`。

use crate::platform::{DrivePlatform, FeedbackLoop, MotionProbe};
use crate::tracker::PositionTracker;
use rover_core::macros::machine::{Macro, MacroOp, MacroStep};
use rover_core::{ConstantsSource, CoreError};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// 转向动作
pub struct TurnOp {
    platform: Arc<dyn DrivePlatform>,
    gyro: Arc<dyn MotionProbe>,
    feedback: Box<dyn FeedbackLoop>,
    tracker: Arc<PositionTracker>,
    turn_angle: f64,
    start_angle: f64,
    previously_on_target: bool,
}

impl TurnOp {
    /// 创建转向动作，`turn_angle` 为顺时针度数
    pub fn new(
        platform: Arc<dyn DrivePlatform>,
        gyro: Arc<dyn MotionProbe>,
        mut feedback: Box<dyn FeedbackLoop>,
        tracker: Arc<PositionTracker>,
        turn_angle: f64,
        constants: &dyn ConstantsSource,
    ) -> Result<Self, CoreError> {
        feedback.set_gains(
            constants.value("turn_p")?,
            constants.value("turn_i")?,
            constants.value("turn_d")?,
        );
        feedback.set_tolerance(constants.value("turn_tolerance")?);

        Ok(TurnOp {
            platform,
            gyro,
            feedback,
            tracker,
            turn_angle,
            start_angle: 0.0,
            previously_on_target: false,
        })
    }

    /// 打包成可排入序列的宏
    pub fn into_macro(self, timeout: Duration) -> Macro {
        Macro::new("turn", timeout, Box::new(self))
    }

    /// 自 initialize 以来实际转过的角度
    fn angle_turned(&self) -> f64 {
        self.gyro.angle() - self.start_angle
    }
}

impl MacroOp for TurnOp {
    fn initialize(&mut self) -> Result<(), CoreError> {
        // 低速挡转向更可控
        self.platform.shift_down();
        self.start_angle = self.gyro.angle();
        self.previously_on_target = false;
        self.feedback.arm(self.start_angle + self.turn_angle);
        debug!(setpoint = self.start_angle + self.turn_angle, "turn armed");
        Ok(())
    }

    fn perform(&mut self) -> Result<MacroStep, CoreError> {
        if self.feedback.on_target() {
            if self.previously_on_target {
                return Ok(MacroStep::Finished);
            }
            self.previously_on_target = true;
        } else {
            self.previously_on_target = false;
        }
        Ok(MacroStep::Continue)
    }

    fn die(&mut self) -> Result<(), CoreError> {
        self.feedback.disarm();
        self.platform.halt();
        self.platform.shift_up();
        let turned = self.angle_turned();
        self.tracker.notify_turn(turned);
        debug!(turned, "turn committed to tracker");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubConstants, StubFeedback, StubPlatform, StubProbe};

    fn turn_constants() -> StubConstants {
        StubConstants::with(&[
            ("turn_p", 1.2),
            ("turn_i", 0.1),
            ("turn_d", 0.3),
            ("turn_tolerance", 2.0),
        ])
    }

    struct Rig {
        op: TurnOp,
        platform: Arc<StubPlatform>,
        gyro: Arc<StubProbe>,
        tracker: Arc<PositionTracker>,
        settings: Arc<parking_lot::Mutex<crate::testing::FeedbackSettings>>,
    }

    fn build_rig(script: &[bool], turn_angle: f64) -> Rig {
        let platform = Arc::new(StubPlatform::new());
        let gyro = Arc::new(StubProbe::new());
        let tracker = Arc::new(PositionTracker::new());
        let feedback = StubFeedback::scripted(script);
        let settings = feedback.settings_handle();
        let op = TurnOp::new(
            Arc::clone(&platform) as Arc<dyn DrivePlatform>,
            Arc::clone(&gyro) as Arc<dyn MotionProbe>,
            Box::new(feedback),
            Arc::clone(&tracker),
            turn_angle,
            &turn_constants(),
        )
        .unwrap();
        Rig { op, platform, gyro, tracker, settings }
    }

    #[test]
    fn test_initialize_shifts_down_and_arms_absolute_target() {
        let mut rig = build_rig(&[], 90.0);
        rig.gyro.set_angle(30.0);
        rig.op.initialize().unwrap();

        assert_eq!(*rig.platform.shifts.lock(), vec!["down"]);
        // 目标是绝对角：起始 30 + 转角 90
        assert_eq!(rig.settings.lock().armed_setpoint, Some(120.0));
    }

    #[test]
    fn test_debounce_requires_two_consecutive_hits() {
        let mut rig = build_rig(&[true, true], 45.0);
        rig.op.initialize().unwrap();
        assert_eq!(rig.op.perform().unwrap(), MacroStep::Continue);
        assert_eq!(rig.op.perform().unwrap(), MacroStep::Finished);
    }

    #[test]
    fn test_die_commits_actual_angle_and_shifts_up() {
        let mut rig = build_rig(&[], 90.0);
        rig.gyro.set_angle(10.0);
        rig.op.initialize().unwrap();

        // 实际只转到了 87°
        rig.gyro.set_angle(97.0);
        rig.op.die().unwrap();

        assert!((rig.tracker.pose().heading - 87.0).abs() < 1e-9);
        assert!(rig.platform.is_halted());
        assert_eq!(*rig.platform.shifts.lock(), vec!["down", "up"]);
        assert_eq!(rig.settings.lock().disarm_count, 1);
    }

    #[test]
    fn test_gains_come_from_constants() {
        let rig = build_rig(&[], 10.0);
        let recorded = *rig.settings.lock();
        assert_eq!(recorded.gains, (1.2, 0.1, 0.3));
        assert_eq!(recorded.tolerance, 2.0);
    }

    #[test]
    fn test_missing_constant_fails_construction() {
        let platform = Arc::new(StubPlatform::new());
        let gyro = Arc::new(StubProbe::new());
        let result = TurnOp::new(
            Arc::clone(&platform) as Arc<dyn DrivePlatform>,
            Arc::clone(&gyro) as Arc<dyn MotionProbe>,
            Box::new(StubFeedback::scripted(&[])),
            Arc::new(PositionTracker::new()),
            90.0,
            &StubConstants::with(&[]),
        );
        assert!(matches!(result, Err(CoreError::MissingConstant(_))));
    }
}
