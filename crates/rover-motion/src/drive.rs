//! 直行宏：闭环走一段指定距离
//!
//! `initialize` 采两侧编码器的基线读数并以目标距离武装反馈环；
//! `perform` 轮询到位判定，要求连续**两个**周期都在容差带内才宣告
//! 完成（对瞬态穿越去抖）；`die` 撤防、停住底盘，并把实际走过的
//! 距离提交给 [`PositionTracker`]。
//!
//! PID 增益与容差在构造时从常量源读取：
//! `drive_p` / `drive_i` / `drive_d` / `drive_tolerance`。

use crate::platform::{DrivePlatform, FeedbackLoop, MotionProbe};
use crate::tracker::PositionTracker;
use rover_core::macros::machine::{Macro, MacroOp, MacroStep};
use rover_core::{ConstantsSource, CoreError};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// 直行动作
pub struct DriveOp {
    platform: Arc<dyn DrivePlatform>,
    left: Arc<dyn MotionProbe>,
    right: Arc<dyn MotionProbe>,
    feedback: Box<dyn FeedbackLoop>,
    tracker: Arc<PositionTracker>,
    distance: f64,
    left_start: f64,
    right_start: f64,
    previously_on_target: bool,
}

impl DriveOp {
    /// 创建直行动作；缺失的增益常量在这里就失败
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        platform: Arc<dyn DrivePlatform>,
        left: Arc<dyn MotionProbe>,
        right: Arc<dyn MotionProbe>,
        mut feedback: Box<dyn FeedbackLoop>,
        tracker: Arc<PositionTracker>,
        distance: f64,
        constants: &dyn ConstantsSource,
    ) -> Result<Self, CoreError> {
        feedback.set_gains(
            constants.value("drive_p")?,
            constants.value("drive_i")?,
            constants.value("drive_d")?,
        );
        feedback.set_tolerance(constants.value("drive_tolerance")?);

        Ok(DriveOp {
            platform,
            left,
            right,
            feedback,
            tracker,
            distance,
            left_start: 0.0,
            right_start: 0.0,
            previously_on_target: false,
        })
    }

    /// 打包成可排入序列的宏
    pub fn into_macro(self, timeout: Duration) -> Macro {
        Macro::new("drive", timeout, Box::new(self))
    }

    /// 两侧编码器的平均行进距离
    fn traveled(&self) -> f64 {
        let left = self.left.distance() - self.left_start;
        let right = self.right.distance() - self.right_start;
        (left + right) / 2.0
    }
}

impl MacroOp for DriveOp {
    fn initialize(&mut self) -> Result<(), CoreError> {
        self.left_start = self.left.distance();
        self.right_start = self.right.distance();
        self.previously_on_target = false;
        self.feedback.arm(self.distance);
        debug!(distance = self.distance, "drive armed");
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
        let traveled = self.traveled();
        self.tracker.notify_drive(traveled);
        debug!(traveled, "drive committed to tracker");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubConstants, StubFeedback, StubPlatform, StubProbe};
    use rover_core::CancelToken;

    fn drive_constants() -> StubConstants {
        StubConstants::with(&[
            ("drive_p", 0.8),
            ("drive_i", 0.0),
            ("drive_d", 0.2),
            ("drive_tolerance", 0.05),
        ])
    }

    struct Rig {
        op: DriveOp,
        platform: Arc<StubPlatform>,
        left: Arc<StubProbe>,
        right: Arc<StubProbe>,
        tracker: Arc<PositionTracker>,
        settings: Arc<parking_lot::Mutex<crate::testing::FeedbackSettings>>,
    }

    fn build_rig(on_target_script: &[bool]) -> Rig {
        let platform = Arc::new(StubPlatform::new());
        let left = Arc::new(StubProbe::new());
        let right = Arc::new(StubProbe::new());
        let tracker = Arc::new(PositionTracker::new());
        let feedback = StubFeedback::scripted(on_target_script);
        let settings = feedback.settings_handle();
        let feedback = Box::new(feedback);
        let op = DriveOp::new(
            Arc::clone(&platform) as Arc<dyn DrivePlatform>,
            Arc::clone(&left) as Arc<dyn MotionProbe>,
            Arc::clone(&right) as Arc<dyn MotionProbe>,
            feedback,
            Arc::clone(&tracker),
            5.0,
            &drive_constants(),
        )
        .unwrap();
        Rig { op, platform, left, right, tracker, settings }
    }

    #[test]
    fn test_missing_gain_fails_construction() {
        let platform = Arc::new(StubPlatform::new());
        let probe = Arc::new(StubProbe::new());
        let result = DriveOp::new(
            Arc::clone(&platform) as Arc<dyn DrivePlatform>,
            Arc::clone(&probe) as Arc<dyn MotionProbe>,
            Arc::clone(&probe) as Arc<dyn MotionProbe>,
            Box::new(StubFeedback::scripted(&[])),
            Arc::new(PositionTracker::new()),
            1.0,
            &StubConstants::with(&[("drive_p", 1.0)]),
        );
        assert!(matches!(result, Err(CoreError::MissingConstant(_))));
    }

    #[test]
    fn test_requires_two_consecutive_on_target_polls() {
        // 单次到位是瞬态，不算完成
        let mut rig = build_rig(&[true, false, true, true]);
        rig.op.initialize().unwrap();

        assert_eq!(rig.op.perform().unwrap(), MacroStep::Continue); // true（第一次）
        assert_eq!(rig.op.perform().unwrap(), MacroStep::Continue); // false，去抖复位
        assert_eq!(rig.op.perform().unwrap(), MacroStep::Continue); // true（重新第一次）
        assert_eq!(rig.op.perform().unwrap(), MacroStep::Finished); // 连续第二次
    }

    #[test]
    fn test_die_commits_traveled_distance() {
        let mut rig = build_rig(&[true, true]);

        rig.left.set_distance(10.0);
        rig.right.set_distance(20.0);
        rig.op.initialize().unwrap();
        assert_eq!(rig.settings.lock().armed_setpoint, Some(5.0));

        // 行进中编码器前进了不对称的距离
        rig.left.set_distance(14.0);
        rig.right.set_distance(26.0);
        rig.op.die().unwrap();

        // (4 + 6) / 2 = 5，沿航向 0° 提交到 +y
        let pose = rig.tracker.pose();
        assert!((pose.y - 5.0).abs() < 1e-9);
        assert_eq!(pose.x, 0.0);
        assert!(rig.platform.is_halted());
        assert_eq!(rig.settings.lock().disarm_count, 1);
    }

    #[test]
    fn test_full_macro_lifecycle() {
        let rig = build_rig(&[false, true, true]);
        let platform = Arc::clone(&rig.platform);
        let tracker = Arc::clone(&rig.tracker);
        let mut m = rig
            .op
            .into_macro(Duration::from_millis(500))
            .with_poll_interval(Duration::from_millis(2));

        m.execute(&CancelToken::new()).unwrap();

        assert!(m.is_done());
        assert!(!m.is_timed_out());
        assert!(platform.is_halted());
        // 编码器桩没有前进，提交里程为 0
        assert_eq!(tracker.pose().y, 0.0);
    }

    #[test]
    fn test_gains_and_tolerance_come_from_constants() {
        let rig = build_rig(&[]);
        let recorded = *rig.settings.lock();
        assert_eq!(recorded.gains, (0.8, 0.0, 0.2));
        assert_eq!(recorded.tolerance, 0.05);
        drop(rig);
    }
}
