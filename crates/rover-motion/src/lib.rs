//! rover-motion - 底盘运动层
//!
//! 在 rover-core 的执行核心之上提供差速底盘的运动能力：
//!
//! - [`platform`]：硬件协作对象的能力边界（底盘、反馈环、探头）
//! - [`tracker`]：航位推算位姿估计 [`PositionTracker`]
//! - [`drive`] / [`turn`] / [`delay`]：可排入宏序列的自主动作
//! - [`teleop`]：摇杆手动驾驶控制器
//!
//! # 使用示例
//!
//! ```ignore
//! use rover_motion::{DriveOp, TurnOp, PositionTracker};
//! use rover_core::MacroController;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let tracker = Arc::new(PositionTracker::new());
//! let controller = MacroController::new("auton");
//! controller.add_macro(
//!     DriveOp::new(platform, left, right, feedback, Arc::clone(&tracker), 3.0, &constants)?
//!         .into_macro(Duration::from_secs(5)),
//! );
//! controller.enable()?;    // 阻塞到序列结束
//! ```

pub mod delay;
pub mod drive;
pub mod platform;
pub mod teleop;
pub mod tracker;
pub mod turn;

#[cfg(test)]
pub(crate) mod testing;

pub use delay::DelayOp;
pub use drive::DriveOp;
pub use platform::{DrivePlatform, FeedbackLoop, MotionProbe};
pub use teleop::TankDriveController;
pub use tracker::{Pose, PositionTracker};
pub use turn::TurnOp;
