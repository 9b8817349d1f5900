//! 延时宏：在序列中插入一段定长等待
//!
//! 没有硬件副作用，`perform` 只看墙钟。宏的超时被设为
//! `delay + 100ms`，所以正常情况下延时总是以 Completed 结束，
//! 不会先触发 TimedOut。

use rover_core::macros::machine::{Macro, MacroOp, MacroStep};
use rover_core::CoreError;
use std::time::{Duration, Instant};

/// 超时相对延时的余量
const TIMEOUT_MARGIN: Duration = Duration::from_millis(100);

/// 纯等待动作
pub struct DelayOp {
    delay: Duration,
    armed_at: Option<Instant>,
}

impl DelayOp {
    pub fn new(delay: Duration) -> Self {
        DelayOp { delay, armed_at: None }
    }

    /// 打包成宏，超时自动取 `delay + 100ms`
    pub fn into_macro(self) -> Macro {
        let timeout = self.delay + TIMEOUT_MARGIN;
        Macro::new("delay", timeout, Box::new(self))
    }
}

impl MacroOp for DelayOp {
    fn initialize(&mut self) -> Result<(), CoreError> {
        self.armed_at = Some(Instant::now());
        Ok(())
    }

    fn perform(&mut self) -> Result<MacroStep, CoreError> {
        let armed_at = self.armed_at.ok_or_else(|| CoreError::MacroStage {
            name: "delay".to_string(),
            stage: "perform",
            message: "perform before initialize".to_string(),
        })?;
        if armed_at.elapsed() >= self.delay {
            Ok(MacroStep::Finished)
        } else {
            Ok(MacroStep::Continue)
        }
    }

    fn die(&mut self) -> Result<(), CoreError> {
        Ok(())
    }
}
