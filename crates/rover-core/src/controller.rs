//! EventController - 监听/空闲二态控制器
//!
//! 一个子系统要么处于 `Idle`（未订阅事件源、不动作），要么处于
//! `Listening`（已订阅、对事件作出反应）。[`EventController::enable`]
//! 置位使能标记并执行实现者提供的 `subscribe()`；
//! [`EventController::disable`] 反之。没有其他状态，没有超时或重试：
//! 订阅失败按致命配置错误向上传播。
//!
//! 在已处于 `Listening` 时再次 `enable()` 是无操作（标记用原子
//! swap 判定），实现者如需幂等重订阅可以自行覆盖这一行为。

use crate::error::CoreError;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// 事件控制器契约
///
/// 实现者提供订阅/退订两个钩子；`enable`/`disable` 的缺省实现
/// 负责状态标记与去重。
pub trait EventController: Send + Sync {
    fn name(&self) -> &str;

    /// 使能标记存储；缺省方法经由它实现幂等的 enable/disable
    fn enabled_flag(&self) -> &AtomicBool;

    /// 开始监听事件源。对 MacroController 这类顺序执行器来说，
    /// 这一调用会阻塞到整个序列结束。
    fn subscribe(&self) -> Result<(), CoreError>;

    /// 停止监听事件源
    fn unsubscribe(&self) -> Result<(), CoreError>;

    fn is_enabled(&self) -> bool {
        self.enabled_flag().load(Ordering::SeqCst)
    }

    /// Idle -> Listening；已在监听则无操作
    fn enable(&self) -> Result<(), CoreError> {
        if self.enabled_flag().swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        info!(controller = self.name(), "enabled");
        if let Err(e) = self.subscribe() {
            self.enabled_flag().store(false, Ordering::SeqCst);
            return Err(e);
        }
        Ok(())
    }

    /// Listening -> Idle；已空闲则无操作
    fn disable(&self) -> Result<(), CoreError> {
        if !self.enabled_flag().swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        info!(controller = self.name(), "disabled");
        self.unsubscribe()
    }
}
