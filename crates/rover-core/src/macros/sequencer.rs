//! MacroController - 宏序列执行器
//!
//! 一个 [`MacroController`] 是拥有有序宏列表的
//! [`EventController`]：使能时从头到尾逐个执行宏，任一时刻至多
//! 一个宏在执行。
//!
//! # 执行模型
//!
//! 序列推进是**显式循环**而不是"完成回调重入执行器"的递归——
//! 长序列不再增长调用栈，但语义保持不变：单线程、严格顺序、
//! 每个宏阻塞到其整个生命周期（含内部休眠循环）结束。
//! `enable()` 的调用线程被整个自主程序占用。
//!
//! # 超时与取消
//!
//! - 宏超时不是故障：记一条错误日志后序列照常推进
//!   （`Completed` 保证到达）。
//! - `disable()` 置位共享取消令牌并对每个宏调用 `kill()`。
//!   正在执行的宏无法在休眠中被打断，最迟在下一个轮询边界
//!   观察到取消并走正常析构；队列里未开始的宏从未存活，
//!   `kill()` 对它们是无操作。
//! - 某个宏的 `initialize`/`perform` 报错时，剩余序列被放弃，
//!   错误从阻塞的 `enable()` 调用返回。

use crate::controller::EventController;
use crate::error::CoreError;
use crate::macros::machine::{CancelToken, Macro};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicIsize, Ordering};
use tracing::{error, info};

/// 共享的宏句柄
///
/// 序列执行器与外部观察者（订阅进度事件、查询状态）共享所有权；
/// 锁的粒度即"一次完整执行"——执行期间外部拿不到锁，这正是
/// "至多一个宏在执行"不变式的体现。
pub type MacroHandle = Arc<Mutex<Macro>>;

/// 顺序宏执行器
pub struct MacroController {
    name: String,
    enabled: AtomicBool,
    macros: Mutex<Vec<MacroHandle>>,
    /// 当前执行位置；-1 表示序列未开始
    current: AtomicIsize,
    cancel: CancelToken,
}

impl MacroController {
    pub fn new(name: impl Into<String>) -> Self {
        MacroController {
            name: name.into(),
            enabled: AtomicBool::new(false),
            macros: Mutex::new(Vec::new()),
            current: AtomicIsize::new(-1),
            cancel: CancelToken::new(),
        }
    }

    /// 组合期追加一个宏，返回共享句柄供外部订阅进度
    pub fn add_macro(&self, m: Macro) -> MacroHandle {
        let handle = Arc::new(Mutex::new(m));
        let mut macros = self.macros.lock();
        macros.push(Arc::clone(&handle));
        info!(
            controller = %self.name,
            position = macros.len(),
            "added macro to sequence"
        );
        handle
    }

    pub fn num_macros(&self) -> usize {
        self.macros.lock().len()
    }

    /// 当前执行下标；-1 表示尚未推进到第一个宏
    pub fn current_index(&self) -> isize {
        self.current.load(Ordering::SeqCst)
    }

    /// 本序列的取消令牌（只读视角，外部可观察取消状态）
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }
}

impl EventController for MacroController {
    fn name(&self) -> &str {
        &self.name
    }

    fn enabled_flag(&self) -> &AtomicBool {
        &self.enabled
    }

    /// 阻塞执行整个宏序列
    fn subscribe(&self) -> Result<(), CoreError> {
        self.cancel.clear();
        let queue: Vec<MacroHandle> = self.macros.lock().clone();

        for handle in &queue {
            handle.lock().reset();
        }
        self.current.store(-1, Ordering::SeqCst);
        info!(controller = %self.name, count = queue.len(), "starting macro sequence");

        for (index, handle) in queue.iter().enumerate() {
            if !self.is_enabled() || self.cancel.is_cancelled() {
                info!(controller = %self.name, "sequence aborted before macro {index}");
                return Ok(());
            }
            self.current.store(index as isize, Ordering::SeqCst);

            let mut m = handle.lock();
            info!(controller = %self.name, name = %m.name(), "starting macro");
            match m.execute(&self.cancel) {
                Ok(()) => {
                    if m.is_timed_out() {
                        // 超时不是故障：序列照常推进
                        error!(controller = %self.name, name = %m.name(), "macro timed out, moving on");
                    }
                    info!(controller = %self.name, name = %m.name(), "completed macro");
                }
                Err(e) => {
                    error!(
                        controller = %self.name,
                        name = %m.name(),
                        error = %e,
                        "macro failed, abandoning rest of sequence"
                    );
                    self.enabled.store(false, Ordering::SeqCst);
                    return Err(e);
                }
            }
        }

        info!(controller = %self.name, status = "ok", "completed all macros, waiting for teleop");
        Ok(())
    }

    /// 强杀所有宏
    ///
    /// 正在执行的宏持有自身的锁，`kill()` 会等到它在下一个轮询
    /// 边界退出后才拿到锁——此时它已经析构过，二次 `kill()` 是
    /// 无操作。
    fn unsubscribe(&self) -> Result<(), CoreError> {
        self.cancel.cancel();
        let queue: Vec<MacroHandle> = self.macros.lock().clone();
        for handle in &queue {
            let mut m = handle.lock();
            if let Err(e) = m.kill() {
                error!(controller = %self.name, name = %m.name(), error = %e, "kill failed");
            }
        }
        info!(controller = %self.name, "all macros killed");
        Ok(())
    }
}
