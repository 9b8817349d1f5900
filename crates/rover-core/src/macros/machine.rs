//! Macro - 离散动作状态机
//!
//! 一个 [`Macro`] 描述一段有时间上限的离散动作（转过 N 度、直行
//! N 米、发射……），主要服务于自主模式。状态机：
//!
//! ```text
//! NotStarted --execute()--> Initializing --initialize() ok--> Running
//! Running --perform() 周期调用，期间 sleep(poll_interval)--> Running
//! Running --elapsed >= timeout--> TimedOut --> Completed
//! Running --perform() 返回 Finished--> Completed
//! Completed --自动 kill()--> 已析构（die() 已执行，alive = false）
//! ```
//!
//! # 关键语义
//!
//! - **重放保护**: 每次 `execute()` 只认一个执行通道；在 `reset()`
//!   之前的重复调用被静默忽略。
//! - **阻塞执行**: `execute()` 在调用者线程上同步运行整个
//!   perform 循环（含休眠），直到完成、超时或被取消。
//! - **超时双通知**: 超时路径上先发布 `TimedOut` 再发布
//!   `Completed`。`Completed` 对任何正常退出路径都保证到达，
//!   序列推进依赖这一点——不要"修掉"这个双通知。
//! - **协作取消**: 取消令牌在每个轮询边界被检查；宏在休眠中
//!   无法被打断，取消最迟在下一个轮询边界生效。
//!
//! # 错误路径
//!
//! `initialize` / `perform` / `die` 不做任何重试。`initialize` 失败
//! 时宏从未存活，`die` 不会被调用；`perform` 失败时照常执行
//! `kill()` 析构；两种情况下都**不**发布 `Completed`，错误从
//! `execute()` 向上传播并中止所在序列。

use crate::error::CoreError;
use crate::event::Bus;
use spin_sleep::SpinSleeper;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// `perform()` 的单步结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroStep {
    /// 动作未完成，下个周期继续
    Continue,
    /// 动作完成，退出 perform 循环
    Finished,
}

/// 宏的行为能力，构造时绑定到 [`Macro`]
///
/// 三个钩子对应状态机的三个阶段；任何一个返回错误都会中止
/// 本次执行（见模块文档的错误路径说明）。
pub trait MacroOp: Send {
    /// 进入 Running 前的一次性准备（采基线读数、武装反馈环……）
    fn initialize(&mut self) -> Result<(), CoreError>;

    /// 每个轮询周期调用一次；返回 [`MacroStep::Finished`] 宣告完成
    fn perform(&mut self) -> Result<MacroStep, CoreError>;

    /// 析构钩子：撤防反馈环、停住执行机构、提交里程
    fn die(&mut self) -> Result<(), CoreError>;
}

/// 宏生命周期事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroEvent {
    pub name: String,
    pub kind: MacroEventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroEventKind {
    Initialized,
    TimedOut,
    Completed,
}

/// 协作取消令牌
///
/// 克隆共享同一标记位。执行中的宏在每个轮询边界检查它；
/// 置位后宏走正常析构路径退出（`die()` 执行、`Completed` 发布）。
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// 复位，令牌可重用
    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// perform 循环的缺省周期
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 离散动作状态机
pub struct Macro {
    name: String,
    timeout: Duration,
    poll_interval: Duration,
    started: bool,
    initialized: bool,
    completed: bool,
    timed_out: bool,
    alive: bool,
    op: Box<dyn MacroOp>,
    events: Bus<MacroEvent>,
}

impl Macro {
    /// 创建宏，perform 周期取缺省 50ms
    pub fn new(name: impl Into<String>, timeout: Duration, op: Box<dyn MacroOp>) -> Self {
        Macro {
            name: name.into(),
            timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
            started: false,
            initialized: false,
            completed: false,
            timed_out: false,
            alive: false,
            op,
            events: Bus::new(),
        }
    }

    /// 设置 perform 循环周期
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// perform 循环是否已结束（完成、超时或被杀）
    pub fn is_done(&self) -> bool {
        self.completed
    }

    pub fn is_timed_out(&self) -> bool {
        self.timed_out
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// 生命周期事件总线（插入有序投递）
    pub fn events(&self) -> &Bus<MacroEvent> {
        &self.events
    }

    /// 回到 NotStarted，清除全部状态标记，宏可再次执行
    pub fn reset(&mut self) {
        self.started = false;
        self.initialized = false;
        self.completed = false;
        self.timed_out = false;
        self.alive = false;
    }

    fn publish(&self, kind: MacroEventKind) {
        self.events.publish(&MacroEvent { name: self.name.clone(), kind });
    }

    /// 执行宏：阻塞调用者线程直到整个生命周期结束
    ///
    /// 重放保护：`reset()` 之前的再次调用是无操作并立即返回 `Ok`。
    pub fn execute(&mut self, cancel: &CancelToken) -> Result<(), CoreError> {
        if self.started {
            // 按设计静默忽略，而不是报错
            return Ok(());
        }
        self.started = true;

        info!(name = %self.name, "initializing macro");
        self.op.initialize()?;
        self.initialized = true;
        self.alive = true;
        self.publish(MacroEventKind::Initialized);

        let start = Instant::now();
        let sleeper = SpinSleeper::default();

        while !self.completed {
            if cancel.is_cancelled() {
                info!(name = %self.name, "cancelled at poll boundary");
                self.completed = true;
                break;
            }

            match self.op.perform() {
                Ok(MacroStep::Finished) => {
                    self.completed = true;
                    break;
                }
                Ok(MacroStep::Continue) => {}
                Err(e) => {
                    error!(name = %self.name, error = %e, "perform failed, tearing down");
                    if let Err(die_err) = self.kill() {
                        error!(name = %self.name, error = %die_err, "die also failed");
                    }
                    return Err(e);
                }
            }

            sleeper.sleep(self.poll_interval);

            if start.elapsed() >= self.timeout {
                self.completed = true;
                self.timed_out = true;
                warn!(name = %self.name, timeout = ?self.timeout, "macro timed out");
                self.publish(MacroEventKind::TimedOut);
            }
        }

        self.kill()?;
        // Completed 无条件发布：超时路径上它跟在 TimedOut 之后
        self.publish(MacroEventKind::Completed);
        Ok(())
    }

    /// 析构：仅在存活时执行一次 `die()`，同时强制结束 perform 循环
    ///
    /// 正常执行路径会自动调用；也可用于外部强杀未在执行的宏。
    pub fn kill(&mut self) -> Result<(), CoreError> {
        if self.alive {
            info!(name = %self.name, "killing macro");
            self.completed = true;
            self.alive = false;
            self.op.die()?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Macro {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Macro")
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .field("started", &self.started)
            .field("completed", &self.completed)
            .field("timed_out", &self.timed_out)
            .field("alive", &self.alive)
            .finish()
    }
}
