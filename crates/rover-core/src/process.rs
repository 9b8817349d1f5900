//! Process - 带生命周期管理的命名执行单元
//!
//! 一个 [`Process`] 要么是纯被动对象（无轮询周期），要么在
//! [`Process::start_polling`] 后拥有一个后台轮询线程：循环调用
//! [`Pollable::poll`] 钩子，然后休眠固定周期，直到 [`Process::halt`]。
//!
//! # 生命周期
//!
//! - 构造后不运行，必须显式 `start_polling`
//! - `halt()` 只做标记，轮询线程在下一次醒来时观察到并退出
//!   （没有即时取消，取消粒度为一个轮询周期）
//! - 线程退出后可以再次 `start_polling`；从不自动重启
//!
//! # 使用示例
//!
//! ```rust,no_run
//! use rover_core::process::{Pollable, Process};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! struct Heartbeat;
//! impl Pollable for Heartbeat {
//!     fn poll(&self) {
//!         tracing::trace!("tick");
//!     }
//! }
//!
//! let process = Process::polling("heartbeat", Duration::from_millis(100));
//! process.start_polling(Arc::new(Heartbeat)).unwrap();
//! // ...
//! process.halt();
//! ```

use crate::error::CoreError;
use parking_lot::Mutex;
use spin_sleep::SpinSleeper;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// 周期性工作的能力钩子
///
/// 在构造/启动时绑定到 [`Process`]，取代基类继承：轮询线程每个周期
/// 调用一次 `poll()`。
pub trait Pollable: Send + Sync {
    fn poll(&self);
}

/// 命名的可控进程
///
/// 最多拥有一个后台轮询线程。所有日志通过 `tracing` 输出，
/// 并带上进程名。
pub struct Process {
    name: String,
    interval: Option<Duration>,
    running: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Process {
    /// 创建一个不轮询的被动进程
    pub fn passive(name: impl Into<String>) -> Self {
        Process {
            name: name.into(),
            interval: None,
            running: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        }
    }

    /// 创建一个轮询进程，`interval` 为两次 `poll()` 之间的休眠时间
    pub fn polling(name: impl Into<String>, interval: Duration) -> Self {
        Process {
            name: name.into(),
            interval: Some(interval),
            running: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        self.interval
    }

    /// 启动后台轮询线程
    ///
    /// 被动进程上调用是无操作；已在运行时调用也是无操作。
    pub fn start_polling(&self, target: Arc<dyn Pollable>) -> Result<(), CoreError> {
        let Some(interval) = self.interval else {
            trace!(process = %self.name, "passive process, nothing to poll");
            return Ok(());
        };
        let mut worker = self.worker.lock();
        if matches!(&*worker, Some(handle) if !handle.is_finished()) {
            warn!(process = %self.name, "already polling, ignoring start request");
            return Ok(());
        }

        self.running.store(true, Ordering::Release);
        let running = Arc::clone(&self.running);
        let name = self.name.clone();

        let handle = std::thread::Builder::new().name(self.name.clone()).spawn(move || {
            debug!(process = %name, ?interval, "poll loop started");
            let sleeper = SpinSleeper::default();
            while running.load(Ordering::Acquire) {
                target.poll();
                sleeper.sleep(interval);
            }
            debug!(process = %name, "poll loop exited");
        })?;
        *worker = Some(handle);
        Ok(())
    }

    /// 请求停止；轮询线程在下一次醒来时退出
    pub fn halt(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// 后台轮询线程当前是否存活
    pub fn is_running(&self) -> bool {
        matches!(&*self.worker.lock(), Some(handle) if !handle.is_finished())
    }
}

impl std::fmt::Debug for Process {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Process")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .field("running", &self.running.load(Ordering::Relaxed))
            .finish()
    }
}
