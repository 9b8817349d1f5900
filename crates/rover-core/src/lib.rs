//! rover-core - 移动机器人执行核心
//!
//! 本 crate 实现一台由多个独立执行机构（底盘、发射器、拾取器、
//! 攀爬器）组成的机器人的协调核心。难点不在任何单一机构，而在
//! 执行模型本身：
//!
//! - [`process`] — 带生命周期管理的命名执行单元，可选后台轮询线程
//! - [`sensor`] / [`poller`] — 槽位化读数存储、变更通知与周期采样
//! - [`controller`] — 监听/空闲二态事件控制器
//! - [`macros`] — 离散动作状态机（初始化 → perform 循环 →
//!   超时/完成 → 析构）与把宏串成自主程序的顺序执行器
//! - [`event`] — 插入有序的发布/订阅总线，贯穿以上各层
//! - [`constants`] — 数值常量源（TOML 文件实现，支持热重载）
//!
//! # 两个调度域
//!
//! 后台轮询域（每个 poller 一条线程，持续刷新传感器并发布变更
//! 事件）与宏执行域（完全同步、单线程：`enable()` 的调用线程被
//! 整个自主序列阻塞占用）相互独立。`PositionTracker` 与传感器
//! 槽位都不加事务纪律，正确性依赖"同一时刻至多一个宏在执行"
//! 这一由序列执行器保证的不变式。
//!
//! 硬件驱动（电机、电磁阀、编码器、陀螺仪）、闭环控制原语与
//! 视觉评分算法都是外部协作对象，以能力 trait 的形式出现在
//! 下游 crate（`rover-motion`）的接口边界上。

pub mod constants;
pub mod controller;
pub mod error;
pub mod event;
pub mod macros;
pub mod poller;
pub mod process;
pub mod sensor;

pub use constants::{Constants, ConstantsEvent, ConstantsSource};
pub use controller::EventController;
pub use error::CoreError;
pub use event::{Bus, SubscriberId};
pub use macros::{
    CancelToken, Macro, MacroController, MacroEvent, MacroEventKind, MacroHandle, MacroOp,
    MacroStep,
};
pub use poller::SensorPoller;
pub use process::{Pollable, Process};
pub use sensor::{Sensor, SensorDriver, SensorEvent};

/// 初始化全局日志订阅者
///
/// 过滤级别取 `RUST_LOG`，缺省 `info`。重复调用是无操作，
/// 因此测试和应用都可以放心调用。
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
