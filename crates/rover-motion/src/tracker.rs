//! PositionTracker - 航位推算位姿估计
//!
//! 进程级共享的位姿 `(x, y, heading)`：直行/转向宏在析构时提交
//! 实际走过的里程，自主程序作者在组合期用它计算下一段的目标。
//! 显式对象、经 `Arc` 传给每个需要读写它的宏——不是隐藏的全局
//! 单例。
//!
//! # 坐标约定
//!
//! 航向角以**度**计，0° 沿 +y 方向，顺时针增大：
//! `notify_drive(d)` 把 `d` 沿当前航向投影为
//! `(d·sin θ, d·cos θ)`。不建模任何锁纪律之外的并发——按约定
//! 只有宏执行线程写入它。

use parking_lot::Mutex;

/// 位姿快照
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    /// 航向角，度
    pub heading: f64,
}

/// 航位推算跟踪器
#[derive(Debug, Default)]
pub struct PositionTracker {
    pose: Mutex<Pose>,
}

impl PositionTracker {
    /// 从原点、航向 0° 开始
    pub fn new() -> Self {
        Self::default()
    }

    /// 覆盖当前位姿
    pub fn set_position(&self, x: f64, y: f64, heading: f64) {
        *self.pose.lock() = Pose { x, y, heading };
    }

    /// 提交一段沿当前航向的直行里程（米）
    pub fn notify_drive(&self, distance: f64) {
        let mut pose = self.pose.lock();
        let heading = pose.heading.to_radians();
        pose.x += distance * heading.sin();
        pose.y += distance * heading.cos();
    }

    /// 提交一次顺时针转向（度）
    pub fn notify_turn(&self, delta_heading: f64) {
        self.pose.lock().heading += delta_heading;
    }

    /// 当前位置到目标点的直线距离
    pub fn distance_from(&self, target_x: f64, target_y: f64) -> f64 {
        let pose = self.pose.lock();
        (target_x - pose.x).hypot(target_y - pose.y)
    }

    /// 指向目标点所需的相对转角（度）
    ///
    /// atan2 的参数是 (Δx, Δy)——航向系里 0° 朝 +y，与数学系相反。
    pub fn angle_from(&self, target_x: f64, target_y: f64) -> f64 {
        let pose = self.pose.lock();
        let delta_x = target_x - pose.x;
        let delta_y = target_y - pose.y;
        delta_x.atan2(delta_y).to_degrees() - pose.heading
    }

    /// 转到绝对航向 `target_heading` 所需的相对转角（度）
    pub fn turn_angle(&self, target_heading: f64) -> f64 {
        target_heading - self.pose.lock().heading
    }

    /// 位姿快照
    pub fn pose(&self) -> Pose {
        *self.pose.lock()
    }
}
