//! 硬件协作对象的能力边界
//!
//! 执行核心只在这些 trait 的接口上与硬件交互：差速底盘、
//! 闭环反馈控制器、里程/速率/角度探头。具体实现由机器人应用
//! 提供（厂商绑定或仿真），测试用桩实现。

/// 差速运动平台
///
/// 速度以 [-1, 1] 归一化；换挡是气动两速变速箱的上/下挡。
pub trait DrivePlatform: Send + Sync {
    fn set_speeds(&self, left: f64, right: f64);
    fn shift_up(&self);
    fn shift_down(&self);

    /// 停住底盘
    fn halt(&self) {
        self.set_speeds(0.0, 0.0);
    }
}

/// 闭环反馈控制器
///
/// 武装后由实现者自行闭环（读测量源、写输出）；宏只负责
/// 武装/撤防和轮询到位判定。每个宏实例拥有**自己的**控制器
/// 实例，同类型的多个宏可以安全并存。
pub trait FeedbackLoop: Send {
    /// 设定目标并开始闭环
    fn arm(&mut self, setpoint: f64);

    /// 停止闭环，输出归零
    fn disarm(&mut self);

    /// 测量值是否已进入容差带
    fn on_target(&self) -> bool;

    fn set_tolerance(&mut self, tolerance: f64);

    fn set_gains(&mut self, p: f64, i: f64, d: f64);
}

/// 里程/速率/角度探头（编码器、陀螺仪的读侧）
pub trait MotionProbe: Send + Sync {
    /// 累计里程，米
    fn distance(&self) -> f64;

    /// 当前速率，米/秒
    fn rate(&self) -> f64;

    /// 累计角度，度
    fn angle(&self) -> f64;
}
