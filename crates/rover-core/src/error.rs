//! 核心层错误类型定义

use thiserror::Error;

/// 执行核心错误类型
#[derive(Error, Debug)]
pub enum CoreError {
    /// IO 错误（常量文件读取、轮询线程创建等）
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 常量文件格式错误
    #[error("Malformed constants file: {0}")]
    ConstantsParse(#[from] toml::de::Error),

    /// 常量缺失（配置错误在组合阶段即为致命）
    #[error("Constant \"{0}\" not found")]
    MissingConstant(String),

    /// 常量存在但不是数值
    #[error("Constant \"{0}\" is not numeric")]
    NonNumericConstant(String),

    /// 无效配置（非法轮询周期、非法超时等）
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// 硬件协作对象报告的故障
    #[error("Hardware fault: {0}")]
    Hardware(String),

    /// 宏的某个阶段（initialize / perform / die）失败
    #[error("Macro \"{name}\" failed during {stage}: {message}")]
    MacroStage {
        name: String,
        stage: &'static str,
        message: String,
    },
}
