//! Constants - 数值常量源
//!
//! 执行核心自身不解析配置：宏和控制器通过 [`ConstantsSource`]
//! 能力读取调参数值（PID 增益、容差、速度上限……）。
//!
//! [`Constants`] 是该能力的文件实现：扁平的 `key -> f64` 表，
//! 从 TOML 文件加载，支持热重载。`reload()` 重新读文件、整表
//! 替换，随后按插入顺序通知订阅者——调参流程依赖这个顺序是
//! 确定的。
//!
//! # 文件格式
//!
//! ```toml
//! drive_p = 0.8
//! drive_i = 0.0
//! drive_d = 0.2
//! drive_tolerance = 0.05
//! ```
//!
//! 缺键是错误而不是哨兵值：配置错误应当在组合阶段就失败。

use crate::error::CoreError;
use crate::event::Bus;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// 常量重载事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantsEvent;

/// 常量源能力：按键读取数值，支持订阅重载
pub trait ConstantsSource: Send + Sync {
    fn value(&self, key: &str) -> Result<f64, CoreError>;

    /// 重载事件总线
    fn updates(&self) -> &Bus<ConstantsEvent>;
}

/// TOML 文件常量表
pub struct Constants {
    path: PathBuf,
    table: RwLock<HashMap<String, f64>>,
    updates: Bus<ConstantsEvent>,
}

impl Constants {
    /// 从 TOML 文件加载；IO 或格式错误在此即失败
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref().to_path_buf();
        let table = Self::parse(&path)?;
        info!(path = %path.display(), count = table.len(), status = "ok", "constants loaded");
        Ok(Constants {
            path,
            table: RwLock::new(table),
            updates: Bus::new(),
        })
    }

    fn parse(path: &Path) -> Result<HashMap<String, f64>, CoreError> {
        let text = std::fs::read_to_string(path)?;
        let parsed: toml::Table = text.parse()?;

        let mut table = HashMap::with_capacity(parsed.len());
        for (key, value) in parsed {
            let number = match value {
                toml::Value::Float(f) => f,
                toml::Value::Integer(i) => i as f64,
                _ => return Err(CoreError::NonNumericConstant(key)),
            };
            table.insert(key, number);
        }
        Ok(table)
    }

    /// 重新读文件并整表替换，随后通知订阅者
    pub fn reload(&self) -> Result<(), CoreError> {
        let fresh = Self::parse(&self.path)?;
        *self.table.write() = fresh;
        info!(path = %self.path.display(), "constants reloaded");
        self.updates.publish(&ConstantsEvent);
        Ok(())
    }

    /// 表中常量个数
    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for Constants {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Constants")
            .field("path", &self.path)
            .field("count", &self.len())
            .finish()
    }
}

impl ConstantsSource for Constants {
    fn value(&self, key: &str) -> Result<f64, CoreError> {
        self.table
            .read()
            .get(key)
            .copied()
            .ok_or_else(|| CoreError::MissingConstant(key.to_string()))
    }

    fn updates(&self) -> &Bus<ConstantsEvent> {
        &self.updates
    }
}
