//! 宏子系统：离散动作状态机与顺序执行器

pub mod machine;
pub mod sequencer;

pub use machine::{CancelToken, Macro, MacroEvent, MacroEventKind, MacroOp, MacroStep};
pub use sequencer::{MacroController, MacroHandle};
