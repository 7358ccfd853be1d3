//! 核心模块
//!
//! - `error` - 错误类型定义
//! - `time` - 固定步长常量与帧节奏器
//! - `macros` - `impl_default!` 等辅助宏

pub mod error;
pub mod time;
#[macro_use]
pub mod macros;

// 重新导出错误类型
pub use error::{
    AuthError, ContentError, ContentResult, ControllerError, ControllerResult, FxError, FxResult,
    RenderError, RenderResult, WorkerError, WorkerResult,
};

pub use time::{period_from_hz, FramePacer, DEFAULT_TICK_RATE_HZ};
