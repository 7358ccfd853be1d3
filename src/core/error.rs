//! 统一错误处理模块
//!
//! 每个边界一个错误枚举，由 `FxError` 聚合：
//!
//! - **Worker** (`WorkerError`): 物理运行时加载失败、线程启动失败
//! - **Controller** (`ControllerError`): 触发动作被拒绝、渲染失败
//! - **Render** (`RenderError`): 渲染后端错误
//! - **Content** (`ContentError`, `AuthError`): 内容存储与管理员登录
//!
//! 消息通道上不传播错误：过早的命令、无法识别的消息和销毁后到达的消息
//! 都只记录日志并被忽略。初始化失败通过 `WorkerMessage::Failed` 显式上报。

use crate::config::ConfigError;
use thiserror::Error;

/// 顶层错误类型
#[derive(Error, Debug)]
pub enum FxError {
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    #[error("Controller error: {0}")]
    Controller(#[from] ControllerError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// 模拟线程错误
#[derive(Error, Debug)]
pub enum WorkerError {
    /// 物理运行时无法加载或世界无法创建
    #[error("Physics runtime failed to load: {0}")]
    RuntimeLoad(String),

    /// 模拟线程无法启动
    #[error("Failed to spawn simulation worker: {0}")]
    Spawn(#[source] std::io::Error),
}

/// 效果控制器错误
#[derive(Error, Debug)]
pub enum ControllerError {
    /// 尚未收到 `initialized`
    #[error("Physics is still loading")]
    NotReady,

    /// 模拟线程初始化失败，效果永久不可用
    #[error("Effect unavailable: {0}")]
    Unavailable(String),

    /// 控制器已卸载
    #[error("Controller has been unmounted")]
    Unmounted,

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// 渲染系统错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Render backend already disposed")]
    Disposed,

    #[error("Render backend error: {0}")]
    Backend(String),
}

/// 内容存储错误
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Content file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Content parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

/// 管理员登录错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Password is required")]
    MissingPassword,

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Admin password is not configured ({0} is unset)")]
    NotConfigured(String),
}

/// 结果类型别名
pub type FxResult<T> = Result<T, FxError>;
pub type WorkerResult<T> = Result<T, WorkerError>;
pub type ControllerResult<T> = Result<T, ControllerError>;
pub type RenderResult<T> = Result<T, RenderError>;
pub type ContentResult<T> = Result<T, ContentError>;
