//! 站点内容后端
//!
//! 与碎片效果无关的两个外部协作者：单文件 JSON 内容存储和管理员密码校验。

pub mod auth;
pub mod store;

pub use auth::AdminGate;
pub use store::{ContentStore, JsonFileStore};
