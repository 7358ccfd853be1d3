use super::{ConfigError, ConfigResult};
use crate::impl_default;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 内容存储与管理员登录配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// JSON 内容文件路径
    pub data_path: PathBuf,

    /// 保存管理员密码的环境变量名
    pub admin_password_env: String,
}

impl_default!(ContentConfig {
    data_path: PathBuf::from("data/content.json"),
    admin_password_env: "ADMIN_PASSWORD".to_string(),
});

impl ContentConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.data_path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "Content data path is empty".to_string(),
            ));
        }
        if self.admin_password_env.is_empty() {
            return Err(ConfigError::ValidationError(
                "Admin password variable name is empty".to_string(),
            ));
        }
        Ok(())
    }
}
