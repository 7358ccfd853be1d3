/// 统一配置系统
///
/// 提供TOML/JSON配置文件、环境变量覆盖和启动时校验
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod content;
pub mod scene;
pub mod simulation;

pub use content::ContentConfig;
pub use scene::SceneConfig;
pub use simulation::SimulationConfig;

use crate::{impl_default, impl_default_and_new};
use crate::physics::BurstConfig;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 主配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxConfig {
    /// 模拟线程配置
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// 爆发参数
    #[serde(default)]
    pub burst: BurstConfig,

    /// 场景与渲染循环
    #[serde(default)]
    pub scene: SceneConfig,

    /// 内容存储与管理员登录
    #[serde(default)]
    pub content: ContentConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl_default_and_new!(FxConfig {
    simulation: SimulationConfig::default(),
    burst: BurstConfig::default(),
    scene: SceneConfig::default(),
    content: ContentConfig::default(),
    logging: LoggingConfig::default(),
});

impl FxConfig {
    /// 从TOML文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_toml_str(&content)
    }

    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 从JSON文件加载配置
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(ConfigError::FileError)?;
        Self::from_json_str(&content)
    }

    /// 从JSON字符串解析配置
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// 保存为TOML文件
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::FileError)
    }

    /// 从环境变量覆盖配置
    pub fn apply_env_overrides(&mut self) {
        if let Some(hz) = parse_env("DEBRIS_FX_TICK_RATE") {
            self.simulation.tick_rate_hz = hz;
        }
        if let Some(n) = parse_env("DEBRIS_FX_GRID_SIZE") {
            self.burst.grid_size = n;
        }
        if let Some(fps) = parse_env("DEBRIS_FX_TARGET_FPS") {
            self.scene.target_fps = fps;
        }
        if let Some(seed) = parse_env("DEBRIS_FX_SEED") {
            self.simulation.seed = Some(seed);
        }
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        self.simulation.validate()?;
        self.burst.validate()?;
        self.scene.validate()?;
        self.content.validate()?;
        Ok(())
    }

    /// 自动查找并加载配置文件
    ///
    /// 按以下顺序查找：
    /// 1. ./debris_fx.toml
    /// 2. ./debris_fx.json
    /// 3. <config_dir>/debris_fx/config.toml
    /// 4. 使用默认配置
    pub fn load_or_default() -> Self {
        if let Ok(config) = Self::from_toml_file("debris_fx.toml") {
            tracing::info!(target: "config", "Loaded config from debris_fx.toml");
            return config;
        }

        if let Ok(config) = Self::from_json_file("debris_fx.json") {
            tracing::info!(target: "config", "Loaded config from debris_fx.json");
            return config;
        }

        if let Some(path) = user_config_path() {
            if let Ok(config) = Self::from_toml_file(&path) {
                tracing::info!(target: "config", "Loaded config from {:?}", path);
                return config;
            }
        }

        tracing::info!(target: "config", "Using default configuration");
        Self::default()
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("debris_fx").join("config.toml"))
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(target: "config", "Ignoring unparsable {}={:?}", key, raw);
            None
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别（`RUST_LOG` 未设置时使用）
    pub level: LogLevel,
}

impl_default!(LoggingConfig {
    level: LogLevel::Info,
});

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// 对应的 `EnvFilter` 指令
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
