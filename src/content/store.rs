use crate::core::error::{ContentError, ContentResult};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// 不透明的 JSON 文档存储
pub trait ContentStore {
    fn read(&self) -> ContentResult<Value>;

    /// 写入整个文档，只接受 JSON 对象
    fn write(&self, document: &Value) -> ContentResult<()>;
}

/// 单个 JSON 文件作为存储
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContentStore for JsonFileStore {
    fn read(&self) -> ContentResult<Value> {
        let raw = fs::read_to_string(&self.path).map_err(|e| {
            tracing::error!(target: "content", "Error reading {:?}: {}", self.path, e);
            e
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn write(&self, document: &Value) -> ContentResult<()> {
        if !document.is_object() {
            return Err(ContentError::InvalidFormat(
                "content must be a JSON object".to_string(),
            ));
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let pretty = serde_json::to_string_pretty(document)?;
        fs::write(&self.path, pretty)?;
        tracing::info!(target: "content", "Content updated at {:?}", self.path);
        Ok(())
    }
}
