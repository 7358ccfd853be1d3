//! 模拟线程与控制器之间的消息协议
//!
//! | 方向 | 类型 | 负载 |
//! |---|---|---|
//! | host → worker | `init` | 无 |
//! | host → worker | `triggerEffect` | `BurstConfig`（可省略，使用默认值） |
//! | worker → host | `initialized` | 无 |
//! | worker → host | `failed` | `reason` |
//! | worker → host | `positions` | `tick` + 平铺的位置序列 |
//!
//! 所有消息都是单向的，没有应答，也没有请求/响应关联。
//! JSON 编码以 `type` 字段区分消息，无法识别的消息解码为 `None` 并被忽略。

use crate::physics::{BurstConfig, TransformSnapshot};
use serde::{Deserialize, Serialize};

/// host → worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostMessage {
    /// 幂等的初始化请求
    Init,
    /// 替换当前粒子并爆发
    TriggerEffect {
        #[serde(default)]
        burst: BurstConfig,
    },
}

impl HostMessage {
    /// 使用默认爆发参数的 `triggerEffect`
    pub fn trigger_effect() -> Self {
        HostMessage::TriggerEffect {
            burst: BurstConfig::default(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            HostMessage::Init => "init",
            HostMessage::TriggerEffect { .. } => "triggerEffect",
        }
    }

    /// 解码 JSON 消息，格式错误或类型未知时返回 `None`
    pub fn decode(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(msg) => Some(msg),
            Err(e) => {
                tracing::debug!(target: "protocol", "Ignoring malformed host message: {}", e);
                None
            }
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// worker → host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkerMessage {
    /// 世界和地面已就绪，只发送一次
    Initialized,
    /// 物理运行时加载失败，效果永久不可用
    Failed { reason: String },
    /// 最新的位置快照
    Positions(TransformSnapshot),
}

impl WorkerMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerMessage::Initialized => "initialized",
            WorkerMessage::Failed { .. } => "failed",
            WorkerMessage::Positions(_) => "positions",
        }
    }

    pub fn decode(raw: &str) -> Option<Self> {
        match serde_json::from_str(raw) {
            Ok(msg) => Some(msg),
            Err(e) => {
                tracing::debug!(target: "protocol", "Ignoring malformed worker message: {}", e);
                None
            }
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_host_messages() {
        assert_eq!(HostMessage::decode(r#"{"type":"init"}"#), Some(HostMessage::Init));
        assert_eq!(
            HostMessage::decode(r#"{"type":"triggerEffect"}"#),
            Some(HostMessage::trigger_effect())
        );

        let custom = HostMessage::decode(r#"{"type":"triggerEffect","burst":{"gridSize":2}}"#);
        match custom {
            Some(HostMessage::TriggerEffect { burst }) => {
                assert_eq!(burst.grid_size, 2);
                assert_eq!(burst.spacing, 0.4);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_malformed_messages_are_ignored() {
        assert_eq!(HostMessage::decode(r#"{"type":"explode"}"#), None);
        assert_eq!(HostMessage::decode(r#"{"payload":1}"#), None);
        assert_eq!(HostMessage::decode("not json"), None);
        assert_eq!(WorkerMessage::decode(r#"{"type":"positions"}"#), None);
    }

    #[test]
    fn test_positions_wire_shape() {
        let msg = WorkerMessage::Positions(TransformSnapshot {
            tick: 3,
            positions: vec![0.0, 1.0, 2.0],
        });
        let value: serde_json::Value = serde_json::from_str(&msg.encode().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({ "type": "positions", "tick": 3, "positions": [0.0, 1.0, 2.0] })
        );
    }

    #[test]
    fn test_status_wire_shape() {
        assert_eq!(
            WorkerMessage::Initialized.encode().unwrap(),
            r#"{"type":"initialized"}"#
        );
        let failed = WorkerMessage::Failed {
            reason: "boom".to_string(),
        };
        assert_eq!(WorkerMessage::decode(&failed.encode().unwrap()), Some(failed));
    }
}
