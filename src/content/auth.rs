use crate::core::error::AuthError;
use sha2::{Digest, Sha256};
use std::env;

/// 管理员密码校验
///
/// 比较的是两边的 SHA-256 摘要，耗时与公共前缀长度无关。
#[derive(Clone)]
pub struct AdminGate {
    expected: Option<[u8; 32]>,
    source: String,
}

impl AdminGate {
    /// 从环境变量读取密码；变量未设置时所有登录都失败
    pub fn from_env(var: &str) -> Self {
        let expected = env::var(var)
            .ok()
            .filter(|v| !v.is_empty())
            .map(|v| digest(&v));
        Self {
            expected,
            source: var.to_string(),
        }
    }

    pub fn with_password(password: &str) -> Self {
        Self {
            expected: Some(digest(password)),
            source: "<inline>".to_string(),
        }
    }

    pub fn check(&self, password: &str) -> Result<(), AuthError> {
        if password.is_empty() {
            return Err(AuthError::MissingPassword);
        }
        let expected = self
            .expected
            .as_ref()
            .ok_or_else(|| AuthError::NotConfigured(self.source.clone()))?;

        let given = digest(password);
        let diff = given
            .iter()
            .zip(expected.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));
        if diff == 0 {
            tracing::info!(target: "content", "Admin login successful");
            Ok(())
        } else {
            tracing::warn!(target: "content", "Admin login rejected");
            Err(AuthError::InvalidPassword)
        }
    }
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("configured", &self.expected.is_some())
            .field("source", &self.source)
            .finish()
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_password() {
        let gate = AdminGate::with_password("jaeger");
        assert_eq!(gate.check("jaeger"), Ok(()));
        assert_eq!(gate.check("kaiju"), Err(AuthError::InvalidPassword));
        assert_eq!(gate.check(""), Err(AuthError::MissingPassword));
    }

    #[test]
    fn test_unset_env_is_not_configured() {
        let gate = AdminGate::from_env("DEBRIS_FX_TEST_UNSET_PASSWORD_VAR");
        assert_eq!(
            gate.check("anything"),
            Err(AuthError::NotConfigured(
                "DEBRIS_FX_TEST_UNSET_PASSWORD_VAR".to_string()
            ))
        );
    }

    #[test]
    fn test_debug_hides_digest() {
        let gate = AdminGate::with_password("secret");
        let printed = format!("{:?}", gate);
        assert!(printed.contains("configured: true"));
        assert!(!printed.contains("secret"));
    }
}
