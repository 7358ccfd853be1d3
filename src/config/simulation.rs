use super::{ConfigError, ConfigResult};
use crate::impl_default;
use crate::core::time::DEFAULT_TICK_RATE_HZ;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// 模拟线程配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// 步进频率
    pub tick_rate_hz: u32,

    /// 重力
    pub gravity: Vec3,

    /// 地面碰撞盒半尺寸，顶面位于 `y = ground_half_extents.y`
    pub ground_half_extents: Vec3,

    /// 随机种子，`None` 使用系统熵
    pub seed: Option<u64>,
}

impl_default!(SimulationConfig {
    tick_rate_hz: DEFAULT_TICK_RATE_HZ,
    gravity: Vec3::new(0.0, -9.81, 0.0),
    ground_half_extents: Vec3::new(20.0, 0.1, 20.0),
    seed: None,
});

impl SimulationConfig {
    /// 地面顶面高度
    pub fn ground_top(&self) -> f32 {
        self.ground_half_extents.y
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.tick_rate_hz == 0 || self.tick_rate_hz > 1000 {
            return Err(ConfigError::ValidationError(format!(
                "Invalid tick rate: {}",
                self.tick_rate_hz
            )));
        }
        if !self.gravity.is_finite() {
            return Err(ConfigError::ValidationError(
                "Gravity must be finite".to_string(),
            ));
        }
        if !self.ground_half_extents.is_finite() || self.ground_half_extents.min_element() <= 0.0 {
            return Err(ConfigError::ValidationError(
                "Ground half extents must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
