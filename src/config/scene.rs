use super::{ConfigError, ConfigResult};
use crate::impl_default;
use serde::{Deserialize, Serialize};

/// 场景与渲染循环配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// 渲染目标帧率
    pub target_fps: u32,

    /// 装饰网格每帧绕 Y 轴旋转的弧度
    pub decor_rotation_step: f32,

    /// 装饰网格半径
    pub decor_radius: f32,

    /// 相机到原点的距离
    pub camera_distance: f32,
}

impl_default!(SceneConfig {
    target_fps: 60,
    decor_rotation_step: 0.01,
    decor_radius: 1.5,
    camera_distance: 10.0,
});

impl SceneConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.target_fps == 0 || self.target_fps > 1000 {
            return Err(ConfigError::ValidationError(
                "Invalid target FPS".to_string(),
            ));
        }
        if !self.decor_rotation_step.is_finite() {
            return Err(ConfigError::ValidationError(
                "Decor rotation step must be finite".to_string(),
            ));
        }
        if self.decor_radius <= 0.0 || self.camera_distance <= 0.0 {
            return Err(ConfigError::ValidationError(
                "Scene dimensions must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
