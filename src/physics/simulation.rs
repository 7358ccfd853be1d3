//! 模拟线程的全部状态
//!
//! `SimulationState` 是每个模拟线程唯一持有的状态，由消息处理函数和步进函数
//! 显式借用；不经过任何消息层即可直接构造、触发和步进，便于测试。

use super::world::{BallSpec, PhysicsWorld3D};
use crate::config::{ConfigError, ConfigResult, SimulationConfig};
use crate::core::error::{WorkerError, WorkerResult};
use crate::impl_default;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rapier3d::prelude::RigidBodyHandle;
use serde::{Deserialize, Serialize};

/// 单次爆发允许的最大网格边长
pub const MAX_GRID_SIZE: u32 = 32;

/// 一次爆发的参数
///
/// 序列化使用 camelCase（与消息协议一致）；配置文件中也接受 snake_case 写法。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BurstConfig {
    /// 立方网格边长 N，粒子数为 N³
    #[serde(alias = "grid_size")]
    pub grid_size: u32,
    /// 网格间距
    pub spacing: f32,
    /// 网格最低一层的高度
    #[serde(alias = "base_height")]
    pub base_height: f32,
    #[serde(alias = "particle_radius")]
    pub particle_radius: f32,
    /// 水平冲量在 [-h, h] 内均匀分布（x 与 z 独立）
    #[serde(alias = "horizontal_impulse")]
    pub horizontal_impulse: f32,
    /// 竖直冲量在 [0, v] 内均匀分布
    #[serde(alias = "vertical_impulse")]
    pub vertical_impulse: f32,
    #[serde(alias = "particle_mass")]
    pub particle_mass: f32,
    #[serde(alias = "linear_damping")]
    pub linear_damping: f32,
}

impl_default!(BurstConfig {
    grid_size: 4,
    spacing: 0.4,
    base_height: 3.0,
    particle_radius: 0.1,
    horizontal_impulse: 2.5,
    vertical_impulse: 5.0,
    particle_mass: 1.0,
    linear_damping: 0.5,
});

impl BurstConfig {
    /// 本次爆发的粒子数 N³
    pub fn particle_count(&self) -> usize {
        let n = self.grid_size.min(MAX_GRID_SIZE) as usize;
        n * n * n
    }

    /// 第 (i, j, k) 个格点的初始位置，水平方向以原点为中心
    pub fn lattice_position(&self, i: u32, j: u32, k: u32) -> Vec3 {
        let center = (self.grid_size.min(MAX_GRID_SIZE) as f32 - 1.0) / 2.0;
        Vec3::new(
            (i as f32 - center) * self.spacing,
            self.base_height + j as f32 * self.spacing,
            (k as f32 - center) * self.spacing,
        )
    }

    /// 随机的“爆炸”冲量
    pub fn random_impulse<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let h = self.horizontal_impulse.abs();
        let v = self.vertical_impulse.abs();
        Vec3::new(
            rng.gen_range(-h..=h),
            rng.gen_range(0.0..=v),
            rng.gen_range(-h..=h),
        )
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.grid_size == 0 || self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::ValidationError(format!(
                "Grid size must be in 1..={}, got {}",
                MAX_GRID_SIZE, self.grid_size
            )));
        }
        let positive = [self.spacing, self.particle_radius, self.particle_mass];
        if positive.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(ConfigError::ValidationError(
                "Spacing, radius and mass must be positive".to_string(),
            ));
        }
        let non_negative = [
            self.horizontal_impulse,
            self.vertical_impulse,
            self.linear_damping,
        ];
        if non_negative.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ConfigError::ValidationError(
                "Impulses and damping must be non-negative".to_string(),
            ));
        }
        if !self.base_height.is_finite() {
            return Err(ConfigError::ValidationError(
                "Base height must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// 一次步进后的粒子位置快照
///
/// `positions` 按粒子创建顺序平铺为 `[x0, y0, z0, x1, ...]`，
/// 长度恒为 `3 × 粒子数`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformSnapshot {
    /// 模拟线程内部的步进计数
    pub tick: u64,
    pub positions: Vec<f32>,
}

impl TransformSnapshot {
    pub fn particle_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn position(&self, index: usize) -> Option<Vec3> {
        self.positions
            .get(index * 3..index * 3 + 3)
            .map(Vec3::from_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.positions.chunks_exact(3).map(Vec3::from_slice)
    }
}

/// 物理运行时的加载入口
///
/// 世界创建失败必须以错误返回，而不是留下一个未设置的世界。
pub trait WorldFactory: Send {
    fn create_world(&self, config: &SimulationConfig) -> WorkerResult<PhysicsWorld3D>;
}

/// 默认的 rapier3d 运行时
#[derive(Debug, Default, Clone, Copy)]
pub struct RapierWorldFactory;

impl WorldFactory for RapierWorldFactory {
    fn create_world(&self, config: &SimulationConfig) -> WorkerResult<PhysicsWorld3D> {
        config
            .validate()
            .map_err(|e| WorkerError::RuntimeLoad(e.to_string()))?;
        Ok(PhysicsWorld3D::from_config(config))
    }
}

/// `init` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// 世界和地面刚刚创建
    Created,
    /// 已经初始化过，本次调用无效果
    AlreadyInitialized,
}

/// 模拟线程状态
pub struct SimulationState {
    config: SimulationConfig,
    factory: Box<dyn WorldFactory>,
    world: Option<PhysicsWorld3D>,
    failure: Option<String>,
    particles: Vec<RigidBodyHandle>,
    tick: u64,
    rng: StdRng,
}

impl SimulationState {
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_factory(config, Box::new(RapierWorldFactory))
    }

    pub fn with_factory(config: SimulationConfig, factory: Box<dyn WorldFactory>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            factory,
            world: None,
            failure: None,
            particles: Vec::new(),
            tick: 0,
            rng,
        }
    }

    /// 创建世界和地面，只在第一次调用时生效
    ///
    /// 加载失败后不重试：之后的每次调用都返回同一个失败原因。
    pub fn init(&mut self) -> WorkerResult<InitOutcome> {
        if self.world.is_some() {
            return Ok(InitOutcome::AlreadyInitialized);
        }
        if let Some(reason) = &self.failure {
            return Err(WorkerError::RuntimeLoad(reason.clone()));
        }
        match self.factory.create_world(&self.config) {
            Ok(world) => {
                self.world = Some(world);
                Ok(InitOutcome::Created)
            }
            Err(e) => {
                let reason = match &e {
                    WorkerError::RuntimeLoad(reason) => reason.clone(),
                    other => other.to_string(),
                };
                self.failure = Some(reason);
                Err(e)
            }
        }
    }

    /// 替换当前粒子集合并施加爆发冲量，返回新粒子数
    ///
    /// 世界尚未创建时静默返回 0。
    pub fn trigger_effect(&mut self, burst: &BurstConfig) -> usize {
        let Some(world) = self.world.as_mut() else {
            tracing::debug!(target: "worker", "triggerEffect before init, ignored");
            return 0;
        };

        for handle in self.particles.drain(..) {
            world.remove_body(handle);
        }

        if burst.grid_size > MAX_GRID_SIZE {
            tracing::debug!(
                target: "worker",
                "Grid size {} clamped to {}",
                burst.grid_size,
                MAX_GRID_SIZE
            );
        }
        let n = burst.grid_size.min(MAX_GRID_SIZE);
        self.particles.reserve(burst.particle_count());
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    let spec = BallSpec {
                        position: burst.lattice_position(i, j, k),
                        impulse: burst.random_impulse(&mut self.rng),
                        radius: burst.particle_radius,
                        mass: burst.particle_mass,
                        linear_damping: burst.linear_damping,
                    };
                    self.particles.push(world.spawn_ball(&spec));
                }
            }
        }
        self.particles.len()
    }

    /// 步进一次并返回快照；无世界或无粒子时什么也不做
    pub fn step(&mut self) -> Option<TransformSnapshot> {
        let world = self.world.as_mut()?;
        if self.particles.is_empty() {
            return None;
        }

        world.step();
        self.tick += 1;

        let mut positions = Vec::with_capacity(self.particles.len() * 3);
        for (index, handle) in self.particles.iter().enumerate() {
            // 快照长度必须保持 3 × 粒子数，缺失的刚体以原点占位
            let p = match world.translation(*handle) {
                Some(p) => p,
                None => {
                    tracing::warn!(
                        target: "worker",
                        "Particle {} has no rigid body at tick {}",
                        index,
                        self.tick
                    );
                    Vec3::ZERO
                }
            };
            positions.extend_from_slice(&[p.x, p.y, p.z]);
        }

        Some(TransformSnapshot {
            tick: self.tick,
            positions,
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.world.is_some()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn world(&self) -> Option<&PhysicsWorld3D> {
        self.world.as_ref()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}
