//! 碎片物理模拟
//!
//! - `world` - rapier3d 世界封装：固定步长、地面、粒子创建与移除
//! - `simulation` - 模拟线程的状态：爆发参数、快照、世界工厂

pub mod simulation;
pub mod world;

pub use simulation::{
    BurstConfig, InitOutcome, RapierWorldFactory, SimulationState, TransformSnapshot,
    WorldFactory, MAX_GRID_SIZE,
};
pub use world::{BallSpec, PhysicsWorld3D};
