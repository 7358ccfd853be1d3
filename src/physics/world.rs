use crate::config::SimulationConfig;
use crate::core::time::period_from_hz;
use crate::impl_default;
use glam::Vec3;
use rapier3d::prelude::*;

/// rapier3d 管线及其全部集合
///
/// 每个模拟线程拥有一个实例；地面碰撞体在创建后不会被移除。
pub struct PhysicsWorld3D {
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub query_pipeline: QueryPipeline,
    ground: Option<ColliderHandle>,
}

impl_default!(PhysicsWorld3D {
    gravity: vector![0.0, -9.81, 0.0],
    integration_parameters: IntegrationParameters::default(),
    physics_pipeline: PhysicsPipeline::new(),
    island_manager: IslandManager::new(),
    broad_phase: DefaultBroadPhase::new(),
    narrow_phase: NarrowPhase::new(),
    impulse_joint_set: ImpulseJointSet::new(),
    multibody_joint_set: MultibodyJointSet::new(),
    ccd_solver: CCDSolver::new(),
    rigid_body_set: RigidBodySet::new(),
    collider_set: ColliderSet::new(),
    query_pipeline: QueryPipeline::new(),
    ground: None,
});

impl PhysicsWorld3D {
    /// 按配置创建世界：重力、固定步长和地面
    pub fn from_config(config: &SimulationConfig) -> Self {
        let mut world = Self::default();
        world.gravity = to_vector(config.gravity);
        world.integration_parameters.dt = period_from_hz(config.tick_rate_hz).as_secs_f32();
        world.insert_ground(config.ground_half_extents);
        world
    }

    /// 插入静态地面；重复调用不会产生第二个地面
    pub fn insert_ground(&mut self, half_extents: Vec3) -> ColliderHandle {
        if let Some(handle) = self.ground {
            return handle;
        }
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .friction(0.5)
            .build();
        let handle = self.collider_set.insert(collider);
        self.ground = Some(handle);
        handle
    }

    pub fn ground(&self) -> Option<ColliderHandle> {
        self.ground
    }

    pub fn gravity(&self) -> Vec3 {
        Vec3::new(self.gravity.x, self.gravity.y, self.gravity.z)
    }

    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// 创建一个带球形碰撞体的动态粒子
    ///
    /// 冲量在创建时以速度增量 `J / m` 的形式施加，不依赖质量属性的更新时机。
    pub fn spawn_ball(&mut self, spec: &BallSpec) -> RigidBodyHandle {
        let velocity = spec.impulse / spec.mass;
        let body = RigidBodyBuilder::dynamic()
            .translation(to_vector(spec.position))
            .linvel(to_vector(velocity))
            .linear_damping(spec.linear_damping)
            .ccd_enabled(true)
            .build();
        let handle = self.rigid_body_set.insert(body);

        let collider = ColliderBuilder::ball(spec.radius)
            .mass(spec.mass)
            .friction(0.5)
            .build();
        let PhysicsWorld3D {
            rigid_body_set,
            collider_set,
            ..
        } = self;
        collider_set.insert_with_parent(collider, handle, rigid_body_set);
        handle
    }

    /// 移除刚体及其碰撞体
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> bool {
        self.rigid_body_set
            .remove(
                handle,
                &mut self.island_manager,
                &mut self.collider_set,
                &mut self.impulse_joint_set,
                &mut self.multibody_joint_set,
                true,
            )
            .is_some()
    }

    pub fn translation(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(handle).map(|rb| {
            let t = rb.translation();
            Vec3::new(t.x, t.y, t.z)
        })
    }

    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    pub fn collider_count(&self) -> usize {
        self.collider_set.len()
    }
}

/// 粒子创建参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallSpec {
    pub position: Vec3,
    pub impulse: Vec3,
    pub radius: f32,
    pub mass: f32,
    pub linear_damping: f32,
}

fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}
