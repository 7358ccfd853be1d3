//! 无头场景图
//!
//! 相机、光源、一个装饰网格和预分配的粒子网格池。粒子网格在收到第一份
//! 快照前全部隐藏；之后只更新快照覆盖到的前缀，其余网格保持原状。

use crate::config::SceneConfig;
use crate::physics::BurstConfig;
use glam::Vec3;
use std::f32::consts::PI;

/// 球体网格
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub position: Vec3,
    /// 欧拉角（弧度）
    pub rotation: Vec3,
    pub radius: f32,
    pub color: [f32; 3],
    pub visible: bool,
}

impl Mesh {
    pub fn sphere(name: impl Into<String>, radius: f32, color: [f32; 3]) -> Self {
        Self {
            name: name.into(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            radius,
            color,
            visible: true,
        }
    }
}

/// 环绕目标点的相机
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    /// 水平角
    pub alpha: f32,
    /// 俯仰角
    pub beta: f32,
    pub radius: f32,
    pub target: Vec3,
}

impl OrbitCamera {
    /// 相机在世界空间中的位置
    pub fn eye(&self) -> Vec3 {
        self.target
            + self.radius
                * Vec3::new(
                    self.alpha.cos() * self.beta.sin(),
                    self.beta.cos(),
                    self.alpha.sin() * self.beta.sin(),
                )
    }
}

/// 半球光
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphericLight {
    pub direction: Vec3,
    pub intensity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub camera: OrbitCamera,
    pub light: HemisphericLight,
    pub decor: Mesh,
    particles: Vec<Mesh>,
}

impl Scene {
    /// 创建场景并预分配 N³ 个隐藏的粒子网格
    pub fn new(scene: &SceneConfig, burst: &BurstConfig) -> Self {
        let particles = (0..burst.particle_count())
            .map(|i| {
                let mut mesh = Mesh::sphere(
                    format!("debris_{}", i),
                    burst.particle_radius,
                    [0.0, 1.0, 1.0],
                );
                mesh.visible = false;
                mesh
            })
            .collect();

        Self {
            camera: OrbitCamera {
                alpha: -PI / 2.0,
                beta: PI / 2.5,
                radius: scene.camera_distance,
                target: Vec3::ZERO,
            },
            light: HemisphericLight {
                direction: Vec3::Y,
                intensity: 1.0,
            },
            decor: Mesh::sphere("kaiju", scene.decor_radius, [0.8, 0.2, 0.2]),
            particles,
        }
    }

    pub fn rotate_decor(&mut self, step: f32) {
        self.decor.rotation.y += step;
    }

    /// 把平铺的位置序列应用到粒子网格，返回更新的网格数
    ///
    /// 序列超出网格池的部分被忽略；不足时只更新前缀。
    pub fn apply_positions(&mut self, positions: &[f32]) -> usize {
        let mut updated = 0;
        for (mesh, p) in self.particles.iter_mut().zip(positions.chunks_exact(3)) {
            mesh.visible = true;
            mesh.position = Vec3::new(p[0], p[1], p[2]);
            updated += 1;
        }
        updated
    }

    pub fn particles(&self) -> &[Mesh] {
        &self.particles
    }

    pub fn visible_particles(&self) -> usize {
        self.particles.iter().filter(|m| m.visible).count()
    }
}
