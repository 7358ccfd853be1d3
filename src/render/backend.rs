//! 渲染后端抽象
//!
//! 控制器只通过 `RenderBackend` 与渲染引擎交互：逐帧渲染场景、响应尺寸变化、
//! 卸载时释放全部 GPU 资源。`HeadlessRenderer` 不做任何绘制，只统计帧数，
//! 用于命令行演示和测试。

use super::scene::Scene;
use crate::core::error::{RenderError, RenderResult};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

pub trait RenderBackend: Send {
    /// 渲染一帧
    fn render(&mut self, scene: &Scene) -> RenderResult<()>;

    /// 画布尺寸变化
    fn resize(&mut self, _width: u32, _height: u32) {}

    /// 释放渲染引擎和全部 GPU 资源，可重复调用
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;
}

/// 无头渲染统计，可在渲染器被装箱后继续观察
#[derive(Debug, Default)]
pub struct RenderStats {
    frames: AtomicU64,
    visible_particles: AtomicUsize,
    disposed: AtomicBool,
}

impl RenderStats {
    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }

    pub fn visible_particles(&self) -> usize {
        self.visible_particles.load(Ordering::Relaxed)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct HeadlessRenderer {
    width: u32,
    height: u32,
    stats: Arc<RenderStats>,
}

impl HeadlessRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            stats: Arc::new(RenderStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<RenderStats> {
        self.stats.clone()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new(640, 256)
    }
}

impl RenderBackend for HeadlessRenderer {
    fn render(&mut self, scene: &Scene) -> RenderResult<()> {
        if self.is_disposed() {
            return Err(RenderError::Disposed);
        }
        self.stats
            .visible_particles
            .store(scene.visible_particles(), Ordering::Relaxed);
        self.stats.frames.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn dispose(&mut self) {
        if !self.stats.disposed.swap(true, Ordering::SeqCst) {
            tracing::debug!(target: "render", "Headless renderer disposed");
        }
    }

    fn is_disposed(&self) -> bool {
        self.stats.is_disposed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::physics::BurstConfig;

    #[test]
    fn test_headless_counts_frames() {
        let scene = Scene::new(&SceneConfig::default(), &BurstConfig::default());
        let mut renderer = HeadlessRenderer::default();
        let stats = renderer.stats();

        renderer.render(&scene).unwrap();
        renderer.render(&scene).unwrap();
        assert_eq!(stats.frames(), 2);
        assert_eq!(stats.visible_particles(), 0);
    }

    #[test]
    fn test_render_after_dispose_fails() {
        let scene = Scene::new(&SceneConfig::default(), &BurstConfig::default());
        let mut renderer = HeadlessRenderer::default();
        renderer.dispose();
        renderer.dispose();

        assert!(renderer.is_disposed());
        assert_eq!(renderer.render(&scene), Err(RenderError::Disposed));
    }

    #[test]
    fn test_resize() {
        let mut renderer = HeadlessRenderer::new(10, 10);
        renderer.resize(800, 600);
        assert_eq!(renderer.size(), (800, 600));
    }
}
