//! 碎片效果控制器
//!
//! 拥有可见场景，在用户操作和模拟线程之间传递消息。
//!
//! ## 状态机
//!
//! ```text
//! Unmounted ─mount─► Idle ─initialized─► Ready ◄─┐ positions
//!                     │                    └─────┘
//!                     └────failed────► Failed
//! 任意状态 ─unmount─► Unmounted
//! ```
//!
//! 渲染循环与模拟线程互不等待：每一帧先取走所有已到达的消息，只应用其中
//! 最新的一份快照，再旋转装饰网格并渲染。卸载后到达的消息一律忽略。

use crate::config::FxConfig;
use crate::core::error::{ControllerError, ControllerResult, FxResult};
use crate::core::time::FramePacer;
use crate::physics::{RapierWorldFactory, TransformSnapshot, WorldFactory};
use crate::protocol::{HostMessage, WorkerMessage};
use crate::render::{RenderBackend, Scene};
use crate::worker::{SimulationWorker, WorkerEvents};
use std::time::{Duration, Instant};

/// 触发按钮在加载中的文字
pub const LABEL_LOADING: &str = "Physics Loading...";
/// 触发按钮可用时的文字
pub const LABEL_READY: &str = "VIEW REPORT (Click for Effect)";
/// 初始化失败后的文字
pub const LABEL_UNAVAILABLE: &str = "Effect Unavailable";

/// 控制器状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerState {
    Unmounted,
    /// 等待 `initialized`
    Idle,
    /// 触发动作可用
    Ready,
    /// 模拟线程初始化失败，终态
    Failed { reason: String },
}

pub struct EffectController {
    state: ControllerState,
    config: FxConfig,
    scene: Scene,
    renderer: Option<Box<dyn RenderBackend>>,
    worker: Option<SimulationWorker>,
    events: Option<WorkerEvents>,
    pacer: FramePacer,
    last_tick: Option<u64>,
    snapshots_applied: u64,
    frames: u64,
}

impl EffectController {
    /// 挂载：创建场景和粒子网格池，启动模拟线程并发送 `init`
    ///
    /// 不等待模拟线程就绪，返回时处于 `Idle`。
    pub fn mount(config: &FxConfig, renderer: Box<dyn RenderBackend>) -> FxResult<Self> {
        Self::mount_with_factory(config, renderer, Box::new(RapierWorldFactory))
    }

    pub fn mount_with_factory(
        config: &FxConfig,
        renderer: Box<dyn RenderBackend>,
        factory: Box<dyn WorldFactory>,
    ) -> FxResult<Self> {
        let scene = Scene::new(&config.scene, &config.burst);
        let (worker, events) =
            SimulationWorker::spawn_with_factory(config.simulation.clone(), factory)?;
        worker.post(HostMessage::Init);

        tracing::info!(
            target: "controller",
            "Mounted with {} particle meshes",
            scene.particles().len()
        );

        Ok(Self {
            state: ControllerState::Idle,
            config: config.clone(),
            scene,
            renderer: Some(renderer),
            worker: Some(worker),
            events: Some(events),
            pacer: FramePacer::new(config.scene.target_fps),
            last_tick: None,
            snapshots_applied: 0,
            frames: 0,
        })
    }

    /// 卸载：停止渲染循环、终止模拟线程、释放渲染资源
    ///
    /// 任何时刻都可以调用，重复调用无效果。
    pub fn unmount(&mut self) {
        if self.state == ControllerState::Unmounted {
            return;
        }
        self.state = ControllerState::Unmounted;
        // 先丢弃接收端，线程中尚未送达的消息不再处理
        self.events = None;
        if let Some(mut worker) = self.worker.take() {
            worker.terminate();
        }
        if let Some(mut renderer) = self.renderer.take() {
            renderer.dispose();
        }
        tracing::info!(
            target: "controller",
            "Unmounted after {} frames, {} snapshots applied",
            self.frames,
            self.snapshots_applied
        );
    }

    /// 渲染一帧：处理已到达的消息，旋转装饰网格，渲染
    pub fn frame(&mut self) -> ControllerResult<()> {
        if self.state == ControllerState::Unmounted {
            return Ok(());
        }
        self.pump_messages();

        self.scene.rotate_decor(self.config.scene.decor_rotation_step);
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render(&self.scene)?;
        }
        self.frames += 1;
        Ok(())
    }

    /// 按目标帧率连续渲染 `frames` 帧
    pub fn run_frames(&mut self, frames: u64) -> ControllerResult<()> {
        for _ in 0..frames {
            if self.state == ControllerState::Unmounted {
                break;
            }
            self.pacer.wait();
            self.frame()?;
        }
        Ok(())
    }

    /// 渲染直到离开 `Idle` 或超时，返回最终状态
    pub fn wait_until_settled(&mut self, timeout: Duration) -> ControllerResult<&ControllerState> {
        let deadline = Instant::now() + timeout;
        while self.state == ControllerState::Idle && Instant::now() < deadline {
            self.pacer.wait();
            self.frame()?;
        }
        Ok(&self.state)
    }

    /// 用户触发动作：仅在 `Ready` 时发送 `triggerEffect`
    pub fn trigger(&self) -> ControllerResult<()> {
        match &self.state {
            ControllerState::Ready => {
                let message = HostMessage::TriggerEffect {
                    burst: self.config.burst.clone(),
                };
                if let Some(worker) = self.worker.as_ref() {
                    worker.post(message);
                }
                Ok(())
            }
            ControllerState::Idle => Err(ControllerError::NotReady),
            ControllerState::Failed { reason } => Err(ControllerError::Unavailable(reason.clone())),
            ControllerState::Unmounted => Err(ControllerError::Unmounted),
        }
    }

    /// 处理一条来自模拟线程的消息
    pub fn handle_message(&mut self, message: WorkerMessage) {
        match message {
            WorkerMessage::Positions(snapshot) => self.apply_snapshot(&snapshot),
            other => self.apply_status(other),
        }
    }

    fn pump_messages(&mut self) {
        let pending: Vec<WorkerMessage> = match self.events.as_ref() {
            Some(events) => events.try_iter().collect(),
            None => return,
        };

        let mut latest: Option<TransformSnapshot> = None;
        for message in pending {
            match message {
                WorkerMessage::Positions(snapshot) => latest = Some(snapshot),
                other => self.apply_status(other),
            }
        }
        if let Some(snapshot) = latest {
            self.apply_snapshot(&snapshot);
        }
    }

    fn apply_status(&mut self, message: WorkerMessage) {
        if self.state != ControllerState::Idle {
            tracing::debug!(
                target: "controller",
                "Ignoring {} in state {:?}",
                message.kind(),
                self.state
            );
            return;
        }
        match message {
            WorkerMessage::Initialized => {
                tracing::info!(target: "controller", "Physics ready");
                self.state = ControllerState::Ready;
            }
            WorkerMessage::Failed { reason } => {
                tracing::warn!(target: "controller", "Effect unavailable: {}", reason);
                self.state = ControllerState::Failed { reason };
            }
            WorkerMessage::Positions(_) => {}
        }
    }

    fn apply_snapshot(&mut self, snapshot: &TransformSnapshot) {
        if self.state != ControllerState::Ready {
            tracing::debug!(
                target: "controller",
                "Ignoring positions in state {:?}",
                self.state
            );
            return;
        }
        if self.last_tick.is_some_and(|last| snapshot.tick < last) {
            tracing::debug!(target: "controller", "Dropping stale snapshot {}", snapshot.tick);
            return;
        }
        self.scene.apply_positions(&snapshot.positions);
        self.last_tick = Some(snapshot.tick);
        self.snapshots_applied += 1;
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// 就绪标志
    pub fn is_ready(&self) -> bool {
        self.state == ControllerState::Ready
    }

    pub fn trigger_enabled(&self) -> bool {
        self.is_ready()
    }

    pub fn trigger_label(&self) -> &'static str {
        match self.state {
            ControllerState::Ready => LABEL_READY,
            ControllerState::Failed { .. } => LABEL_UNAVAILABLE,
            ControllerState::Idle | ControllerState::Unmounted => LABEL_LOADING,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn last_tick(&self) -> Option<u64> {
        self.last_tick
    }

    /// 已到达但尚未应用的快照数，不会超过 1
    pub fn pending_snapshots(&self) -> usize {
        self.events
            .as_ref()
            .map_or(0, WorkerEvents::pending_snapshots)
    }

    pub fn snapshots_applied(&self) -> u64 {
        self.snapshots_applied
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Drop for EffectController {
    fn drop(&mut self) {
        self.unmount();
    }
}
