use anyhow::Result;
use debris_fx::config::SimulationConfig;
use debris_fx::controller::LABEL_UNAVAILABLE;
use debris_fx::core::{ControllerError, WorkerError, WorkerResult};
use debris_fx::physics::{BurstConfig, PhysicsWorld3D, WorldFactory};
use debris_fx::{
    ControllerState, EffectController, FxConfig, HeadlessRenderer, HostMessage,
    SimulationWorker, WorkerEvents, WorkerMessage,
};
use std::time::{Duration, Instant};

const BUDGET: Duration = Duration::from_secs(2);

fn seeded() -> SimulationConfig {
    SimulationConfig {
        seed: Some(2024),
        ..Default::default()
    }
}

fn next_positions(events: &WorkerEvents) -> Vec<f32> {
    match events.recv_timeout(BUDGET).expect("positions within budget") {
        WorkerMessage::Positions(snapshot) => snapshot.positions,
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_init_then_idle() -> Result<()> {
    let (worker, events) = SimulationWorker::spawn(seeded())?;
    worker.post(HostMessage::Init);

    assert_eq!(events.recv_timeout(BUDGET)?, WorkerMessage::Initialized);

    // 没有触发前不应产生任何快照
    std::thread::sleep(Duration::from_millis(150));
    assert!(events.try_recv().is_err());
    Ok(())
}

#[test]
fn test_first_burst_snapshot_length() -> Result<()> {
    let (worker, events) = SimulationWorker::spawn(seeded())?;
    worker.post(HostMessage::Init);
    assert_eq!(events.recv_timeout(BUDGET)?, WorkerMessage::Initialized);

    worker.post(HostMessage::trigger_effect());
    assert_eq!(next_positions(&events).len(), 192);
    Ok(())
}

#[test]
fn test_particles_stay_above_ground() -> Result<()> {
    let config = seeded();
    let ground_top = config.ground_top();
    let ground_bottom = -config.ground_half_extents.y;
    let (worker, events) = SimulationWorker::spawn(config)?;
    worker.post(HostMessage::Init);
    assert_eq!(events.recv_timeout(BUDGET)?, WorkerMessage::Initialized);

    // 落地瞬间允许短暂嵌入地面，但球心不能穿过地面底部
    worker.post(HostMessage::trigger_effect());
    let mut positions = Vec::new();
    let mut last_tick = 0;
    while last_tick < 600 {
        let snapshot = match events.recv_timeout(BUDGET)? {
            WorkerMessage::Positions(snapshot) => snapshot,
            other => panic!("unexpected {:?}", other),
        };
        for y in snapshot.positions.iter().skip(1).step_by(3) {
            assert!(*y > ground_bottom, "particle tunnelled through ground: {}", y);
        }
        last_tick = snapshot.tick;
        positions = snapshot.positions;
    }

    // 约 10 秒后全部碎片静止在地面之上
    assert_eq!(positions.len(), 192);
    for y in positions.iter().skip(1).step_by(3) {
        assert!(*y > ground_top, "particle below ground after settling: {}", y);
    }
    Ok(())
}

#[test]
fn test_double_trigger_keeps_one_set() -> Result<()> {
    let (worker, events) = SimulationWorker::spawn(seeded())?;
    worker.post(HostMessage::Init);
    assert_eq!(events.recv_timeout(BUDGET)?, WorkerMessage::Initialized);

    worker.post(HostMessage::trigger_effect());
    worker.post(HostMessage::trigger_effect());

    for _ in 0..10 {
        assert_eq!(next_positions(&events).len(), 192);
    }
    Ok(())
}

#[test]
fn test_custom_grid_size() -> Result<()> {
    let (worker, events) = SimulationWorker::spawn(seeded())?;
    worker.post(HostMessage::Init);
    assert_eq!(events.recv_timeout(BUDGET)?, WorkerMessage::Initialized);

    worker.post(HostMessage::TriggerEffect {
        burst: BurstConfig {
            grid_size: 3,
            ..Default::default()
        },
    });
    assert_eq!(next_positions(&events).len(), 81);
    Ok(())
}

#[test]
fn test_controller_full_cycle() -> Result<()> {
    let mut config = FxConfig::default();
    config.simulation = seeded();
    config.scene.target_fps = 120;

    let renderer = HeadlessRenderer::default();
    let stats = renderer.stats();
    let mut controller = EffectController::mount(&config, Box::new(renderer))?;

    assert_eq!(controller.wait_until_settled(BUDGET)?, &ControllerState::Ready);
    assert_eq!(controller.scene().visible_particles(), 0);

    controller.trigger()?;
    let deadline = Instant::now() + BUDGET;
    while controller.snapshots_applied() < 5 && Instant::now() < deadline {
        controller.run_frames(1)?;
    }

    assert!(controller.snapshots_applied() >= 5);
    assert_eq!(controller.scene().visible_particles(), 64);
    assert!(stats.frames() > 0);

    controller.unmount();
    assert!(stats.is_disposed());
    Ok(())
}

#[test]
fn test_unmount_right_after_trigger() -> Result<()> {
    let mut config = FxConfig::default();
    config.simulation = seeded();
    let mut controller = EffectController::mount(&config, Box::new(HeadlessRenderer::default()))?;
    assert_eq!(controller.wait_until_settled(BUDGET)?, &ControllerState::Ready);

    controller.trigger()?;
    controller.unmount();

    let applied = controller.snapshots_applied();
    let positions: Vec<_> = controller
        .scene()
        .particles()
        .iter()
        .map(|m| m.position)
        .collect();

    std::thread::sleep(Duration::from_millis(100));
    controller.run_frames(3)?;

    assert_eq!(controller.state(), &ControllerState::Unmounted);
    assert_eq!(controller.snapshots_applied(), applied);
    let after: Vec<_> = controller
        .scene()
        .particles()
        .iter()
        .map(|m| m.position)
        .collect();
    assert_eq!(positions, after);
    Ok(())
}

#[test]
fn test_unmount_before_initialized() -> Result<()> {
    let mut controller =
        EffectController::mount(&FxConfig::default(), Box::new(HeadlessRenderer::default()))?;
    controller.unmount();
    assert!(controller.trigger().is_err());
    drop(controller);
    Ok(())
}

#[test]
fn test_controller_holds_one_pending_snapshot() -> Result<()> {
    let mut config = FxConfig::default();
    config.simulation = seeded();
    let mut controller = EffectController::mount(&config, Box::new(HeadlessRenderer::default()))?;
    assert_eq!(controller.wait_until_settled(BUDGET)?, &ControllerState::Ready);

    // 不渲染帧时快照被覆盖而不是排队
    controller.trigger()?;
    std::thread::sleep(Duration::from_millis(500));
    assert!(controller.pending_snapshots() <= 1);

    controller.frame()?;
    assert_eq!(controller.snapshots_applied(), 1);
    let tick = controller.last_tick().unwrap_or(0);
    assert!(tick > 10, "applied snapshot is stale: tick {}", tick);
    Ok(())
}

struct MissingRuntime;

impl WorldFactory for MissingRuntime {
    fn create_world(&self, _config: &SimulationConfig) -> WorkerResult<PhysicsWorld3D> {
        Err(WorkerError::RuntimeLoad("physics module unavailable".to_string()))
    }
}

#[test]
fn test_controller_reports_failed_runtime() -> Result<()> {
    let renderer = HeadlessRenderer::default();
    let stats = renderer.stats();
    let mut controller = EffectController::mount_with_factory(
        &FxConfig::default(),
        Box::new(renderer),
        Box::new(MissingRuntime),
    )?;

    let expected = ControllerState::Failed {
        reason: "physics module unavailable".to_string(),
    };
    assert_eq!(controller.wait_until_settled(BUDGET)?, &expected);
    assert_eq!(controller.trigger_label(), LABEL_UNAVAILABLE);
    assert!(!controller.trigger_enabled());
    assert!(matches!(
        controller.trigger(),
        Err(ControllerError::Unavailable(_))
    ));

    // 失败后继续渲染，但粒子始终隐藏
    controller.run_frames(3)?;
    assert_eq!(controller.state(), &expected);
    assert_eq!(controller.scene().visible_particles(), 0);
    assert!(stats.frames() > 0);
    Ok(())
}
