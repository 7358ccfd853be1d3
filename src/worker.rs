//! 后台模拟线程
//!
//! 物理世界运行在独立线程中，只通过两条单向通道与宿主通信：
//!
//! ```text
//! ┌─────────────────┐   HostMessage    ┌──────────────────┐
//! │   Controller    │ ───────────────► │ Simulation Thread│
//! │ (render thread) │                  │  SimulationState │
//! │                 │ ◄─────────────── │  + fixed ticker  │
//! └─────────────────┘  WorkerMessage   └──────────────────┘
//! ```
//!
//! 消息按发送顺序逐条同步处理；`init` 成功后启动固定间隔的步进定时器，
//! 每次步进产生一份位置快照。
//!
//! 状态消息（`initialized` / `failed`）走无界通道，一条都不会丢；位置快照走
//! 容量为 1 的槽位，新快照覆盖尚未取走的旧快照。宿主停止取消息时，
//! 待处理的快照始终最多一份。
//!
//! ## 使用示例
//!
//! ```ignore
//! let (mut worker, events) = SimulationWorker::spawn(SimulationConfig::default())?;
//! worker.post(HostMessage::Init);
//! // ... 等待 WorkerMessage::Initialized
//! worker.post(HostMessage::trigger_effect());
//! worker.terminate();
//! ```

use crate::config::SimulationConfig;
use crate::core::error::{WorkerError, WorkerResult};
use crate::core::time::period_from_hz;
use crate::physics::{
    InitOutcome, RapierWorldFactory, SimulationState, TransformSnapshot, WorldFactory,
};
use crate::protocol::{HostMessage, WorkerMessage};
use crossbeam_channel::{
    bounded, never, select, tick, unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError,
    TrySendError,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// 投递给模拟线程的命令
#[derive(Debug)]
enum WorkerCommand {
    Message(HostMessage),
    Shutdown,
}

/// 模拟线程句柄
///
/// `Drop` 时终止线程并等待其退出，不会遗留继续发送消息的定时器。
pub struct SimulationWorker {
    command_tx: Sender<WorkerCommand>,
    thread_handle: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
}

impl SimulationWorker {
    /// 启动使用 rapier3d 运行时的模拟线程，返回句柄和事件接收端
    pub fn spawn(config: SimulationConfig) -> WorkerResult<(Self, WorkerEvents)> {
        Self::spawn_with_factory(config, Box::new(RapierWorldFactory))
    }

    pub fn spawn_with_factory(
        config: SimulationConfig,
        factory: Box<dyn WorldFactory>,
    ) -> WorkerResult<(Self, WorkerEvents)> {
        let (command_tx, command_rx) = unbounded::<WorkerCommand>();
        let (status_tx, status_rx) = unbounded::<WorkerMessage>();
        let (positions_tx, positions_rx) = bounded::<TransformSnapshot>(1);
        let running = Arc::new(AtomicBool::new(true));

        let running_clone = running.clone();
        let overwrite_rx = positions_rx.clone();
        let thread_handle = thread::Builder::new()
            .name("debris-fx-sim".to_string())
            .spawn(move || {
                let state = SimulationState::with_factory(config, factory);
                let slot = SnapshotSlot {
                    tx: positions_tx,
                    overwrite: overwrite_rx,
                };
                WorkerRunner::new(state, status_tx, slot).run(command_rx);
                running_clone.store(false, Ordering::SeqCst);
            })
            .map_err(WorkerError::Spawn)?;

        Ok((
            Self {
                command_tx,
                thread_handle: Some(thread_handle),
                running,
            },
            WorkerEvents {
                status: status_rx,
                positions: positions_rx,
            },
        ))
    }

    /// 发送消息（非阻塞），线程已退出时返回 false
    pub fn post(&self, message: HostMessage) -> bool {
        self.command_tx
            .send(WorkerCommand::Message(message))
            .is_ok()
    }

    /// 发送 JSON 编码的消息，无法解码的消息直接丢弃
    pub fn post_raw(&self, raw: &str) -> bool {
        match HostMessage::decode(raw) {
            Some(message) => self.post(message),
            None => false,
        }
    }

    /// 检查线程是否运行中
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// 终止线程并等待退出，可重复调用
    pub fn terminate(&mut self) {
        let _ = self.command_tx.send(WorkerCommand::Shutdown);
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                tracing::error!(target: "worker", "Simulation thread panicked");
            }
            self.running.store(false, Ordering::SeqCst);
        }
    }
}

impl Drop for SimulationWorker {
    fn drop(&mut self) {
        self.terminate();
    }
}

/// 模拟线程发往宿主的事件接收端
///
/// 状态消息优先于位置快照返回，因此 `initialized` 总是先于第一份快照。
#[derive(Debug)]
pub struct WorkerEvents {
    status: Receiver<WorkerMessage>,
    positions: Receiver<TransformSnapshot>,
}

impl WorkerEvents {
    /// 非阻塞地取一条消息
    pub fn try_recv(&self) -> Result<WorkerMessage, TryRecvError> {
        if let Ok(message) = self.status.try_recv() {
            return Ok(message);
        }
        self.positions.try_recv().map(WorkerMessage::Positions)
    }

    /// 阻塞到有消息、线程退出或截止时间
    pub fn recv_deadline(&self, deadline: Instant) -> Result<WorkerMessage, RecvTimeoutError> {
        if let Ok(message) = self.try_recv() {
            return Ok(message);
        }
        let timeout = deadline.saturating_duration_since(Instant::now());
        select! {
            recv(self.status) -> message => message.map_err(|_| RecvTimeoutError::Disconnected),
            recv(self.positions) -> snapshot => snapshot
                .map(WorkerMessage::Positions)
                .map_err(|_| RecvTimeoutError::Disconnected),
            default(timeout) => Err(RecvTimeoutError::Timeout),
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<WorkerMessage, RecvTimeoutError> {
        self.recv_deadline(Instant::now() + timeout)
    }

    /// 依次取出所有已到达的消息：先状态消息，再至多一份快照
    pub fn try_iter(&self) -> impl Iterator<Item = WorkerMessage> + '_ {
        std::iter::from_fn(move || self.try_recv().ok())
    }

    /// 尚未取走的快照数，不会超过 1
    pub fn pending_snapshots(&self) -> usize {
        self.positions.len()
    }
}

/// 容量为 1 的最新快照槽位
struct SnapshotSlot {
    tx: Sender<TransformSnapshot>,
    /// 同一通道的接收端，用于丢弃宿主尚未取走的旧快照
    overwrite: Receiver<TransformSnapshot>,
}

impl SnapshotSlot {
    /// 写入快照，覆盖尚未取走的旧快照
    fn publish(&self, snapshot: TransformSnapshot) {
        if let Err(TrySendError::Full(snapshot)) = self.tx.try_send(snapshot) {
            if let Ok(stale) = self.overwrite.try_recv() {
                tracing::trace!(target: "worker", "Snapshot {} overwritten", stale.tick);
            }
            // 只有本线程写入，腾出位置后必定成功
            let _ = self.tx.try_send(snapshot);
        }
    }
}

/// 模拟线程主循环
struct WorkerRunner {
    state: SimulationState,
    status: Sender<WorkerMessage>,
    positions: SnapshotSlot,
    ticker: Receiver<Instant>,
}

impl WorkerRunner {
    fn new(state: SimulationState, status: Sender<WorkerMessage>, positions: SnapshotSlot) -> Self {
        Self {
            state,
            status,
            positions,
            ticker: never(),
        }
    }

    fn run(mut self, commands: Receiver<WorkerCommand>) {
        tracing::debug!(target: "worker", "Simulation thread started");
        loop {
            let ticker = self.ticker.clone();
            let keep_running = select! {
                recv(commands) -> command => match command {
                    Ok(WorkerCommand::Message(message)) => self.handle(message),
                    Ok(WorkerCommand::Shutdown) | Err(_) => false,
                },
                recv(ticker) -> _ => self.on_tick(),
            };
            if !keep_running {
                break;
            }
        }
        tracing::info!(
            target: "worker",
            "Simulation thread exiting after {} ticks",
            self.state.tick()
        );
    }

    fn handle(&mut self, message: HostMessage) -> bool {
        match message {
            HostMessage::Init => self.on_init(),
            HostMessage::TriggerEffect { burst } => {
                let count = self.state.trigger_effect(&burst);
                if count > 0 {
                    tracing::debug!(target: "worker", "Burst spawned {} particles", count);
                }
                true
            }
        }
    }

    fn on_init(&mut self) -> bool {
        match self.state.init() {
            Ok(InitOutcome::Created) => {
                let period = period_from_hz(self.state.config().tick_rate_hz);
                tracing::info!(target: "worker", "Physics world ready, ticking every {:?}", period);
                // 先通知就绪，再启动定时器
                let sent = self.emit(WorkerMessage::Initialized);
                self.ticker = tick(period);
                sent
            }
            Ok(InitOutcome::AlreadyInitialized) => {
                tracing::debug!(target: "worker", "Duplicate init ignored");
                true
            }
            Err(e) => {
                tracing::error!(target: "worker", "Physics init failed: {}", e);
                let reason = self.state.failure().unwrap_or("unknown").to_string();
                self.emit(WorkerMessage::Failed { reason })
            }
        }
    }

    fn on_tick(&mut self) -> bool {
        if let Some(snapshot) = self.state.step() {
            tracing::trace!(target: "worker", "tick {}", snapshot.tick);
            self.positions.publish(snapshot);
        }
        true
    }

    /// 宿主已丢弃状态接收端时返回 false，线程随之退出
    fn emit(&self, message: WorkerMessage) -> bool {
        self.status.send(message).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{BurstConfig, PhysicsWorld3D};

    const BUDGET: Duration = Duration::from_secs(2);

    fn seeded_config() -> SimulationConfig {
        SimulationConfig {
            seed: Some(1),
            ..Default::default()
        }
    }

    #[test]
    fn test_init_emits_initialized_once() {
        let (mut worker, events) = SimulationWorker::spawn(seeded_config()).unwrap();
        assert!(worker.post(HostMessage::Init));
        assert!(worker.post(HostMessage::Init));

        assert_eq!(events.recv_timeout(BUDGET).unwrap(), WorkerMessage::Initialized);
        assert!(events.recv_timeout(Duration::from_millis(200)).is_err());

        worker.terminate();
        assert!(!worker.is_running());
    }

    #[test]
    fn test_failed_runtime_emits_failure() {
        struct Unavailable;
        impl WorldFactory for Unavailable {
            fn create_world(&self, _: &SimulationConfig) -> WorkerResult<PhysicsWorld3D> {
                Err(WorkerError::RuntimeLoad("wasm init rejected".to_string()))
            }
        }

        let (worker, events) =
            SimulationWorker::spawn_with_factory(seeded_config(), Box::new(Unavailable)).unwrap();
        worker.post(HostMessage::Init);
        worker.post(HostMessage::trigger_effect());

        assert_eq!(
            events.recv_timeout(BUDGET).unwrap(),
            WorkerMessage::Failed {
                reason: "wasm init rejected".to_string()
            }
        );
        assert!(events.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn test_trigger_streams_positions_in_order() {
        let (worker, events) = SimulationWorker::spawn(seeded_config()).unwrap();
        worker.post(HostMessage::Init);
        assert_eq!(events.recv_timeout(BUDGET).unwrap(), WorkerMessage::Initialized);

        worker.post(HostMessage::TriggerEffect {
            burst: BurstConfig {
                grid_size: 2,
                ..Default::default()
            },
        });

        let mut last_tick = 0;
        for _ in 0..5 {
            match events.recv_timeout(BUDGET).unwrap() {
                WorkerMessage::Positions(snapshot) => {
                    assert_eq!(snapshot.positions.len(), 24);
                    assert!(snapshot.tick > last_tick);
                    last_tick = snapshot.tick;
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_unread_snapshots_are_overwritten() {
        let (worker, events) = SimulationWorker::spawn(seeded_config()).unwrap();
        worker.post(HostMessage::Init);
        assert_eq!(events.recv_timeout(BUDGET).unwrap(), WorkerMessage::Initialized);

        worker.post(HostMessage::trigger_effect());
        // 宿主暂停取消息期间，槽位中只保留最新的一份
        thread::sleep(Duration::from_millis(300));
        assert!(events.pending_snapshots() <= 1);

        let first = match events.recv_timeout(BUDGET).unwrap() {
            WorkerMessage::Positions(snapshot) => snapshot,
            other => panic!("unexpected {:?}", other),
        };
        assert!(first.tick > 5, "stale snapshot delivered: tick {}", first.tick);
        assert!(events.pending_snapshots() <= 1);
    }

    #[test]
    fn test_malformed_raw_message_is_dropped() {
        let (worker, events) = SimulationWorker::spawn(seeded_config()).unwrap();
        assert!(!worker.post_raw(r#"{"type":"selfDestruct"}"#));
        assert!(worker.post_raw(r#"{"type":"init"}"#));
        assert_eq!(events.recv_timeout(BUDGET).unwrap(), WorkerMessage::Initialized);
    }

    #[test]
    fn test_drop_stops_thread() {
        let (worker, events) = SimulationWorker::spawn(seeded_config()).unwrap();
        worker.post(HostMessage::Init);
        worker.post(HostMessage::trigger_effect());
        drop(worker);

        // 线程退出后发送端被释放，通道最终断开
        let deadline = Instant::now() + BUDGET;
        loop {
            match events.recv_deadline(deadline) {
                Ok(_) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
                Err(e) => panic!("channel still open: {:?}", e),
            }
        }
    }
}
