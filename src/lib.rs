//! # Debris FX
//!
//! Project-card debris effect: a rapier3d simulation running on a background
//! thread, streaming particle transforms to a render controller that owns the
//! visible scene.
//!
//! ## Features
//!
//! - **Simulation worker**: fixed-rate physics thread, idempotent `init`,
//!   replace-and-burst `triggerEffect`, explicit failure reporting
//! - **Effect controller**: mount/unmount lifecycle, trigger gating, last-write-wins
//!   snapshot application decoupled from the worker's cadence
//! - **Protocol**: closed tagged-union messages with a JSON wire form
//! - **Content backend**: flat-file JSON store and admin password gate
//!
//! ## Architecture Design
//!
//! The worker and the controller never share memory. They communicate only
//! through two one-way FIFO channels:
//!
//! - **State**: `SimulationState` is owned by the worker thread, `Scene` by the controller
//! - **Messages**: `HostMessage` (host → worker) and `WorkerMessage` (worker → host)
//! - **Loops**: the worker ticks at its own rate, the controller renders at its own rate
//!
//! ### Example
//!
//! ```ignore
//! use debris_fx::{EffectController, FxConfig, HeadlessRenderer};
//!
//! let config = FxConfig::load_or_default();
//! let mut controller = EffectController::mount(&config, Box::new(HeadlessRenderer::default()))?;
//! controller.wait_until_settled(std::time::Duration::from_secs(2))?;
//! controller.trigger()?;
//! controller.run_frames(120)?;
//! controller.unmount();
//! ```
//!
//! ## Modules
//!
//! - [`core`]: errors, timing, helper macros
//! - [`config`]: configuration loading and validation
//! - [`physics`]: rapier3d world and simulation state
//! - [`protocol`]: worker/controller messages
//! - [`worker`]: background simulation thread
//! - [`render`]: scene graph and render backend
//! - [`controller`]: effect controller state machine
//! - [`content`]: content store and admin login

/// Errors, fixed-step timing and helper macros
pub mod core;
/// Configuration system
pub mod config;
/// Physics simulation using Rapier
pub mod physics;
/// Messages exchanged between the worker and the controller
pub mod protocol;
/// Background simulation thread
pub mod worker;
/// Scene graph and render backends
pub mod render;
/// Effect controller
pub mod controller;
/// Site content store and admin login
pub mod content;

pub use config::FxConfig;
pub use controller::{ControllerState, EffectController};
pub use crate::core::error::{FxError, FxResult};
pub use physics::{BurstConfig, SimulationState, TransformSnapshot};
pub use protocol::{HostMessage, WorkerMessage};
pub use render::{HeadlessRenderer, RenderBackend};
pub use worker::{SimulationWorker, WorkerEvents};
