//! 场景与渲染后端
//!
//! - `scene` - 相机、光源、装饰网格和粒子网格池
//! - `backend` - `RenderBackend` trait 与无头实现

pub mod backend;
pub mod scene;

pub use backend::{HeadlessRenderer, RenderBackend, RenderStats};
pub use scene::{HemisphericLight, Mesh, OrbitCamera, Scene};
