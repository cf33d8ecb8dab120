//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod engine;
pub mod probe;
pub mod sfx;
pub mod storage;
pub mod tts;

pub use engine::*;
pub use probe::*;
pub use sfx::*;
pub use storage::*;
pub use tts::*;
