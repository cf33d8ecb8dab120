//! Mixer - 多轨混音
//!
//! 把已合成的片段排到时间线上，依次生成对白主干、音效总线和音乐层，
//! 经侧链压缩合成后做响度标准化并编码。滤镜图由 [`graph`] 构建，
//! 由 [`AudioEnginePort`](crate::application::ports::AudioEnginePort) 执行。

mod engine;
mod error;
pub mod graph;
mod options;
mod rendered;
pub mod timeline;

pub use engine::{MixOutput, MixerSettings, MixingEngine};
pub use error::MixError;
pub use options::{LoudnessTarget, MixOptions};
pub use rendered::RenderedSegment;
pub use timeline::{Timeline, TimelineEvent, SPOT_PREROLL_SECS};
