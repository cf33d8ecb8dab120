//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（TtsEngine、SfxEngine、AudioEngine、BlobStore、AudioProbe）
//! - mixer: 多轨混音引擎
//! - commands: 单集制作命令及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod mixer;
pub mod ports;

// Re-exports
pub use commands::{
    handlers::{ProduceEpisodeConfig, ProduceEpisodeHandler},
    ProduceEpisodeCommand, ProduceEpisodeResponse, SkippedSegment,
};

pub use error::ApplicationError;

pub use mixer::{
    MixError, MixOptions, MixOutput, MixerSettings, MixingEngine, RenderedSegment,
};

pub use ports::{
    AudioEngineError, AudioEnginePort, AudioProbePort, BlobStoreError, BlobStorePort, FilterJob,
    MixStage, OutputCodec, ProbeError, SfxEnginePort, SfxError, SfxRequest, TtsAudio,
    TtsEnginePort, TtsError, TtsRequest,
};
