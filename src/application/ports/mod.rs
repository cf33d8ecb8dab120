//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_engine;
mod audio_probe;
mod blob_store;
mod sfx_engine;
mod tts_engine;

pub use audio_engine::{
    AudioEngineError, AudioEnginePort, FilterJob, MixStage, OutputCodec, OUTPUT_LABEL,
};
pub use audio_probe::{AudioProbePort, ProbeError};
pub use blob_store::{BlobStoreError, BlobStorePort};
pub use sfx_engine::{SfxEnginePort, SfxError, SfxRequest};
pub use tts_engine::{TtsAudio, TtsEnginePort, TtsError, TtsRequest};
