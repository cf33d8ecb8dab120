//! Audio Engine Port - 滤镜图执行抽象
//!
//! 混音引擎把每一步处理表达为一个 filter_complex 滤镜图，
//! 由具体引擎（ffmpeg 子进程、测试用的记录器）执行。
//!
//! 约定：输入依次绑定为 `[0:a]`、`[1:a]`……，滤镜图的最终输出标签为 `[out]`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::audio::PcmFormat;

/// 滤镜图输出标签
pub const OUTPUT_LABEL: &str = "out";

/// 音频引擎错误
#[derive(Debug, Error)]
pub enum AudioEngineError {
    #[error("Failed to spawn engine: {0}")]
    Spawn(String),

    #[error("Engine exited with status {status}: {stderr}")]
    Process { status: i32, stderr: String },

    #[error("IO error: {0}")]
    Io(String),

    #[error("Engine produced no output")]
    EmptyOutput,
}

/// 混音阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixStage {
    SegmentProcessing,
    Timeline,
    SfxBus,
    MusicBed,
    Mixdown,
    Ending,
    Loudness,
    Encode,
}

impl std::fmt::Display for MixStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MixStage::SegmentProcessing => "segment_processing",
            MixStage::Timeline => "timeline",
            MixStage::SfxBus => "sfx_bus",
            MixStage::MusicBed => "music_bed",
            MixStage::Mixdown => "mixdown",
            MixStage::Ending => "ending",
            MixStage::Loudness => "loudness",
            MixStage::Encode => "encode",
        };
        write!(f, "{}", name)
    }
}

/// 输出编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "codec", rename_all = "lowercase")]
pub enum OutputCodec {
    /// 16 位 PCM WAV（中间产物）
    Wav(PcmFormat),
    /// MP3（成品）
    Mp3 { bitrate_kbps: u32, format: PcmFormat },
}

impl OutputCodec {
    pub fn format(&self) -> PcmFormat {
        match self {
            OutputCodec::Wav(format) => *format,
            OutputCodec::Mp3 { format, .. } => *format,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputCodec::Wav(_) => "audio/wav",
            OutputCodec::Mp3 { .. } => "audio/mpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputCodec::Wav(_) => "wav",
            OutputCodec::Mp3 { .. } => "mp3",
        }
    }
}

/// 一次滤镜图执行
#[derive(Debug, Clone)]
pub struct FilterJob<'a> {
    pub stage: MixStage,
    /// 逐段处理时的片段序号
    pub segment: Option<usize>,
    /// filter_complex 表达式
    pub graph: String,
    /// 按顺序绑定到 `[N:a]` 的输入
    pub inputs: Vec<&'a [u8]>,
    pub output: OutputCodec,
}

/// Audio Engine Port
///
/// 执行滤镜图并返回编码后的输出。实现方负责临时文件的清理，
/// 无论成功与否。
#[async_trait]
pub trait AudioEnginePort: Send + Sync {
    async fn apply(&self, job: FilterJob<'_>) -> Result<Vec<u8>, AudioEngineError>;
}
