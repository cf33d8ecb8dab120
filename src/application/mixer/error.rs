//! 混音错误

use thiserror::Error;

use crate::application::ports::{AudioEngineError, MixStage};
use crate::domain::audio::WavError;

#[derive(Debug, Error)]
pub enum MixError {
    /// 引擎执行失败，整个混音中止
    #[error("Mix stage {stage} failed (segment {segment:?}): {source}")]
    Stage {
        stage: MixStage,
        segment: Option<usize>,
        #[source]
        source: AudioEngineError,
    },

    /// 引擎输出无法解析为 WAV
    #[error("Invalid audio at stage {stage} (segment {segment:?}): {source}")]
    InvalidAudio {
        stage: MixStage,
        segment: Option<usize>,
        #[source]
        source: WavError,
    },

    #[error("No dialogue or silence audio to mix")]
    NoContent,
}

impl MixError {
    pub fn stage(&self) -> Option<MixStage> {
        match self {
            MixError::Stage { stage, .. } | MixError::InvalidAudio { stage, .. } => Some(*stage),
            MixError::NoContent => None,
        }
    }
}
