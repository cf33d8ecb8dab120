//! Script Context - 脚本解析
//!
//! 职责:
//! - 规范化模型生成的脚本文本
//! - 将脚本切分为对白 / 音效 / 静音 / 动机音片段
//! - 展示用的时长估算

mod normalizer;
mod segment;
mod segmenter;

pub use normalizer::{normalize_script, SCENE_SEPARATOR};
pub use segment::{MotifType, SceneType, Segment, SilenceKind};
pub use segmenter::{
    classify_line, estimate_duration_secs, parse, LineKind, DEFAULT_SPEAKER, MAX_PAUSE_SECS,
    SCENE_TRANSITION_SECS,
};
