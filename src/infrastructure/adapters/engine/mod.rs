//! Audio Engine Adapters

mod ffmpeg_engine;
mod recording_engine;
mod scratch;

pub use ffmpeg_engine::{build_ffmpeg_args, FfmpegAudioEngine, FfmpegEngineConfig};
pub use recording_engine::{RecordedJob, RecordingAudioEngine};
pub use scratch::ScratchDir;
