//! Audio - 共享的 PCM 音频工具

pub mod wav;

pub use wav::{PcmFormat, WavError, WavInfo};
