//! TTS Engine Port - 语音合成抽象
//!
//! 定义语音合成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::voice::VoiceSettings;

/// TTS 错误
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Voice not found: {0}")]
    VoiceNotFound(String),
}

/// 语音合成请求
#[derive(Debug, Clone)]
pub struct TtsRequest {
    /// 要合成的文本内容
    pub text: String,
    /// 音色 ID
    pub voice_id: String,
    /// 由情绪推导的合成参数
    pub settings: VoiceSettings,
}

/// 语音合成结果
#[derive(Debug, Clone)]
pub struct TtsAudio {
    /// 原始音频数据（MP3 或 WAV，混音前统一转为 WAV）
    pub audio_data: Vec<u8>,
    /// 服务端请求 ID（用于追踪）
    pub request_id: Option<String>,
}

/// TTS Engine Port
///
/// 外部语音合成服务的抽象接口
#[async_trait]
pub trait TtsEnginePort: Send + Sync {
    /// 合成一段对白
    async fn synthesize(&self, request: TtsRequest) -> Result<TtsAudio, TtsError>;

    /// 检查服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
