//! SFX Engine Port - 音效生成抽象

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::sfx::MAX_SYNTHESIS_SECS;

/// 音效生成错误
#[derive(Debug, Error)]
pub enum SfxError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// 音效生成请求
#[derive(Debug, Clone)]
pub struct SfxRequest {
    /// 规范提示词
    pub prompt: String,
    /// 期望时长（秒），不超过服务上限
    pub duration_secs: f64,
}

impl SfxRequest {
    pub fn new(prompt: impl Into<String>, duration_secs: f64) -> Self {
        Self {
            prompt: prompt.into(),
            duration_secs: duration_secs.clamp(0.5, MAX_SYNTHESIS_SECS),
        }
    }
}

/// SFX Engine Port
#[async_trait]
pub trait SfxEnginePort: Send + Sync {
    /// 生成音效，返回原始音频数据
    async fn generate(&self, request: SfxRequest) -> Result<Vec<u8>, SfxError>;
}
