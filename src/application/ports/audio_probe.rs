//! Audio Probe Port - 成品音频时长测量

use async_trait::async_trait;
use thiserror::Error;

/// 测量错误
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),
}

/// Audio Probe Port
///
/// 解码任意编码的音频并返回时长（秒）
#[async_trait]
pub trait AudioProbePort: Send + Sync {
    async fn duration_secs(&self, data: &[u8]) -> Result<f64, ProbeError>;
}
