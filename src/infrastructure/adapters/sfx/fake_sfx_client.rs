//! Fake SFX Client - 演练模式与测试用的音效客户端

use async_trait::async_trait;

use crate::application::ports::{SfxEnginePort, SfxError, SfxRequest};
use crate::domain::audio::{wav, PcmFormat};

/// 生成与请求时长一致的低频测试音
pub struct FakeSfxClient {
    format: PcmFormat,
    fail_when_prompt_contains: Option<String>,
}

impl FakeSfxClient {
    pub fn new(format: PcmFormat) -> Self {
        Self {
            format,
            fail_when_prompt_contains: None,
        }
    }

    pub fn failing_on(mut self, marker: impl Into<String>) -> Self {
        self.fail_when_prompt_contains = Some(marker.into());
        self
    }
}

impl Default for FakeSfxClient {
    fn default() -> Self {
        Self::new(PcmFormat::default())
    }
}

#[async_trait]
impl SfxEnginePort for FakeSfxClient {
    async fn generate(&self, request: SfxRequest) -> Result<Vec<u8>, SfxError> {
        if let Some(marker) = &self.fail_when_prompt_contains {
            if request.prompt.contains(marker.as_str()) {
                return Err(SfxError::ServiceError("simulated failure".to_string()));
            }
        }

        tracing::debug!(
            prompt = %request.prompt,
            duration_secs = request.duration_secs,
            "FakeSfxClient: returning test tone"
        );
        Ok(wav::tone(request.duration_secs, 90.0, 0.2, self.format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_duration_matches_request() {
        let client = FakeSfxClient::default();
        let audio = client.generate(SfxRequest::new("door", 3.0)).await.unwrap();
        assert!((wav::duration_secs(&audio).unwrap() - 3.0).abs() < 1e-3);
    }
}
