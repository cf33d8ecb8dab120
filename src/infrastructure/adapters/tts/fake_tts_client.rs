//! Fake TTS Client - 演练模式与测试用的合成客户端
//!
//! 不调用外部服务，按词数生成一段正弦测试音

use async_trait::async_trait;
use std::time::Duration;

use crate::application::ports::{TtsAudio, TtsEnginePort, TtsError, TtsRequest};
use crate::domain::audio::{wav, PcmFormat};

/// Fake TTS Client 配置
#[derive(Debug, Clone)]
pub struct FakeTtsClientConfig {
    /// 每个词的时长（秒）
    pub secs_per_word: f64,
    /// 单段最短时长（秒）
    pub min_secs: f64,
    pub format: PcmFormat,
    /// 模拟延迟
    pub latency: Duration,
    /// 文本包含该片段时返回错误，用于测试跳过逻辑
    pub fail_when_text_contains: Option<String>,
}

impl Default for FakeTtsClientConfig {
    fn default() -> Self {
        Self {
            secs_per_word: 0.4,
            min_secs: 0.5,
            format: PcmFormat::default(),
            latency: Duration::ZERO,
            fail_when_text_contains: None,
        }
    }
}

/// Fake TTS Client
pub struct FakeTtsClient {
    config: FakeTtsClientConfig,
}

impl FakeTtsClient {
    pub fn new(config: FakeTtsClientConfig) -> Self {
        tracing::info!(
            secs_per_word = config.secs_per_word,
            format = %config.format,
            "FakeTtsClient initialized"
        );
        Self { config }
    }

    /// 使用默认配置创建
    pub fn with_defaults() -> Self {
        Self::new(FakeTtsClientConfig::default())
    }

    /// 合成时长（秒）
    pub fn duration_for(&self, text: &str) -> f64 {
        let words = text.split_whitespace().count() as f64;
        (words * self.config.secs_per_word).max(self.config.min_secs)
    }
}

#[async_trait]
impl TtsEnginePort for FakeTtsClient {
    async fn synthesize(&self, request: TtsRequest) -> Result<TtsAudio, TtsError> {
        if let Some(marker) = &self.config.fail_when_text_contains {
            if request.text.contains(marker.as_str()) {
                return Err(TtsError::ServiceError(format!(
                    "simulated failure for voice {}",
                    request.voice_id
                )));
            }
        }

        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }

        // 不同音色使用不同音高，便于试听区分
        let pitch = 180.0 + (request.voice_id.bytes().map(u32::from).sum::<u32>() % 120) as f64;
        let secs = self.duration_for(&request.text);

        tracing::debug!(
            text_len = request.text.len(),
            voice_id = %request.voice_id,
            secs,
            "FakeTtsClient: returning test tone"
        );

        Ok(TtsAudio {
            audio_data: wav::tone(secs, pitch, 0.3, self.config.format),
            request_id: Some(format!("fake-{}", uuid::Uuid::new_v4())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::voice::VoiceSettings;

    fn request(text: &str) -> TtsRequest {
        TtsRequest {
            text: text.to_string(),
            voice_id: "voice".to_string(),
            settings: VoiceSettings::default(),
        }
    }

    #[tokio::test]
    async fn test_duration_follows_word_count() {
        let client = FakeTtsClient::with_defaults();
        let audio = client.synthesize(request("one two three four five")).await.unwrap();
        let secs = wav::duration_secs(&audio.audio_data).unwrap();
        assert!((secs - 2.0).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_simulated_failure() {
        let client = FakeTtsClient::new(FakeTtsClientConfig {
            fail_when_text_contains: Some("boom".to_string()),
            ..Default::default()
        });
        assert!(client.synthesize(request("it goes boom")).await.is_err());
        assert!(client.synthesize(request("quiet")).await.is_ok());
    }
}
