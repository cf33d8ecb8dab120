//! HTTP TTS Client - 调用外部语音合成服务
//!
//! 实现 TtsEnginePort trait，通过 HTTP 调用 ElevenLabs 风格的合成接口
//!
//! 外部 TTS API:
//! POST {base_url}/v1/text-to-speech/{voice_id}?output_format=mp3_44100_128
//! Headers: xi-api-key
//! Request: {"text": "...", "model_id": "...", "voice_settings": {...}}  (JSON)
//! Response: audio/mpeg binary

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{TtsAudio, TtsEnginePort, TtsError, TtsRequest};
use crate::domain::voice::VoiceSettings;

/// 合成请求体 (JSON)
#[derive(Debug, Serialize)]
struct TtsHttpRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

/// HTTP TTS 客户端配置
#[derive(Debug, Clone)]
pub struct HttpTtsClientConfig {
    /// 服务基础 URL
    pub base_url: String,
    /// API Key
    pub api_key: String,
    /// 合成模型
    pub model_id: String,
    /// 输出格式
    pub output_format: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpTtsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.elevenlabs.io".to_string(),
            api_key: String::new(),
            model_id: "eleven_multilingual_v2".to_string(),
            output_format: "mp3_44100_128".to_string(),
            timeout_secs: 120,
        }
    }
}

impl HttpTtsClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP TTS 客户端
pub struct HttpTtsClient {
    client: Client,
    config: HttpTtsClientConfig,
}

impl HttpTtsClient {
    /// 创建新的 HTTP TTS 客户端
    pub fn new(config: HttpTtsClientConfig) -> Result<Self, TtsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TtsError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 获取合成 URL
    fn synthesize_url(&self, voice_id: &str) -> String {
        format!(
            "{}/v1/text-to-speech/{}",
            self.config.base_url.trim_end_matches('/'),
            voice_id
        )
    }

    /// 获取健康检查 URL
    fn health_url(&self) -> String {
        format!("{}/v1/models", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TtsEnginePort for HttpTtsClient {
    async fn synthesize(&self, request: TtsRequest) -> Result<TtsAudio, TtsError> {
        let body = TtsHttpRequest {
            text: &request.text,
            model_id: &self.config.model_id,
            voice_settings: request.settings,
        };

        tracing::debug!(
            url = %self.synthesize_url(&request.voice_id),
            text_len = request.text.len(),
            voice_id = %request.voice_id,
            "Sending TTS request"
        );

        let response = self
            .client
            .post(self.synthesize_url(&request.voice_id))
            .query(&[("output_format", self.config.output_format.as_str())])
            .header("xi-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout
                } else if e.is_connect() {
                    TtsError::NetworkError(format!("Cannot connect to TTS service: {}", e))
                } else {
                    TtsError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TtsError::VoiceNotFound(request.voice_id));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TtsError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let request_id = response
            .headers()
            .get("request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| TtsError::InvalidResponse(format!("Failed to read audio: {}", e)))?
            .to_vec();

        if audio_data.is_empty() {
            return Err(TtsError::InvalidResponse("empty audio body".to_string()));
        }

        tracing::info!(
            request_id = ?request_id,
            voice_id = %request.voice_id,
            audio_size = audio_data.len(),
            "TTS synthesis completed"
        );

        Ok(TtsAudio {
            audio_data,
            request_id,
        })
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.health_url())
            .header("xi-api-key", &self.config.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = HttpTtsClientConfig::default();
        assert_eq!(config.base_url, "https://api.elevenlabs.io");
        assert_eq!(config.output_format, "mp3_44100_128");
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_synthesize_url() {
        let config = HttpTtsClientConfig::new("http://localhost:9000/", "key").with_timeout(30);
        let client = HttpTtsClient::new(config).unwrap();
        assert_eq!(
            client.synthesize_url("JBFqnCBsd6RMkjVDRZzb"),
            "http://localhost:9000/v1/text-to-speech/JBFqnCBsd6RMkjVDRZzb"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = TtsHttpRequest {
            text: "Sit down.",
            model_id: "eleven_multilingual_v2",
            voice_settings: VoiceSettings::for_emotion(Some("cold")),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["text"], "Sit down.");
        assert!((json["voice_settings"]["stability"].as_f64().unwrap() - 0.75).abs() < 1e-6);
    }
}
