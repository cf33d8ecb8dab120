//! HTTP SFX Client - 调用外部音效生成服务
//!
//! POST {base_url}/v1/sound-generation
//! Request: {"text": "...", "duration_seconds": 4.0, "prompt_influence": 0.3}
//! Response: audio/mpeg binary

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{SfxEnginePort, SfxError, SfxRequest};

#[derive(Debug, Serialize)]
struct SfxHttpRequest<'a> {
    text: &'a str,
    duration_seconds: f64,
    prompt_influence: f64,
}

/// HTTP SFX 客户端配置
#[derive(Debug, Clone)]
pub struct HttpSfxClientConfig {
    pub base_url: String,
    pub api_key: String,
    /// 提示词对生成结果的影响程度 (0.0 - 1.0)
    pub prompt_influence: f64,
    pub timeout_secs: u64,
}

impl Default for HttpSfxClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.elevenlabs.io".to_string(),
            api_key: String::new(),
            prompt_influence: 0.3,
            timeout_secs: 120,
        }
    }
}

/// HTTP SFX 客户端
pub struct HttpSfxClient {
    client: Client,
    config: HttpSfxClientConfig,
}

impl HttpSfxClient {
    pub fn new(config: HttpSfxClientConfig) -> Result<Self, SfxError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SfxError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1/sound-generation",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl SfxEnginePort for HttpSfxClient {
    async fn generate(&self, request: SfxRequest) -> Result<Vec<u8>, SfxError> {
        if request.prompt.trim().is_empty() {
            return Err(SfxError::InvalidRequest("empty prompt".to_string()));
        }

        let body = SfxHttpRequest {
            text: &request.prompt,
            duration_seconds: request.duration_secs,
            prompt_influence: self.config.prompt_influence,
        };

        tracing::debug!(
            url = %self.generate_url(),
            prompt = %request.prompt,
            duration_secs = request.duration_secs,
            "Sending SFX request"
        );

        let response = self
            .client
            .post(self.generate_url())
            .header("xi-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SfxError::Timeout
                } else {
                    SfxError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SfxError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| SfxError::ServiceError(format!("Failed to read audio: {}", e)))?
            .to_vec();

        tracing::info!(audio_size = audio.len(), "SFX generation completed");
        Ok(audio)
    }
}
