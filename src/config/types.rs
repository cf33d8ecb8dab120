//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::application::mixer::{LoudnessTarget, MixOptions, MixerSettings};
use crate::application::ports::OutputCodec;
use crate::domain::audio::PcmFormat;
use crate::domain::voice::VoiceCatalog;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 语音合成服务
    #[serde(default)]
    pub tts: TtsConfig,

    /// 音效生成服务
    #[serde(default)]
    pub sfx: SfxConfig,

    /// 合成调度
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// 混音配置
    #[serde(default)]
    pub mix: MixConfig,

    /// 音频引擎配置
    #[serde(default)]
    pub engine: EngineConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 音色配置
    #[serde(default)]
    pub voices: VoicesConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

fn default_api_base() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_timeout() -> u64 {
    120
}

/// TTS 服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    /// 服务基础 URL
    #[serde(default = "default_api_base")]
    pub base_url: String,

    /// API Key，演练模式下可为空
    #[serde(default)]
    pub api_key: String,

    /// 合成模型
    #[serde(default = "default_tts_model")]
    pub model_id: String,

    /// 服务端输出格式
    #[serde(default = "default_tts_output_format")]
    pub output_format: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_tts_model() -> String {
    "eleven_multilingual_v2".to_string()
}

fn default_tts_output_format() -> String {
    "mp3_44100_128".to_string()
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base(),
            api_key: String::new(),
            model_id: default_tts_model(),
            output_format: default_tts_output_format(),
            timeout_secs: default_timeout(),
        }
    }
}

/// 音效服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct SfxConfig {
    #[serde(default = "default_api_base")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    /// 提示词影响力（0.0 - 1.0）
    #[serde(default = "default_prompt_influence")]
    pub prompt_influence: f64,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_prompt_influence() -> f64 {
    0.3
}

impl Default for SfxConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base(),
            api_key: String::new(),
            prompt_influence: default_prompt_influence(),
            timeout_secs: default_timeout(),
        }
    }
}

/// 合成调度配置
#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisConfig {
    /// 最大并发请求数
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// 每次请求前的等待（毫秒）
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// 默认口音
    #[serde(default = "default_accent")]
    pub accent: String,
}

fn default_max_concurrent() -> usize {
    3
}

fn default_request_delay_ms() -> u64 {
    250
}

fn default_accent() -> String {
    "neutral".to_string()
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            request_delay_ms: default_request_delay_ms(),
            accent: default_accent(),
        }
    }
}

impl SynthesisConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

/// 混音配置
#[derive(Debug, Clone, Deserialize)]
pub struct MixConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_channels")]
    pub channels: u16,

    /// 成品编码
    /// 可选: mp3, wav
    #[serde(default = "default_codec")]
    pub codec: String,

    /// MP3 比特率（kbps）
    #[serde(default = "default_bitrate_kbps")]
    pub bitrate_kbps: u32,

    /// 默认混音参数
    #[serde(default)]
    pub options: MixOptions,

    #[serde(default)]
    pub loudness: LoudnessTarget,
}

fn default_sample_rate() -> u32 {
    44100
}

fn default_channels() -> u16 {
    2
}

fn default_codec() -> String {
    "mp3".to_string()
}

fn default_bitrate_kbps() -> u32 {
    128
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            codec: default_codec(),
            bitrate_kbps: default_bitrate_kbps(),
            options: MixOptions::default(),
            loudness: LoudnessTarget::default(),
        }
    }
}

impl MixConfig {
    pub fn format(&self) -> PcmFormat {
        PcmFormat::new(self.sample_rate, self.channels)
    }

    /// 解析成品编码，未知编码返回 None
    pub fn output_codec(&self) -> Option<OutputCodec> {
        let format = self.format();
        match self.codec.to_ascii_lowercase().as_str() {
            "wav" => Some(OutputCodec::Wav(format)),
            "mp3" => Some(OutputCodec::Mp3 {
                bitrate_kbps: self.bitrate_kbps,
                format,
            }),
            _ => None,
        }
    }

    pub fn mixer_settings(&self) -> Option<MixerSettings> {
        Some(MixerSettings {
            format: self.format(),
            codec: self.output_codec()?,
            loudness: self.loudness,
        })
    }
}

/// 音频引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// ffmpeg 可执行文件
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,

    /// 临时目录根路径，为空时使用系统临时目录
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            scratch_dir: None,
        }
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 成品存储目录
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// 对外访问地址前缀
    #[serde(default)]
    pub public_base_url: Option<String>,

    /// 对象键前缀
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/episodes")
}

fn default_key_prefix() -> String {
    "episodes".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            public_base_url: None,
            key_prefix: default_key_prefix(),
        }
    }
}

/// 音色配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VoicesConfig {
    /// 音色目录
    #[serde(default)]
    pub catalog: VoiceCatalog,

    /// 全局角色 → 音色覆盖
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
