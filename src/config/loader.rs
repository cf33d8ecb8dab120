//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（soundstage.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["soundstage", "soundstage.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `SOUNDSTAGE_`，层级分隔符 `__`）
/// 2. 配置文件（soundstage.toml 或 soundstage.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `SOUNDSTAGE_TTS__API_KEY=sk-...`
/// - `SOUNDSTAGE_SYNTHESIS__MAX_CONCURRENT=5`
/// - `SOUNDSTAGE_MIX__CODEC=wav`
/// - `SOUNDSTAGE_STORAGE__OUTPUT_DIR=/data/episodes`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("tts.timeout_secs", 120)?
        .set_default("sfx.timeout_secs", 120)?
        .set_default("synthesis.max_concurrent", 3)?
        .set_default("synthesis.request_delay_ms", 250)?
        .set_default("synthesis.accent", "neutral")?
        .set_default("mix.sample_rate", 44100)?
        .set_default("mix.channels", 2)?
        .set_default("mix.codec", "mp3")?
        .set_default("mix.bitrate_kbps", 128)?
        .set_default("engine.ffmpeg", "ffmpeg")?
        .set_default("storage.output_dir", "data/episodes")?
        .set_default("storage.key_prefix", "episodes")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: SOUNDSTAGE_MIX__OPTIONS__MUSIC_VOLUME=0.2
    builder = builder.add_source(
        Environment::with_prefix("SOUNDSTAGE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.synthesis.max_concurrent == 0 {
        return Err(ConfigError::ValidationError(
            "synthesis.max_concurrent cannot be 0".to_string(),
        ));
    }

    if config.mix.sample_rate == 0 || config.mix.channels == 0 {
        return Err(ConfigError::ValidationError(
            "mix.sample_rate and mix.channels must be positive".to_string(),
        ));
    }

    if config.mix.output_codec().is_none() {
        return Err(ConfigError::ValidationError(format!(
            "Unsupported mix.codec: {}",
            config.mix.codec
        )));
    }

    config
        .mix
        .options
        .validate()
        .map_err(|e| ConfigError::ValidationError(format!("mix.options: {}", e)))?;

    if !(0.0..=1.0).contains(&config.sfx.prompt_influence) {
        return Err(ConfigError::ValidationError(
            "sfx.prompt_influence must be within 0.0..=1.0".to_string(),
        ));
    }

    config
        .voices
        .catalog
        .validate()
        .map_err(|e| ConfigError::ValidationError(format!("voices.catalog: {}", e)))?;

    if config.engine.ffmpeg.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "engine.ffmpeg cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn key_status(key: &str) -> &'static str {
    if key.is_empty() {
        "missing"
    } else {
        "set"
    }
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("TTS: {} (model {}, key {})", config.tts.base_url, config.tts.model_id, key_status(&config.tts.api_key));
    tracing::info!("SFX: {} (key {})", config.sfx.base_url, key_status(&config.sfx.api_key));
    tracing::info!(
        "Synthesis: {} concurrent, {}ms delay, accent {}",
        config.synthesis.max_concurrent,
        config.synthesis.request_delay_ms,
        config.synthesis.accent
    );
    tracing::info!(
        "Mix: {} Hz, {} ch, codec {}",
        config.mix.sample_rate,
        config.mix.channels,
        config.mix.codec
    );
    tracing::info!("Engine: {}", config.engine.ffmpeg);
    tracing::info!("Output Directory: {:?}", config.storage.output_dir);
    tracing::info!("Voice Overrides: {}", config.voices.overrides.len());
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_concurrency() {
        let mut config = AppConfig::default();
        config.synthesis.max_concurrent = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_unknown_codec() {
        let mut config = AppConfig::default();
        config.mix.codec = "aiff".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_negative_volume() {
        let mut config = AppConfig::default();
        config.mix.options.sfx_volume = -0.5;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[synthesis]\nmax_concurrent = 5\n\n[mix]\ncodec = \"wav\"\n\n[mix.options]\nmusic_volume = 0.2\n\n[voices.overrides]\nINSPECTOR = \"voice-x\""
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.synthesis.max_concurrent, 5);
        assert_eq!(config.mix.codec, "wav");
        assert_eq!(config.mix.options.music_volume, 0.2);
        assert_eq!(config.mix.options.dialogue_volume, 1.0);
        assert_eq!(config.voices.overrides.len(), 1);
    }
}
