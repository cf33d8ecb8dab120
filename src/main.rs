//! Soundstage - 广播剧单集制作
//!
//! - `produce`: 脚本 → 合成 → 混音 → 上传
//! - `segments`: 打印分段结果（JSON）

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use soundstage::application::ports::{
    AudioEnginePort, OutputCodec, SfxEnginePort, TtsEnginePort,
};
use soundstage::application::{
    MixerSettings, MixingEngine, ProduceEpisodeCommand, ProduceEpisodeConfig,
    ProduceEpisodeHandler,
};
use soundstage::config::{load_config_from_path, print_config, AppConfig, LogConfig};
use soundstage::domain::audio::WavInfo;
use soundstage::domain::script::{normalize_script, parse};
use soundstage::infrastructure::adapters::{
    FakeSfxClient, FakeTtsClient, FakeTtsClientConfig, FfmpegAudioEngine, FfmpegEngineConfig,
    FileBlobStore, HttpSfxClient, HttpSfxClientConfig, HttpTtsClient, HttpTtsClientConfig,
    RecordingAudioEngine, SymphoniaProbe,
};

#[derive(Debug, Parser)]
#[command(name = "soundstage", version, about = "Audio-drama episode production")]
struct Cli {
    /// 配置文件路径（默认搜索 soundstage.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 制作一集并上传成品
    Produce {
        /// 脚本文件
        script: PathBuf,

        /// 背景音乐文件
        #[arg(long)]
        music: Option<PathBuf>,

        #[arg(long)]
        episode_id: Option<Uuid>,

        /// 口音音色池
        #[arg(long)]
        accent: Option<String>,

        /// 角色音色覆盖，格式 NAME=VOICE_ID，可重复
        #[arg(long = "voice", value_parser = parse_override)]
        voices: Vec<(String, String)>,

        /// 不调用外部服务，使用假客户端和记录引擎
        #[arg(long)]
        dry_run: bool,

        /// 跳过脚本规范化
        #[arg(long)]
        no_normalize: bool,
    },

    /// 打印分段结果
    Segments {
        script: PathBuf,

        /// 不做规范化，直接分段
        #[arg(long)]
        raw: bool,
    },
}

fn parse_override(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, voice)) if !name.trim().is_empty() && !voice.trim().is_empty() => {
            Ok((name.trim().to_string(), voice.trim().to_string()))
        }
        _ => Err(format!("expected NAME=VOICE_ID, got {:?}", s)),
    }
}

fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},soundstage={}", log.level, log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    // stdout 留给 JSON 报告
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config_from_path(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);

    match cli.command {
        Command::Segments { script, raw } => {
            let text = tokio::fs::read_to_string(&script)
                .await
                .with_context(|| format!("Failed to read script {}", script.display()))?;
            let text = if raw { text } else { normalize_script(&text) };
            println!("{}", serde_json::to_string_pretty(&parse(&text))?);
        }
        Command::Produce {
            script,
            music,
            episode_id,
            accent,
            voices,
            dry_run,
            no_normalize,
        } => {
            print_config(&config);

            let text = tokio::fs::read_to_string(&script)
                .await
                .with_context(|| format!("Failed to read script {}", script.display()))?;
            let music = match music {
                Some(path) => Some(
                    tokio::fs::read(&path)
                        .await
                        .with_context(|| format!("Failed to read music {}", path.display()))?,
                ),
                None => None,
            };

            let handler = build_handler(&config, dry_run).await?;

            let mut voice_overrides: HashMap<String, String> = config.voices.overrides.clone();
            voice_overrides.extend(voices);

            let mut cmd = ProduceEpisodeCommand::new(text);
            cmd.episode_id = episode_id.unwrap_or(cmd.episode_id);
            cmd.music = music.filter(|m| !dry_run || WavInfo::parse(m).is_ok());
            cmd.voice_overrides = voice_overrides;
            cmd.accent = accent;
            cmd.options = config.mix.options;
            cmd.normalize_script = !no_normalize;

            let response = handler.handle(cmd).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

/// 组装适配器与处理器
async fn build_handler(config: &AppConfig, dry_run: bool) -> anyhow::Result<ProduceEpisodeHandler> {
    let format = config.mix.format();
    let Some(mut settings) = config.mix.mixer_settings() else {
        bail!("Unsupported mix.codec: {}", config.mix.codec);
    };

    let (tts, sfx, engine): (
        Arc<dyn TtsEnginePort>,
        Arc<dyn SfxEnginePort>,
        Arc<dyn AudioEnginePort>,
    ) = if dry_run {
        tracing::info!("Dry run: using fake synthesis clients and recording engine");
        // 记录引擎不做编码
        settings = MixerSettings {
            codec: OutputCodec::Wav(format),
            ..settings
        };
        (
            Arc::new(FakeTtsClient::new(FakeTtsClientConfig {
                format,
                ..FakeTtsClientConfig::default()
            })),
            Arc::new(FakeSfxClient::new(format)),
            Arc::new(RecordingAudioEngine::new()),
        )
    } else {
        if config.tts.api_key.is_empty() || config.sfx.api_key.is_empty() {
            bail!("tts.api_key and sfx.api_key are required (set SOUNDSTAGE_TTS__API_KEY / SOUNDSTAGE_SFX__API_KEY or use --dry-run)");
        }

        let tts = HttpTtsClient::new(HttpTtsClientConfig {
            base_url: config.tts.base_url.clone(),
            api_key: config.tts.api_key.clone(),
            model_id: config.tts.model_id.clone(),
            output_format: config.tts.output_format.clone(),
            timeout_secs: config.tts.timeout_secs,
        })?;
        let sfx = HttpSfxClient::new(HttpSfxClientConfig {
            base_url: config.sfx.base_url.clone(),
            api_key: config.sfx.api_key.clone(),
            prompt_influence: config.sfx.prompt_influence,
            timeout_secs: config.sfx.timeout_secs,
        })?;

        let mut engine_config = FfmpegEngineConfig {
            binary: config.engine.ffmpeg.clone(),
            ..FfmpegEngineConfig::default()
        };
        if let Some(dir) = &config.engine.scratch_dir {
            engine_config.scratch_root = dir.clone();
        }
        let engine = FfmpegAudioEngine::new(engine_config);
        engine.check_available().await?;

        (Arc::new(tts), Arc::new(sfx), Arc::new(engine))
    };

    let blob_store = FileBlobStore::new(
        &config.storage.output_dir,
        config.storage.public_base_url.clone(),
    )
    .await?;

    let mixer = MixingEngine::new(engine, settings);

    Ok(ProduceEpisodeHandler::new(
        tts,
        sfx,
        Arc::new(mixer),
        Arc::new(SymphoniaProbe::new()),
        Arc::new(blob_store),
        Arc::new(config.voices.catalog.clone()),
        ProduceEpisodeConfig {
            max_concurrent: config.synthesis.max_concurrent,
            request_delay: config.synthesis.request_delay(),
            accent: config.synthesis.accent.clone(),
            key_prefix: config.storage.key_prefix.clone(),
        },
    ))
}
