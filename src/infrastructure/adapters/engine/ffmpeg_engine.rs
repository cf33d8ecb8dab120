//! FFmpeg Audio Engine - 以 ffmpeg 子进程执行滤镜图
//!
//! 每次调用：
//! 1. 创建唯一命名的临时目录
//! 2. 写入输入文件
//! 3. 运行 `ffmpeg -filter_complex`
//! 4. 读取输出，临时目录随 guard 一起删除（成功或失败）

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::application::ports::{
    AudioEngineError, AudioEnginePort, FilterJob, OutputCodec, OUTPUT_LABEL,
};

use super::scratch::ScratchDir;

/// stderr 在错误信息中保留的最大长度
const MAX_STDERR_CHARS: usize = 2000;

/// FFmpeg 引擎配置
#[derive(Debug, Clone)]
pub struct FfmpegEngineConfig {
    /// ffmpeg 可执行文件
    pub binary: String,
    /// 临时目录根路径
    pub scratch_root: PathBuf,
}

impl Default for FfmpegEngineConfig {
    fn default() -> Self {
        Self {
            binary: "ffmpeg".to_string(),
            scratch_root: std::env::temp_dir().join("soundstage"),
        }
    }
}

/// FFmpeg 音频引擎
pub struct FfmpegAudioEngine {
    config: FfmpegEngineConfig,
}

impl FfmpegAudioEngine {
    pub fn new(config: FfmpegEngineConfig) -> Self {
        Self { config }
    }

    /// 检查 ffmpeg 是否可用
    pub async fn check_available(&self) -> Result<(), AudioEngineError> {
        let output = Command::new(&self.config.binary)
            .arg("-version")
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                AudioEngineError::Spawn(format!("{} not available: {}", self.config.binary, e))
            })?;
        if !output.status.success() {
            return Err(AudioEngineError::Spawn(format!(
                "{} -version exited with {}",
                self.config.binary, output.status
            )));
        }
        Ok(())
    }
}

/// 根据内容选择输入文件扩展名，帮助 ffmpeg 识别格式
fn sniff_extension(data: &[u8]) -> &'static str {
    if data.starts_with(b"RIFF") {
        "wav"
    } else if data.starts_with(b"ID3") || (data.len() > 1 && data[0] == 0xFF && data[1] & 0xE0 == 0xE0)
    {
        "mp3"
    } else if data.starts_with(b"OggS") {
        "ogg"
    } else if data.starts_with(b"fLaC") {
        "flac"
    } else {
        "bin"
    }
}

/// 构建 ffmpeg 参数列表
pub fn build_ffmpeg_args(
    input_paths: &[PathBuf],
    graph: &str,
    output: OutputCodec,
    output_path: &Path,
) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-hide_banner".into(),
        "-nostdin".into(),
        "-loglevel".into(),
        "error".into(),
        "-y".into(),
    ];

    for path in input_paths {
        args.push("-i".into());
        args.push(path.to_string_lossy().to_string());
    }

    args.push("-filter_complex".into());
    args.push(graph.to_string());
    args.push("-map".into());
    args.push(format!("[{}]", OUTPUT_LABEL));

    let format = output.format();
    args.push("-ar".into());
    args.push(format.sample_rate.to_string());
    args.push("-ac".into());
    args.push(format.channels.to_string());

    match output {
        OutputCodec::Wav(_) => {
            args.push("-c:a".into());
            args.push("pcm_s16le".into());
        }
        OutputCodec::Mp3 { bitrate_kbps, .. } => {
            args.push("-c:a".into());
            args.push("libmp3lame".into());
            args.push("-b:a".into());
            args.push(format!("{}k", bitrate_kbps));
        }
    }

    args.push(output_path.to_string_lossy().to_string());
    args
}

fn truncate_stderr(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let trimmed = text.trim();
    match trimmed.char_indices().nth(MAX_STDERR_CHARS) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[async_trait]
impl AudioEnginePort for FfmpegAudioEngine {
    async fn apply(&self, job: FilterJob<'_>) -> Result<Vec<u8>, AudioEngineError> {
        let scratch = ScratchDir::create(&self.config.scratch_root)
            .await
            .map_err(|e| AudioEngineError::Io(format!("create scratch dir: {}", e)))?;

        let mut input_paths = Vec::with_capacity(job.inputs.len());
        for (i, input) in job.inputs.iter().enumerate() {
            let path = scratch.file(&format!("in{}.{}", i, sniff_extension(input)));
            tokio::fs::write(&path, input)
                .await
                .map_err(|e| AudioEngineError::Io(format!("write input {}: {}", i, e)))?;
            input_paths.push(path);
        }

        let output_path = scratch.file(&format!("out.{}", job.output.extension()));
        let args = build_ffmpeg_args(&input_paths, &job.graph, job.output, &output_path);

        tracing::debug!(
            stage = %job.stage,
            segment = ?job.segment,
            inputs = input_paths.len(),
            scratch = %scratch.path().display(),
            "Running ffmpeg"
        );

        let output = Command::new(&self.config.binary)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AudioEngineError::Spawn(format!("Failed to launch ffmpeg: {}", e)))?;

        if !output.status.success() {
            return Err(AudioEngineError::Process {
                status: output.status.code().unwrap_or(-1),
                stderr: truncate_stderr(&output.stderr),
            });
        }

        let data = tokio::fs::read(&output_path)
            .await
            .map_err(|e| AudioEngineError::Io(format!("read output: {}", e)))?;
        if data.is_empty() {
            return Err(AudioEngineError::EmptyOutput);
        }

        Ok(data)
    }
}
