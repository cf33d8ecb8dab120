//! PCM WAV 工具
//!
//! 混音流水线的中间产物统一为 16 位 PCM WAV：
//! - WAV 头解析与时长测量
//! - 本地合成静音 / 测试音
//! - 同格式 WAV 拼接、尾部追加静音

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// WAV 处理错误
#[derive(Debug, Error)]
pub enum WavError {
    #[error("Invalid WAV: {0}")]
    InvalidInput(String),

    #[error("Unsupported WAV: {0}")]
    Unsupported(String),

    #[error("WAV format mismatch: expected {expected}, found {found}")]
    FormatMismatch {
        expected: PcmFormat,
        found: PcmFormat,
    },
}

const BITS_PER_SAMPLE: u16 = 16;
const BYTES_PER_SAMPLE: usize = 2;

/// 16 位 PCM 格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 1,
        }
    }
}

impl PcmFormat {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// 每帧字节数
    pub fn block_align(&self) -> usize {
        self.channels as usize * BYTES_PER_SAMPLE
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }

    /// ffmpeg channel_layouts 名称
    pub fn channel_layout(&self) -> &'static str {
        if self.channels == 1 {
            "mono"
        } else {
            "stereo"
        }
    }

    fn frames_for(&self, secs: f64) -> usize {
        (secs.max(0.0) * self.sample_rate as f64).round() as usize
    }
}

impl std::fmt::Display for PcmFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}Hz/{}ch/s16", self.sample_rate, self.channels)
    }
}

/// WAV 头信息
#[derive(Debug, Clone, Copy)]
pub struct WavInfo {
    pub format: PcmFormat,
    pub bits_per_sample: u16,
    pub data_start: usize,
    pub data_size: usize,
}

impl WavInfo {
    /// 解析 WAV 文件头
    pub fn parse(data: &[u8]) -> Result<Self, WavError> {
        if data.len() < 44 {
            return Err(WavError::InvalidInput("WAV data too short".to_string()));
        }

        // 验证 RIFF 头
        if &data[0..4] != b"RIFF" {
            return Err(WavError::InvalidInput("missing RIFF header".to_string()));
        }

        // 验证 WAVE 标识
        if &data[8..12] != b"WAVE" {
            return Err(WavError::InvalidInput("missing WAVE identifier".to_string()));
        }

        let mut pos = 12;
        let mut format: Option<(PcmFormat, u16)> = None;
        let mut data_chunk: Option<(usize, usize)> = None;

        while pos + 8 <= data.len() {
            let chunk_id = &data[pos..pos + 4];
            let chunk_size = read_u32(data, pos + 4) as usize;

            match chunk_id {
                b"fmt " => {
                    if chunk_size < 16 || pos + 8 + 16 > data.len() {
                        return Err(WavError::InvalidInput("invalid fmt chunk size".to_string()));
                    }
                    let fmt = pos + 8;
                    let audio_format = read_u16(data, fmt);
                    // 1 = PCM, 0xFFFE = WAVE_FORMAT_EXTENSIBLE
                    if audio_format != 1 && audio_format != 0xFFFE {
                        return Err(WavError::Unsupported(format!(
                            "audio format tag {}",
                            audio_format
                        )));
                    }
                    let channels = read_u16(data, fmt + 2);
                    let sample_rate = read_u32(data, fmt + 4);
                    let bits = read_u16(data, fmt + 14);
                    format = Some((PcmFormat::new(sample_rate, channels), bits));
                }
                b"data" => {
                    let start = pos + 8;
                    // 流式写出的 WAV 可能携带占位长度，按实际字节截断
                    let size = chunk_size.min(data.len() - start);
                    data_chunk = Some((start, size));
                    break;
                }
                _ => {}
            }

            pos += 8 + chunk_size;
            // 对齐到偶数字节
            if chunk_size % 2 != 0 {
                pos += 1;
            }
        }

        let (format, bits_per_sample) =
            format.ok_or_else(|| WavError::InvalidInput("missing fmt chunk".to_string()))?;
        let (data_start, data_size) =
            data_chunk.ok_or_else(|| WavError::InvalidInput("missing data chunk".to_string()))?;

        if bits_per_sample != BITS_PER_SAMPLE {
            return Err(WavError::Unsupported(format!(
                "{} bits per sample",
                bits_per_sample
            )));
        }
        if format.channels == 0 || format.sample_rate == 0 {
            return Err(WavError::InvalidInput("zero channels or sample rate".to_string()));
        }

        Ok(Self {
            format,
            bits_per_sample,
            data_start,
            data_size,
        })
    }

    /// 音频时长（秒）
    pub fn duration_secs(&self) -> f64 {
        let frames = self.data_size / self.format.block_align();
        frames as f64 / self.format.sample_rate as f64
    }

    /// PCM 数据区
    pub fn pcm<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        let end = self.data_start + self.data_size - self.data_size % self.format.block_align();
        &data[self.data_start..end]
    }
}

/// 测量 WAV 时长（秒）
pub fn duration_secs(data: &[u8]) -> Result<f64, WavError> {
    Ok(WavInfo::parse(data)?.duration_secs())
}

/// 将 PCM 数据封装为 WAV
pub fn encode(format: PcmFormat, pcm: &[u8]) -> Vec<u8> {
    let data_size = pcm.len();
    let file_size = 36 + data_size;
    let mut wav = Vec::with_capacity(44 + data_size);

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(file_size as u32).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM
    wav.extend_from_slice(&format.channels.to_le_bytes());
    wav.extend_from_slice(&format.sample_rate.to_le_bytes());
    wav.extend_from_slice(&format.byte_rate().to_le_bytes());
    wav.extend_from_slice(&(format.block_align() as u16).to_le_bytes());
    wav.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&(data_size as u32).to_le_bytes());
    wav.extend_from_slice(pcm);

    wav
}

/// 本地合成静音
pub fn silence(secs: f64, format: PcmFormat) -> Vec<u8> {
    let frames = format.frames_for(secs);
    encode(format, &vec![0u8; frames * format.block_align()])
}

/// 本地合成正弦测试音（用于演练模式的假合成）
pub fn tone(secs: f64, frequency_hz: f64, amplitude: f32, format: PcmFormat) -> Vec<u8> {
    let frames = format.frames_for(secs);
    let amplitude = amplitude.clamp(0.0, 1.0);
    let mut pcm = Vec::with_capacity(frames * format.block_align());
    for i in 0..frames {
        let t = i as f64 / format.sample_rate as f64;
        let value = (t * frequency_hz * std::f64::consts::TAU).sin() as f32 * amplitude;
        let sample = (value * 32767.0) as i16;
        for _ in 0..format.channels {
            pcm.extend_from_slice(&sample.to_le_bytes());
        }
    }
    encode(format, &pcm)
}

/// 拼接多段同格式 WAV
pub fn concat(parts: &[&[u8]]) -> Result<Vec<u8>, WavError> {
    let mut format: Option<PcmFormat> = None;
    let mut pcm = Vec::new();

    for part in parts {
        let info = WavInfo::parse(part)?;
        match format {
            None => format = Some(info.format),
            Some(expected) if expected != info.format => {
                return Err(WavError::FormatMismatch {
                    expected,
                    found: info.format,
                });
            }
            Some(_) => {}
        }
        pcm.extend_from_slice(info.pcm(part));
    }

    let format =
        format.ok_or_else(|| WavError::InvalidInput("nothing to concatenate".to_string()))?;
    Ok(encode(format, &pcm))
}

/// 在 WAV 尾部追加静音
pub fn append_silence(data: &[u8], secs: f64) -> Result<Vec<u8>, WavError> {
    let info = WavInfo::parse(data)?;
    let mut pcm = info.pcm(data).to_vec();
    pcm.resize(
        pcm.len() + info.format.frames_for(secs) * info.format.block_align(),
        0,
    );
    Ok(encode(info.format, &pcm))
}

fn read_u16(data: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([data[pos], data[pos + 1]])
}

fn read_u32(data: &[u8], pos: usize) -> u32 {
    u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
}
