//! Symphonia Probe - 解码成品音频并计算时长
//!
//! 逐包解码累计帧数，不依赖容器头中的时长字段（MP3 通常没有）

use async_trait::async_trait;
use std::io::Cursor;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{AudioProbePort, ProbeError};

#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaProbe;

impl SymphoniaProbe {
    pub fn new() -> Self {
        Self
    }
}

fn hint_for(data: &[u8]) -> Hint {
    let mut hint = Hint::new();
    if data.starts_with(b"RIFF") {
        hint.with_extension("wav");
    } else if data.starts_with(b"ID3") || (data.len() > 1 && data[0] == 0xFF) {
        hint.with_extension("mp3");
    }
    hint
}

/// 同步解码，返回时长（秒）
pub fn decode_duration(data: Vec<u8>) -> Result<f64, ProbeError> {
    let hint = hint_for(&data);
    let mss = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| ProbeError::UnsupportedFormat(format!("Probe failed: {}", e)))?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| ProbeError::DecodingError("No audio track found".to_string()))?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| ProbeError::UnsupportedFormat(format!("Decoder creation failed: {}", e)))?;

    let mut frames: u64 = 0;
    let mut sample_rate = track.codec_params.sample_rate;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => {
                return Err(ProbeError::DecodingError(format!("Packet read error: {}", e)));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                frames += decoded.frames() as u64;
                sample_rate = sample_rate.or(Some(decoded.spec().rate));
            }
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::warn!("Decode error (skipping packet): {}", e);
            }
            Err(e) => return Err(ProbeError::DecodingError(e.to_string())),
        }
    }

    let sample_rate = sample_rate
        .filter(|r| *r > 0)
        .ok_or_else(|| ProbeError::DecodingError("Unknown sample rate".to_string()))?;

    Ok(frames as f64 / sample_rate as f64)
}

#[async_trait]
impl AudioProbePort for SymphoniaProbe {
    async fn duration_secs(&self, data: &[u8]) -> Result<f64, ProbeError> {
        let data = data.to_vec();
        tokio::task::spawn_blocking(move || decode_duration(data))
            .await
            .map_err(|e| ProbeError::DecodingError(format!("Probe task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audio::{wav, PcmFormat};

    #[tokio::test]
    async fn test_wav_duration() {
        let audio = wav::tone(1.5, 440.0, 0.3, PcmFormat::new(22050, 2));
        let secs = SymphoniaProbe::new().duration_secs(&audio).await.unwrap();
        assert!((secs - 1.5).abs() < 0.01, "got {}", secs);
    }

    #[tokio::test]
    async fn test_garbage_is_rejected() {
        let result = SymphoniaProbe::new()
            .duration_secs(b"definitely not audio")
            .await;
        assert!(result.is_err());
    }
}
