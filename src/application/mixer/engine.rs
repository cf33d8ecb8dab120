//! 混音引擎
//!
//! 严格顺序的八个阶段：
//! 1. 逐段处理（静音本地合成）
//! 2. 时间线计算与对白主干拼接（进程内）
//! 3. 音效总线
//! 4. 音乐层（可选）
//! 5. 最终混音（侧链压缩 + 限幅）
//! 6. 结尾静音（进程内）
//! 7. 响度标准化
//! 8. 编码
//!
//! 任一阶段失败即中止，不做内部重试

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::application::ports::{AudioEnginePort, FilterJob, MixStage, OutputCodec};
use crate::domain::audio::{wav, PcmFormat};
use crate::domain::script::Segment;
use crate::domain::sfx;

use super::error::MixError;
use super::graph;
use super::options::{LoudnessTarget, MixOptions};
use super::rendered::RenderedSegment;
use super::timeline::{self, TimelineEvent, TimelineItem};

/// 混音引擎的固定设置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MixerSettings {
    /// 中间产物的 PCM 格式
    pub format: PcmFormat,
    /// 成品编码
    pub codec: OutputCodec,
    pub loudness: LoudnessTarget,
}

impl Default for MixerSettings {
    fn default() -> Self {
        let format = PcmFormat::default();
        Self {
            format,
            codec: OutputCodec::Mp3 {
                bitrate_kbps: 128,
                format,
            },
            loudness: LoudnessTarget::default(),
        }
    }
}

/// 混音结果
#[derive(Debug, Clone)]
pub struct MixOutput {
    /// 编码后的成品音频
    pub audio: Vec<u8>,
    pub codec: OutputCodec,
    /// 对白主干时长（秒）
    pub backbone_secs: f64,
    /// 编码前实测的成品时长（秒）
    pub duration_secs: f64,
    /// 已放置的音效层事件
    pub events: Vec<TimelineEvent>,
    /// 因音频为空被跳过的片段序号
    pub skipped: Vec<usize>,
}

/// 混音引擎
pub struct MixingEngine {
    engine: Arc<dyn AudioEnginePort>,
    settings: MixerSettings,
}

impl MixingEngine {
    pub fn new(engine: Arc<dyn AudioEnginePort>, settings: MixerSettings) -> Self {
        Self { engine, settings }
    }

    pub fn settings(&self) -> &MixerSettings {
        &self.settings
    }

    /// 混音
    ///
    /// `segments` 允许有缺口（合成失败被跳过的片段），序号仅用于日志与报告
    pub async fn mix(
        &self,
        segments: &[RenderedSegment],
        music: Option<&[u8]>,
        options: &MixOptions,
    ) -> Result<MixOutput, MixError> {
        let format = self.settings.format;
        let wav_out = OutputCodec::Wav(format);

        // ---- 阶段 1: 逐段处理 ----
        let mut backbone_parts: Vec<Vec<u8>> = Vec::new();
        let mut items: Vec<TimelineItem> = Vec::new();
        let mut event_audio: Vec<Vec<u8>> = Vec::new();
        let mut skipped = Vec::new();

        for rendered in segments {
            let index = rendered.index;
            let segment = &rendered.segment;

            // 结尾锁定由阶段 6 注入时长
            if segment.is_ending_lock() {
                continue;
            }

            if let Segment::Silence { duration_secs, .. } = segment {
                backbone_parts.push(wav::silence(*duration_secs, format));
                items.push(TimelineItem::Advance(duration_secs.max(0.0)));
                continue;
            }

            if rendered.audio.is_empty() {
                tracing::warn!(
                    segment = index,
                    kind = segment.kind_name(),
                    "Skipping segment with empty audio"
                );
                skipped.push(index);
                continue;
            }

            let graph = match segment {
                Segment::Dialogue { scene, .. } => {
                    graph::dialogue(*scene, options.dialogue_volume, format)
                }
                Segment::Sfx {
                    cue, prompt, role, ..
                } => {
                    let news_like = sfx::is_news_like(cue) || sfx::is_news_like(prompt);
                    graph::sfx(*role, news_like, options.sfx_volume, format)
                }
                Segment::Motif { motif, .. } => graph::motif(*motif, options.sfx_volume, format),
                Segment::Silence { .. } => continue,
            };

            let processed = self
                .run(
                    MixStage::SegmentProcessing,
                    Some(index),
                    graph,
                    vec![rendered.audio.as_slice()],
                    wav_out,
                )
                .await?;
            let secs = measure(&processed, MixStage::SegmentProcessing, Some(index))?;

            match rendered.role() {
                Some(role) => {
                    items.push(TimelineItem::Event {
                        index,
                        role,
                        duration_secs: secs,
                    });
                    event_audio.push(processed);
                }
                None => {
                    items.push(TimelineItem::Advance(secs));
                    backbone_parts.push(processed);
                }
            }
        }

        if backbone_parts.is_empty() {
            return Err(MixError::NoContent);
        }

        // ---- 阶段 2: 时间线与对白主干 ----
        let timeline = timeline::build(items);
        let parts: Vec<&[u8]> = backbone_parts.iter().map(Vec::as_slice).collect();
        let backbone = wav::concat(&parts).map_err(|source| MixError::InvalidAudio {
            stage: MixStage::Timeline,
            segment: None,
            source,
        })?;

        tracing::info!(
            backbone_secs = timeline.backbone_secs,
            events = timeline.events.len(),
            skipped = skipped.len(),
            "Timeline assembled"
        );

        // ---- 阶段 3: 音效总线 ----
        let sfx_bus = match graph::sfx_bus(&timeline, format) {
            Some(graph) => {
                let inputs = event_audio.iter().map(Vec::as_slice).collect();
                Some(
                    self.run(MixStage::SfxBus, None, graph, inputs, wav_out)
                        .await?,
                )
            }
            None => None,
        };

        // ---- 阶段 4: 音乐层 ----
        let music_bus = match music.filter(|m| !m.is_empty()) {
            Some(music) => Some(
                self.run(
                    MixStage::MusicBed,
                    None,
                    graph::music_bed(timeline.backbone_secs, options, format),
                    vec![music],
                    wav_out,
                )
                .await?,
            ),
            None => None,
        };

        // ---- 阶段 5: 最终混音 ----
        let mut inputs = vec![backbone.as_slice()];
        inputs.extend(sfx_bus.as_deref());
        inputs.extend(music_bus.as_deref());
        let mixed = self
            .run(
                MixStage::Mixdown,
                None,
                graph::mixdown(sfx_bus.is_some(), music_bus.is_some(), format),
                inputs,
                wav_out,
            )
            .await?;

        // ---- 阶段 6: 结尾静音 ----
        let ended = if options.end_with_silence && options.ending_silence_secs > 0.0 {
            wav::append_silence(&mixed, options.ending_silence_secs).map_err(|source| {
                MixError::InvalidAudio {
                    stage: MixStage::Ending,
                    segment: None,
                    source,
                }
            })?
        } else {
            mixed
        };

        // ---- 阶段 7: 响度标准化 ----
        let mastered = if options.normalize {
            self.run(
                MixStage::Loudness,
                None,
                graph::loudness(&self.settings.loudness, format),
                vec![ended.as_slice()],
                wav_out,
            )
            .await?
        } else {
            ended
        };
        let duration_secs = measure(&mastered, MixStage::Loudness, None)?;

        // ---- 阶段 8: 编码 ----
        let audio = match self.settings.codec {
            OutputCodec::Wav(_) => mastered,
            codec => {
                self.run(
                    MixStage::Encode,
                    None,
                    graph::encode(),
                    vec![mastered.as_slice()],
                    codec,
                )
                .await?
            }
        };

        tracing::info!(
            backbone_secs = timeline.backbone_secs,
            duration_secs,
            bytes = audio.len(),
            codec = self.settings.codec.extension(),
            "Mix completed"
        );

        Ok(MixOutput {
            audio,
            codec: self.settings.codec,
            backbone_secs: timeline.backbone_secs,
            duration_secs,
            events: timeline.events,
            skipped,
        })
    }

    async fn run(
        &self,
        stage: MixStage,
        segment: Option<usize>,
        graph: String,
        inputs: Vec<&[u8]>,
        output: OutputCodec,
    ) -> Result<Vec<u8>, MixError> {
        tracing::debug!(stage = %stage, segment = ?segment, inputs = inputs.len(), "Running filter graph");

        let job = FilterJob {
            stage,
            segment,
            graph,
            inputs,
            output,
        };
        self.engine.apply(job).await.map_err(|source| {
            tracing::error!(stage = %stage, segment = ?segment, error = %source, "Mix stage failed");
            MixError::Stage {
                stage,
                segment,
                source,
            }
        })
    }
}

/// 以 WAV 头实测时长
fn measure(audio: &[u8], stage: MixStage, segment: Option<usize>) -> Result<f64, MixError> {
    wav::duration_secs(audio).map_err(|source| MixError::InvalidAudio {
        stage,
        segment,
        source,
    })
}
