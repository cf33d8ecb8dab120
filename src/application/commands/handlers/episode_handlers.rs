//! Episode Handlers - 单集制作编排
//!
//! 规范化 → 分段 → 分配音色 → 并发合成（失败跳过）→ 混音 → 测量 → 上传

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use tokio::sync::Mutex;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::application::commands::episode_commands::*;
use crate::application::error::ApplicationError;
use crate::application::mixer::{MixingEngine, RenderedSegment};
use crate::application::ports::{
    AudioProbePort, BlobStorePort, SfxEnginePort, SfxRequest, TtsEnginePort, TtsRequest,
};
use crate::domain::script::{normalize_script, parse, Segment};
use crate::domain::sfx::{self, ShapedPrompt};
use crate::domain::voice::{VoiceCatalog, VoiceResolver, VoiceSettings};

/// 日志中保留的文本长度
const LOG_TEXT_CHARS: usize = 80;

/// 制作流程配置
#[derive(Debug, Clone)]
pub struct ProduceEpisodeConfig {
    /// 同时进行的外部合成请求数
    pub max_concurrent: usize,
    /// 每次外部调用前的等待
    pub request_delay: Duration,
    /// 默认口音
    pub accent: String,
    /// 对象存储键前缀
    pub key_prefix: String,
}

impl Default for ProduceEpisodeConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 3,
            request_delay: Duration::from_millis(250),
            accent: "neutral".to_string(),
            key_prefix: "episodes".to_string(),
        }
    }
}

/// 单个片段的合成任务
enum RenderJob {
    /// 静音无需外部调用
    Ready(RenderedSegment),
    Speech {
        index: usize,
        segment: Segment,
        request: TtsRequest,
    },
    Sound {
        index: usize,
        segment: Segment,
        request: SfxRequest,
    },
}

/// 外部调用节拍器
///
/// 所有并发任务共享一个 `Interval`，相邻两次调用至少间隔 `delay`
struct Pacer {
    interval: Option<Mutex<Interval>>,
}

impl Pacer {
    fn new(delay: Duration) -> Self {
        let interval = (!delay.is_zero()).then(|| {
            let mut interval = tokio::time::interval_at(Instant::now() + delay, delay);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            Mutex::new(interval)
        });
        Self { interval }
    }

    async fn wait(&self) {
        if let Some(interval) = &self.interval {
            interval.lock().await.tick().await;
        }
    }
}

/// ProduceEpisode Handler - 制作一集
pub struct ProduceEpisodeHandler {
    tts: Arc<dyn TtsEnginePort>,
    sfx: Arc<dyn SfxEnginePort>,
    mixer: Arc<MixingEngine>,
    probe: Arc<dyn AudioProbePort>,
    blob_store: Arc<dyn BlobStorePort>,
    catalog: Arc<VoiceCatalog>,
    config: ProduceEpisodeConfig,
}

impl ProduceEpisodeHandler {
    pub fn new(
        tts: Arc<dyn TtsEnginePort>,
        sfx: Arc<dyn SfxEnginePort>,
        mixer: Arc<MixingEngine>,
        probe: Arc<dyn AudioProbePort>,
        blob_store: Arc<dyn BlobStorePort>,
        catalog: Arc<VoiceCatalog>,
        config: ProduceEpisodeConfig,
    ) -> Self {
        Self {
            tts,
            sfx,
            mixer,
            probe,
            blob_store,
            catalog,
            config,
        }
    }

    pub async fn handle(
        &self,
        cmd: ProduceEpisodeCommand,
    ) -> Result<ProduceEpisodeResponse, ApplicationError> {
        cmd.options.validate().map_err(ApplicationError::validation)?;

        let script = if cmd.normalize_script {
            normalize_script(&cmd.script)
        } else {
            cmd.script.clone()
        };
        let segments = parse(&script);

        let audible = segments.iter().filter(|s| s.is_audible()).count();
        if audible == 0 {
            return Err(ApplicationError::no_content(
                "script has no dialogue or sound cues",
            ));
        }

        tracing::info!(
            episode_id = %cmd.episode_id,
            segments = segments.len(),
            audible,
            "Script segmented"
        );

        // 每集一个新的音色分配会话
        let accent = cmd
            .accent
            .clone()
            .unwrap_or_else(|| self.config.accent.clone());
        let mut resolver =
            VoiceResolver::new(self.catalog.clone(), accent, cmd.voice_overrides.clone());
        resolver.reset();

        let jobs: Vec<RenderJob> = segments
            .iter()
            .enumerate()
            .map(|(index, segment)| plan(index, segment, &mut resolver))
            .collect();

        let pacer = Pacer::new(self.config.request_delay);
        let results: Vec<Result<RenderedSegment, SkippedSegment>> = stream::iter(jobs)
            .map(|job| self.render(job, &pacer))
            .buffered(self.config.max_concurrent.max(1))
            .collect()
            .await;

        let mut rendered = Vec::with_capacity(results.len());
        let mut skipped = Vec::new();
        for result in results {
            match result {
                Ok(segment) => rendered.push(segment),
                Err(skip) => skipped.push(skip),
            }
        }

        let rendered_audible = rendered.iter().filter(|r| r.segment.is_audible()).count();
        if rendered_audible == 0 {
            return Err(ApplicationError::no_content(format!(
                "all {} synthesis requests failed",
                audible
            )));
        }

        tracing::info!(
            episode_id = %cmd.episode_id,
            rendered = rendered_audible,
            skipped = skipped.len(),
            "Synthesis finished"
        );

        let output = self
            .mixer
            .mix(&rendered, cmd.music.as_deref(), &cmd.options)
            .await?;

        let duration_secs = self.probe.duration_secs(&output.audio).await?;

        let key = format!(
            "{}/{}/{:x}.{}",
            self.config.key_prefix.trim_matches('/'),
            cmd.episode_id,
            md5::compute(&output.audio),
            output.codec.extension()
        );
        let content_type = output.codec.content_type();
        let bytes = output.audio.len();
        let url = self.blob_store.put(&key, output.audio, content_type).await?;

        tracing::info!(
            episode_id = %cmd.episode_id,
            key = %key,
            bytes,
            duration_secs,
            "Episode produced"
        );

        Ok(ProduceEpisodeResponse {
            episode_id: cmd.episode_id,
            key,
            url,
            content_type,
            bytes,
            duration_secs,
            backbone_secs: output.backbone_secs,
            segment_count: segments.len(),
            rendered_count: rendered_audible,
            skipped,
            voices: resolver.assignments(),
            events: output.events,
            produced_at: Utc::now(),
        })
    }

    async fn render(
        &self,
        job: RenderJob,
        pacer: &Pacer,
    ) -> Result<RenderedSegment, SkippedSegment> {
        let (index, segment, result) = match job {
            RenderJob::Ready(rendered) => return Ok(rendered),
            RenderJob::Speech {
                index,
                segment,
                request,
            } => {
                pacer.wait().await;
                let voice_id = request.voice_id.clone();
                let result = self
                    .tts
                    .synthesize(request)
                    .await
                    .map(|audio| audio.audio_data)
                    .map_err(|e| {
                        tracing::warn!(
                            segment = index,
                            kind = segment.kind_name(),
                            speaker = speaker_of(&segment),
                            voice_id = %voice_id,
                            text = %preview(segment.text()),
                            error = %e,
                            "Speech synthesis failed, skipping segment"
                        );
                        e.to_string()
                    });
                (index, segment, result)
            }
            RenderJob::Sound {
                index,
                segment,
                request,
            } => {
                pacer.wait().await;
                let result = self.sfx.generate(request).await.map_err(|e| {
                    tracing::warn!(
                        segment = index,
                        kind = segment.kind_name(),
                        text = %preview(segment.text()),
                        error = %e,
                        "Sound generation failed, skipping segment"
                    );
                    e.to_string()
                });
                (index, segment, result)
            }
        };

        match result {
            Ok(audio) if !audio.is_empty() => Ok(RenderedSegment::new(index, segment, audio)),
            Ok(_) => Err(SkippedSegment {
                index,
                kind: segment.kind_name(),
                reason: "empty audio".to_string(),
            }),
            Err(reason) => Err(SkippedSegment {
                index,
                kind: segment.kind_name(),
                reason,
            }),
        }
    }
}

/// 按片段顺序生成合成任务，音色在此时按出场顺序分配
fn plan(index: usize, segment: &Segment, resolver: &mut VoiceResolver) -> RenderJob {
    match segment {
        Segment::Silence { .. } => RenderJob::Ready(RenderedSegment::silence(index, segment.clone())),
        Segment::Dialogue {
            speaker,
            emotion,
            text,
            ..
        } => RenderJob::Speech {
            index,
            segment: segment.clone(),
            request: TtsRequest {
                text: text.clone(),
                voice_id: resolver.resolve(speaker),
                settings: VoiceSettings::for_emotion(emotion.as_deref()),
            },
        },
        Segment::Sfx { prompt, role, .. } => {
            let shaped = ShapedPrompt {
                prompt: prompt.clone(),
                role: *role,
            };
            RenderJob::Sound {
                index,
                segment: segment.clone(),
                request: SfxRequest::new(prompt.clone(), sfx::synthesis_duration(&shaped)),
            }
        }
        Segment::Motif { motif, .. } => RenderJob::Sound {
            index,
            segment: segment.clone(),
            request: SfxRequest::new(motif.signature_prompt(), motif.synthesis_secs()),
        },
    }
}

fn speaker_of(segment: &Segment) -> &str {
    match segment {
        Segment::Dialogue { speaker, .. } => speaker,
        _ => "",
    }
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(LOG_TEXT_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
