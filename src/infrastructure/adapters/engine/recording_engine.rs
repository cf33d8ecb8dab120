//! Recording Audio Engine - 测试与演练用
//!
//! 不执行滤镜图，只记录每次调用，并把第一个可解析的 WAV 输入原样作为输出。
//! 可以指定在某个阶段失败，用于验证错误传播。

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::ports::{
    AudioEngineError, AudioEnginePort, FilterJob, MixStage, OutputCodec,
};
use crate::domain::audio::WavInfo;

/// 一次被记录的调用
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedJob {
    pub stage: MixStage,
    pub segment: Option<usize>,
    pub graph: String,
    pub input_count: usize,
    pub output: OutputCodec,
}

#[derive(Debug, Default)]
pub struct RecordingAudioEngine {
    jobs: Arc<Mutex<Vec<RecordedJob>>>,
    fail_stage: Option<MixStage>,
}

impl RecordingAudioEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在指定阶段返回进程错误
    pub fn failing_at(stage: MixStage) -> Self {
        Self {
            jobs: Arc::default(),
            fail_stage: Some(stage),
        }
    }

    pub async fn jobs(&self) -> Vec<RecordedJob> {
        self.jobs.lock().await.clone()
    }

    /// 按调用顺序列出阶段（相邻重复合并）
    pub async fn stages(&self) -> Vec<MixStage> {
        let mut stages: Vec<MixStage> = self.jobs.lock().await.iter().map(|j| j.stage).collect();
        stages.dedup();
        stages
    }
}

#[async_trait]
impl AudioEnginePort for RecordingAudioEngine {
    async fn apply(&self, job: FilterJob<'_>) -> Result<Vec<u8>, AudioEngineError> {
        self.jobs.lock().await.push(RecordedJob {
            stage: job.stage,
            segment: job.segment,
            graph: job.graph.clone(),
            input_count: job.inputs.len(),
            output: job.output,
        });

        if self.fail_stage == Some(job.stage) {
            return Err(AudioEngineError::Process {
                status: 1,
                stderr: format!("simulated failure at {}", job.stage),
            });
        }

        job.inputs
            .iter()
            .find(|input| WavInfo::parse(input).is_ok())
            .map(|input| input.to_vec())
            .ok_or(AudioEngineError::EmptyOutput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audio::{wav, PcmFormat};

    fn job<'a>(stage: MixStage, inputs: Vec<&'a [u8]>) -> FilterJob<'a> {
        FilterJob {
            stage,
            segment: None,
            graph: "[0:a]anull[out]".to_string(),
            inputs,
            output: OutputCodec::Wav(PcmFormat::default()),
        }
    }

    #[tokio::test]
    async fn test_passes_first_wav_through() {
        let engine = RecordingAudioEngine::new();
        let first = wav::silence(1.0, PcmFormat::default());
        let second = wav::silence(2.0, PcmFormat::default());
        let junk = b"not audio".to_vec();

        let out = engine
            .apply(job(MixStage::Mixdown, vec![&junk, &first, &second]))
            .await
            .unwrap();
        assert_eq!(out, first);

        let jobs = engine.jobs().await;
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].input_count, 3);
    }

    #[tokio::test]
    async fn test_fail_stage() {
        let engine = RecordingAudioEngine::failing_at(MixStage::Loudness);
        let audio = wav::silence(1.0, PcmFormat::default());

        assert!(engine.apply(job(MixStage::Mixdown, vec![&audio])).await.is_ok());
        let err = engine
            .apply(job(MixStage::Loudness, vec![&audio]))
            .await
            .unwrap_err();
        assert!(matches!(err, AudioEngineError::Process { status: 1, .. }));
        assert_eq!(
            engine.stages().await,
            vec![MixStage::Mixdown, MixStage::Loudness]
        );
    }

    #[tokio::test]
    async fn test_no_wav_input_is_empty_output() {
        let engine = RecordingAudioEngine::new();
        let err = engine.apply(job(MixStage::SfxBus, vec![])).await.unwrap_err();
        assert!(matches!(err, AudioEngineError::EmptyOutput));
    }
}
