//! Episode Commands - 单集制作命令

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::application::mixer::{MixOptions, TimelineEvent};
use crate::domain::voice::VoiceAssignment;

/// 制作一集
#[derive(Debug, Clone)]
pub struct ProduceEpisodeCommand {
    pub episode_id: Uuid,
    /// 原始脚本文本
    pub script: String,
    /// 背景音乐（任意可解码格式）
    pub music: Option<Vec<u8>>,
    /// 角色 → 音色覆盖
    pub voice_overrides: HashMap<String, String>,
    /// 为空时使用配置中的默认口音
    pub accent: Option<String>,
    pub options: MixOptions,
    /// 分段前先规范化脚本
    pub normalize_script: bool,
}

impl ProduceEpisodeCommand {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            episode_id: Uuid::new_v4(),
            script: script.into(),
            music: None,
            voice_overrides: HashMap::new(),
            accent: None,
            options: MixOptions::default(),
            normalize_script: true,
        }
    }
}

/// 合成失败被跳过的片段
#[derive(Debug, Clone, Serialize)]
pub struct SkippedSegment {
    pub index: usize,
    pub kind: &'static str,
    pub reason: String,
}

/// 制作结果
#[derive(Debug, Clone, Serialize)]
pub struct ProduceEpisodeResponse {
    pub episode_id: Uuid,
    /// 对象存储键
    pub key: String,
    pub url: String,
    pub content_type: &'static str,
    pub bytes: usize,
    /// 解码成品得到的时长
    pub duration_secs: f64,
    pub backbone_secs: f64,
    pub segment_count: usize,
    pub rendered_count: usize,
    pub skipped: Vec<SkippedSegment>,
    pub voices: Vec<VoiceAssignment>,
    pub events: Vec<TimelineEvent>,
    pub produced_at: DateTime<Utc>,
}
