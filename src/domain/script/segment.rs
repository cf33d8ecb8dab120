//! Script Context - 片段类型
//!
//! 片段序列即时间线顺序。每种片段只携带自己需要的字段。

use serde::{Deserialize, Serialize};

use crate::domain::sfx::SfxRole;

/// 场景类型，影响对白的声音染色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneType {
    #[default]
    Normal,
    Tense,
    Hospital,
    Psychoacoustic,
    Revelation,
}

/// 叙事动机音（反复出现的标志性音效）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotifType {
    Ouroboros,
    Heartbeat,
    Glitch,
}

impl MotifType {
    /// 送往音效服务的标志音提示词
    pub fn signature_prompt(&self) -> &'static str {
        match self {
            MotifType::Ouroboros => "low ominous choral swell looping back on itself, dark and cyclical",
            MotifType::Heartbeat => "slow deep heartbeat, two heavy beats, close and muffled",
            MotifType::Glitch => "short digital glitch burst, stuttering static, electronic",
        }
    }

    /// 标志音的合成时长（秒）
    pub fn synthesis_secs(&self) -> f64 {
        match self {
            MotifType::Ouroboros => 5.0,
            MotifType::Heartbeat => 4.0,
            MotifType::Glitch => 2.0,
        }
    }
}

/// 静音来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SilenceKind {
    /// 脚本中的停顿或静音提示
    Pause,
    /// 场景切换（分隔线、场景标题、镜头指示）
    SceneTransition,
    /// 结尾锁定标记，时长由混音引擎注入
    EndingLock,
}

/// 脚本片段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    Dialogue {
        speaker: String,
        emotion: Option<String>,
        text: String,
        scene: SceneType,
    },
    Sfx {
        cue: String,
        prompt: String,
        role: SfxRole,
        scene: SceneType,
    },
    Silence {
        duration_secs: f64,
        silence: SilenceKind,
        scene: SceneType,
    },
    Motif {
        motif: MotifType,
        cue: String,
        scene: SceneType,
    },
}

impl Segment {
    /// 结尾锁定标记
    pub fn ending_lock(scene: SceneType) -> Self {
        Segment::Silence {
            duration_secs: 0.0,
            silence: SilenceKind::EndingLock,
            scene,
        }
    }

    pub fn scene(&self) -> SceneType {
        match self {
            Segment::Dialogue { scene, .. }
            | Segment::Sfx { scene, .. }
            | Segment::Silence { scene, .. }
            | Segment::Motif { scene, .. } => *scene,
        }
    }

    /// 片段文本：对白内容或音效提示原文，静音为空
    pub fn text(&self) -> &str {
        match self {
            Segment::Dialogue { text, .. } => text,
            Segment::Sfx { cue, .. } | Segment::Motif { cue, .. } => cue,
            Segment::Silence { .. } => "",
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Segment::Dialogue { .. } => "dialogue",
            Segment::Sfx { .. } => "sfx",
            Segment::Silence { .. } => "silence",
            Segment::Motif { .. } => "motif",
        }
    }

    /// 对白和静音推进时间线，音效和动机音只记录偏移
    pub fn advances_clock(&self) -> bool {
        matches!(self, Segment::Dialogue { .. } | Segment::Silence { .. })
    }

    pub fn is_ending_lock(&self) -> bool {
        matches!(
            self,
            Segment::Silence {
                silence: SilenceKind::EndingLock,
                ..
            }
        )
    }

    /// 是否需要外部合成（对白、音效、动机音）
    pub fn is_audible(&self) -> bool {
        !matches!(self, Segment::Silence { .. })
    }

    /// 过滤规则：非静音片段必须有非空文本
    pub fn has_content(&self) -> bool {
        match self {
            Segment::Silence { .. } => true,
            _ => !self.text().trim().is_empty(),
        }
    }
}
