//! SFX Context - 音效提示整形
//!
//! 职责:
//! - 自由文本音效提示 → 规范提示词
//! - 环境底噪 (Bed) / 点音效 (Spot) 角色判定
//! - 时长估算与场景底噪描述

mod shaper;

use serde::{Deserialize, Serialize};

pub use shaper::{
    classify_role, derive_ambience_bed, estimate_duration, is_news_like, shape,
    synthesis_duration, ShapedPrompt, BED_SYNTHESIS_SECS, MAX_PROMPT_CHARS, MAX_SYNTHESIS_SECS,
};

/// 音效角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SfxRole {
    /// 持续铺底的环境声
    Bed,
    /// 单次触发的点音效
    Spot,
}

impl std::fmt::Display for SfxRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SfxRole::Bed => write!(f, "bed"),
            SfxRole::Spot => write!(f, "spot"),
        }
    }
}
