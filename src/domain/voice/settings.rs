//! 情绪 → 合成参数

use serde::{Deserialize, Serialize};

use crate::domain::keywords::{first_match, KeywordRule};

/// 语音合成参数（ElevenLabs voice_settings）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
            style: 0.0,
        }
    }
}

const fn settings(stability: f32, similarity_boost: f32, style: f32) -> VoiceSettings {
    VoiceSettings {
        stability,
        similarity_boost,
        style,
    }
}

const EMOTION_RULES: &[KeywordRule<VoiceSettings>] = &[
    KeywordRule {
        keywords: &["angry", "furious", "shout", "yell", "rage"],
        result: settings(0.30, 0.80, 0.60),
    },
    KeywordRule {
        keywords: &["scared", "afraid", "terrified", "panic", "fear", "nervous"],
        result: settings(0.30, 0.75, 0.50),
    },
    KeywordRule {
        keywords: &["whisper", "hushed", "quiet", "soft"],
        result: settings(0.70, 0.75, 0.15),
    },
    KeywordRule {
        keywords: &["sad", "crying", "tearful", "grief", "broken"],
        result: settings(0.45, 0.75, 0.40),
    },
    KeywordRule {
        keywords: &["cold", "calm", "flat", "detached", "measured"],
        result: settings(0.75, 0.80, 0.10),
    },
    KeywordRule {
        keywords: &["excited", "happy", "joy", "eager", "laugh"],
        result: settings(0.40, 0.75, 0.45),
    },
];

impl VoiceSettings {
    /// 按情绪标签选择合成参数，未命中时使用默认值
    pub fn for_emotion(emotion: Option<&str>) -> Self {
        emotion
            .and_then(|e| first_match(EMOTION_RULES, e))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emotion_table() {
        assert_eq!(VoiceSettings::for_emotion(Some("cold")).stability, 0.75);
        assert_eq!(VoiceSettings::for_emotion(Some("Whispering")).style, 0.15);
        assert_eq!(VoiceSettings::for_emotion(Some("ANGRY, shouting")).style, 0.60);
    }

    #[test]
    fn test_unknown_emotion_uses_default() {
        assert_eq!(VoiceSettings::for_emotion(None), VoiceSettings::default());
        assert_eq!(
            VoiceSettings::for_emotion(Some("pensive")),
            VoiceSettings::default()
        );
    }
}
