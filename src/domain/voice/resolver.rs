//! 说话人 → 音色分配
//!
//! 每集一个 `VoiceResolver` 会话对象，不存在进程级共享状态。
//! 优先级：角色覆盖表 → 会话缓存 → 特殊角色类别 → 性别音色池轮换

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{detect_gender, name_tokens, Gender, VoiceCatalog};

/// 分配来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentSource {
    Override,
    Narrator,
    Filtered,
    Elderly,
    Pool,
}

/// 一次音色分配
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceAssignment {
    pub speaker: String,
    pub voice_id: String,
    pub gender: Gender,
    pub source: AssignmentSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecialClass {
    Narrator,
    Filtered,
    Elderly,
}

/// 特殊角色类别，按顺序匹配说话人名字中的词
const SPECIAL_CLASSES: &[(&[&str], SpecialClass)] = &[
    (
        &["NARRATOR", "NARRATION", "STORYTELLER", "VOICEOVER"],
        SpecialClass::Narrator,
    ),
    (
        &[
            "PHONE", "TELEPHONE", "ROBOT", "AI", "COMPUTER", "SYSTEM", "RADIO", "ANNOUNCER",
            "INTERCOM", "VOICEMAIL", "TV", "BROADCAST", "ASSISTANT", "SPEAKERPHONE",
        ],
        SpecialClass::Filtered,
    ),
    (
        &[
            "OLD", "ELDERLY", "AGED", "GRANDFATHER", "GRANDMOTHER", "GRANDPA", "GRANDMA", "DADI",
            "NANI", "DADA",
        ],
        SpecialClass::Elderly,
    ),
];

/// 作为身份一部分保留的性别旁注
const GENDER_NOTES: &[&str] = &["MALE", "FEMALE", "MAN", "WOMAN", "BOY", "GIRL"];

/// 规范化说话人名字：去掉括号内容与尾部标点，大写，折叠空白
pub fn normalize_speaker(name: &str) -> String {
    let mut cleaned = String::with_capacity(name.len());
    let mut depth = 0usize;
    for c in name.chars() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ if depth == 0 => cleaned.push(c),
            _ => {}
        }
    }
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c == ':' || c == '-' || c == ',' || c.is_whitespace())
        .to_uppercase()
}

/// 会话缓存键：规范化名字加上括号内的性别旁注
///
/// `PHONE VOICE (FEMALE)` 与 `PHONE VOICE (MALE)` 是两个角色
fn memo_key(speaker: &str, normalized: &str) -> String {
    let note = speaker
        .split(|c: char| matches!(c, '(' | '[' | '{'))
        .skip(1)
        .filter_map(|part| part.split(|c: char| matches!(c, ')' | ']' | '}')).next())
        .map(|note| note.trim().to_uppercase())
        .find(|note| GENDER_NOTES.contains(&note.as_str()));

    match note {
        Some(note) => format!("{} ({})", normalized, note),
        None => normalized.to_string(),
    }
}

/// 单集音色分配会话
#[derive(Debug, Clone)]
pub struct VoiceResolver {
    catalog: Arc<VoiceCatalog>,
    accent: String,
    overrides: HashMap<String, String>,
    memo: HashMap<String, VoiceAssignment>,
    cursors: HashMap<Gender, usize>,
}

impl VoiceResolver {
    /// 创建会话
    ///
    /// `overrides` 为剧集级别的角色 → 音色覆盖表，键会被规范化
    pub fn new(
        catalog: Arc<VoiceCatalog>,
        accent: impl Into<String>,
        overrides: HashMap<String, String>,
    ) -> Self {
        let overrides = overrides
            .into_iter()
            .map(|(name, voice)| (normalize_speaker(&name), voice))
            .filter(|(name, voice)| !name.is_empty() && !voice.trim().is_empty())
            .collect();

        Self {
            catalog,
            accent: accent.into(),
            overrides,
            memo: HashMap::new(),
            cursors: HashMap::new(),
        }
    }

    /// 为说话人分配音色，同一会话内稳定
    pub fn resolve(&mut self, speaker: &str) -> String {
        self.resolve_assignment(speaker).voice_id
    }

    /// 为说话人分配音色，返回完整分配信息
    pub fn resolve_assignment(&mut self, speaker: &str) -> VoiceAssignment {
        let name = normalize_speaker(speaker);
        let key = memo_key(speaker, &name);
        // 括号内的 (FEMALE) 等标注也参与性别推断
        let gender = detect_gender(speaker);

        if let Some(voice_id) = self.override_for(&name) {
            let assignment = VoiceAssignment {
                speaker: key.clone(),
                voice_id,
                gender,
                source: AssignmentSource::Override,
            };
            self.memo.insert(key, assignment.clone());
            return assignment;
        }

        if let Some(cached) = self.memo.get(&key) {
            return cached.clone();
        }

        let assignment = match special_class(&key) {
            Some(class) => self.special_assignment(&key, gender, class),
            None => None,
        }
        .unwrap_or_else(|| self.pool_assignment(&key, gender));

        tracing::debug!(
            speaker = %assignment.speaker,
            voice_id = %assignment.voice_id,
            gender = ?assignment.gender,
            source = ?assignment.source,
            "Voice assigned"
        );

        self.memo.insert(key, assignment.clone());
        assignment
    }

    /// 清空会话状态，每集开始时调用
    pub fn reset(&mut self) {
        self.memo.clear();
        self.cursors.clear();
    }

    /// 本会话已分配的音色（按说话人排序）
    pub fn assignments(&self) -> Vec<VoiceAssignment> {
        let mut all: Vec<_> = self.memo.values().cloned().collect();
        all.sort_by(|a, b| a.speaker.cmp(&b.speaker));
        all
    }

    fn override_for(&self, key: &str) -> Option<String> {
        if let Some(voice) = self.overrides.get(key) {
            return Some(voice.clone());
        }
        let first = key.split_whitespace().next()?;
        self.overrides.get(first).cloned()
    }

    fn special_assignment(
        &self,
        key: &str,
        gender: Gender,
        class: SpecialClass,
    ) -> Option<VoiceAssignment> {
        let (voice_id, source) = match class {
            SpecialClass::Narrator => (
                Some(self.catalog.narrator.as_str()),
                AssignmentSource::Narrator,
            ),
            SpecialClass::Filtered => (
                self.catalog.filtered.first_for(gender),
                AssignmentSource::Filtered,
            ),
            SpecialClass::Elderly => (
                self.catalog.elderly.first_for(gender),
                AssignmentSource::Elderly,
            ),
        };

        voice_id.map(|voice_id| VoiceAssignment {
            speaker: key.to_string(),
            voice_id: voice_id.to_string(),
            gender,
            source,
        })
    }

    fn pool_assignment(&mut self, key: &str, gender: Gender) -> VoiceAssignment {
        let pool = self
            .catalog
            .pool(&self.accent)
            .map(|p| p.voices.for_gender(gender))
            .unwrap_or_default();

        let voice_id = if pool.is_empty() {
            self.catalog.narrator.clone()
        } else {
            let taken: HashSet<&str> = self.memo.values().map(|a| a.voice_id.as_str()).collect();
            let cursor = self.cursors.get(&gender).copied().unwrap_or(0);

            // 从游标开始优先选择本会话尚未使用的音色
            let chosen = (0..pool.len())
                .map(|offset| (cursor + offset) % pool.len())
                .find(|&idx| !taken.contains(pool[idx]))
                .unwrap_or(cursor % pool.len());

            let voice_id = pool[chosen].to_string();
            self.cursors.insert(gender, chosen + 1);
            voice_id
        };

        VoiceAssignment {
            speaker: key.to_string(),
            voice_id,
            gender,
            source: AssignmentSource::Pool,
        }
    }
}

fn special_class(key: &str) -> Option<SpecialClass> {
    let tokens = name_tokens(key);
    SPECIAL_CLASSES
        .iter()
        .find(|(words, _)| tokens.iter().any(|t| words.contains(&t.as_str())))
        .map(|(_, class)| *class)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> VoiceResolver {
        VoiceResolver::new(Arc::new(VoiceCatalog::default()), "neutral", HashMap::new())
    }

    #[test]
    fn test_narrator_is_stable() {
        let mut r = resolver();
        let first = r.resolve("NARRATOR");
        assert_eq!(first, VoiceCatalog::default().narrator);
        assert_eq!(r.resolve("NARRATOR"), first);
        assert_eq!(r.resolve("narrator:"), first);
    }

    #[test]
    fn test_gendered_pools_are_distinct_and_stable() {
        let catalog = VoiceCatalog::default();
        let pool = catalog.pool("neutral").unwrap().voices.clone();
        let mut r = resolver();

        let arjun = r.resolve("ARJUN");
        let priya = r.resolve("PRIYA");
        assert_ne!(arjun, priya);
        assert!(pool.male.contains(&arjun));
        assert!(pool.female.contains(&priya));

        for _ in 0..3 {
            assert_eq!(r.resolve("ARJUN"), arjun);
            assert_eq!(r.resolve("PRIYA"), priya);
        }
    }

    #[test]
    fn test_round_robin_varies_unassigned_speakers() {
        let mut r = resolver();
        let a = r.resolve("VIKRAM");
        let b = r.resolve("RAHUL");
        let c = r.resolve("KARAN");
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn test_override_exact_and_first_token() {
        let mut overrides = HashMap::new();
        overrides.insert("vikram".to_string(), "custom-vikram".to_string());
        let mut r = VoiceResolver::new(Arc::new(VoiceCatalog::default()), "neutral", overrides);

        assert_eq!(r.resolve("VIKRAM"), "custom-vikram");
        assert_eq!(r.resolve("Vikram Malhotra"), "custom-vikram");
        assert_eq!(
            r.resolve_assignment("VIKRAM [cold]").source,
            AssignmentSource::Override
        );
    }

    #[test]
    fn test_special_classes_follow_gender() {
        let catalog = VoiceCatalog::default();
        let mut r = resolver();
        assert_eq!(r.resolve("PHONE VOICE (FEMALE)"), catalog.filtered.female[0]);
        assert_eq!(r.resolve("ROBOT"), catalog.filtered.male[0]);
        assert_eq!(r.resolve("OLD WOMAN"), catalog.elderly.female[0]);
        assert_eq!(r.resolve("GRANDFATHER"), catalog.elderly.male[0]);
    }

    #[test]
    fn test_gender_note_separates_speakers() {
        let catalog = VoiceCatalog::default();
        let mut r = resolver();
        assert_eq!(r.resolve("PHONE VOICE (FEMALE)"), catalog.filtered.female[0]);
        assert_eq!(r.resolve("PHONE VOICE (MALE)"), catalog.filtered.male[0]);
        assert_eq!(r.resolve("PHONE VOICE (FEMALE)"), catalog.filtered.female[0]);
        assert_eq!(r.assignments().len(), 2);

        // 非性别旁注不影响身份
        let vikram = r.resolve("VIKRAM");
        assert_eq!(r.resolve("VIKRAM [cold]"), vikram);
    }

    #[test]
    fn test_reset_clears_session() {
        let mut r = resolver();
        r.resolve("ARJUN");
        r.resolve("ROHAN");
        assert_eq!(r.assignments().len(), 2);

        r.reset();
        assert!(r.assignments().is_empty());

        let catalog = VoiceCatalog::default();
        let pool = &catalog.pool("neutral").unwrap().voices;
        let after = r.resolve("ROHAN");
        assert!(pool.male.contains(&after));
        // 重置后游标归零
        assert_eq!(after, pool.male[0]);
    }

    #[test]
    fn test_normalize_speaker() {
        assert_eq!(normalize_speaker("  dr.  mehta (V.O.): "), "DR. MEHTA");
        assert_eq!(normalize_speaker("VIKRAM [cold]"), "VIKRAM");
    }
}
