//! 音效提示整形器
//!
//! 所有规则均为有序表，第一条命中的规则生效

use crate::domain::keywords::{collapse_whitespace, contains_any, first_match, KeywordRule};

use super::SfxRole;

/// 规范提示词最大字符数
pub const MAX_PROMPT_CHARS: usize = 220;

/// 音效服务允许的最大合成时长（秒）
pub const MAX_SYNTHESIS_SECS: f64 = 22.0;

/// Bed 统一使用的合成时长（秒），混音时循环铺满
pub const BED_SYNTHESIS_SECS: f64 = 10.0;

/// 整形结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapedPrompt {
    pub prompt: String,
    pub role: SfxRole,
}

/// 提示词改写规则
///
/// `requires` 中每一组至少命中一个关键词，全部组命中时规则生效
struct PromptRule {
    requires: &'static [&'static [&'static str]],
    prompt: &'static str,
}

const PROMPT_RULES: &[PromptRule] = &[
    PromptRule {
        requires: &[&["car", "vehicle", "truck"], &["crash", "impact", "collision", "hit", "smash"]],
        prompt: "car crash impact, crunching metal and shattering glass, close and violent",
    },
    PromptRule {
        requires: &[&["phone", "mobile", "cellphone"], &["ring", "vibrat", "buzz"]],
        prompt: "mobile phone ringing on a table, electronic ringtone, close",
    },
    PromptRule {
        requires: &[&["dial", "disconnect", "hang up", "hangs up", "line goes dead"]],
        prompt: "phone line disconnect tone after a click, short beeps, close",
    },
    PromptRule {
        requires: &[&["notification", "message alert", "text alert", "ping"]],
        prompt: "smartphone notification chime, short and clean",
    },
    PromptRule {
        requires: &[&["punch", "slap", "strike", "blow", "assault", "beating"]],
        prompt: "violent body impact, heavy punch hit, close and dry",
    },
    PromptRule {
        requires: &[&["body", "falls", "fall", "collapse", "thud"], &["ground", "floor", "thud", "collapse"]],
        prompt: "body falling onto hard ground, heavy thud, close",
    },
    PromptRule {
        requires: &[&["muffled", "distant", "through the window"], &["traffic", "cars", "horns"]],
        prompt: "muffled city traffic heard through a closed window, low rumble",
    },
    PromptRule {
        requires: &[&["news", "tv", "television", "broadcast"], &["murmur", "montage", "anchor", "chatter", "voices"]],
        prompt: "overlapping tv news broadcast murmur, indistinct anchors, low and distant",
    },
    PromptRule {
        requires: &[&["newsroom"]],
        prompt: "busy newsroom ambience, keyboards typing, distant phones, low murmur",
    },
    PromptRule {
        requires: &[&["hospital", "icu", "ward"]],
        prompt: "hospital ward ambience, soft monitor beeps, distant footsteps, ventilation hum",
    },
    PromptRule {
        requires: &[&["street", "traffic", "road"]],
        prompt: "city street ambience, traffic passing, distant horns",
    },
    PromptRule {
        requires: &[&["rain", "downpour", "storm"]],
        prompt: "steady rain ambience, soft rooftop patter",
    },
    PromptRule {
        requires: &[&["door"]],
        prompt: "wooden door opening and closing, interior, close",
    },
    PromptRule {
        requires: &[&["footstep"]],
        prompt: "footsteps on hard floor, steady pace, interior",
    },
    PromptRule {
        requires: &[&["impact", "crash", "bang", "smash"]],
        prompt: "sharp single impact hit, close",
    },
];

/// Bed 关键词族
const AMBIENCE_KEYWORDS: &[&str] = &[
    "ambient",
    "ambience",
    "room tone",
    "murmur",
    "hum",
    "wind",
    "rain",
    "crowd",
    "newsroom",
    "street",
    "traffic",
];

/// 新闻/广播类内容需要更强的低通，避免与对白争夺频段
const NEWS_KEYWORDS: &[&str] = &["news", "broadcast", "tv", "television", "radio", "anchor"];

const DURATION_RULES: &[KeywordRule<f64>] = &[
    KeywordRule {
        keywords: &["impact", "collision", "crash"],
        result: 4.0,
    },
    KeywordRule {
        keywords: &["body", "ground", "thud"],
        result: 3.0,
    },
    KeywordRule {
        keywords: &["vibrat", "ring"],
        result: 3.0,
    },
    KeywordRule {
        keywords: &["dial", "disconnect"],
        result: 2.0,
    },
    KeywordRule {
        keywords: &["knock", "slam", "click", "bang"],
        result: 2.0,
    },
    KeywordRule {
        keywords: &["footstep", "engine"],
        result: 4.0,
    },
    KeywordRule {
        keywords: AMBIENCE_KEYWORDS,
        result: 8.0,
    },
];

const DEFAULT_DURATION_SECS: f64 = 4.0;

const AMBIENCE_BED_RULES: &[KeywordRule<&str>] = &[
    KeywordRule {
        keywords: &["hospital", "icu", "ward", "clinic", "surgery"],
        result: "hospital corridor ambience bed, distant monitor beeps, soft ventilation hum",
    },
    KeywordRule {
        keywords: &["newsroom", "news", "office", "studio"],
        result: "newsroom ambience bed, keyboards typing, distant phones, low murmur",
    },
    KeywordRule {
        keywords: &["rain", "storm", "monsoon"],
        result: "steady rain ambience bed, soft rooftop patter",
    },
    KeywordRule {
        keywords: &["street", "traffic", "road", "market", "city"],
        result: "city street ambience bed, light traffic, distant horns",
    },
    KeywordRule {
        keywords: &["archive", "library", "records", "basement"],
        result: "quiet archive room ambience bed, paper rustle, low ventilation hum",
    },
];

const DEFAULT_AMBIENCE_BED: &str = "room tone ambience bed, subtle";

/// 整形音效提示
pub fn shape(raw: &str) -> ShapedPrompt {
    let collapsed = collapse_whitespace(raw);
    let lower = collapsed.to_lowercase();

    let prompt = PROMPT_RULES
        .iter()
        .find(|rule| rule.requires.iter().all(|group| contains_any(&lower, group)))
        .map(|rule| rule.prompt.to_string())
        .unwrap_or_else(|| truncate_chars(&collapsed, MAX_PROMPT_CHARS));

    let role = classify_role(&lower);

    ShapedPrompt { prompt, role }
}

/// 判定 Bed / Spot
pub fn classify_role(text: &str) -> SfxRole {
    if contains_any(&text.to_lowercase(), AMBIENCE_KEYWORDS) {
        SfxRole::Bed
    } else {
        SfxRole::Spot
    }
}

/// 是否为新闻/广播类内容
pub fn is_news_like(text: &str) -> bool {
    contains_any(&text.to_lowercase(), NEWS_KEYWORDS)
}

/// 估算音效时长（秒）
pub fn estimate_duration(prompt: &str) -> f64 {
    first_match(DURATION_RULES, prompt).unwrap_or(DEFAULT_DURATION_SECS)
}

/// 实际请求音效服务的时长：Bed 固定 10 秒，且不超过服务上限
pub fn synthesis_duration(shaped: &ShapedPrompt) -> f64 {
    let secs = match shaped.role {
        SfxRole::Bed => BED_SYNTHESIS_SECS,
        SfxRole::Spot => estimate_duration(&shaped.prompt),
    };
    secs.min(MAX_SYNTHESIS_SECS)
}

/// 根据场景线索选择底噪描述
pub fn derive_ambience_bed(hint: &str) -> &'static str {
    first_match(AMBIENCE_BED_RULES, hint).unwrap_or(DEFAULT_AMBIENCE_BED)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].trim_end().to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_car_impact_rewrite() {
        let shaped = shape("A car SLAMS into the barrier - huge impact");
        assert!(shaped.prompt.starts_with("car crash impact"));
        assert_eq!(shaped.role, SfxRole::Spot);
    }

    #[test]
    fn test_ambience_is_bed() {
        let shaped = shape("newsroom, phones ringing in the background");
        // 电话规则排在 newsroom 之前
        assert!(shaped.prompt.starts_with("mobile phone ringing"));
        assert_eq!(shaped.role, SfxRole::Bed);

        let shaped = shape("rain against the window");
        assert_eq!(shaped.prompt, "steady rain ambience, soft rooftop patter");
        assert_eq!(shaped.role, SfxRole::Bed);
    }

    #[test]
    fn test_door_creak_is_spot() {
        let shaped = shape("door creak");
        assert_eq!(shaped.prompt, "wooden door opening and closing, interior, close");
        assert_eq!(shaped.role, SfxRole::Spot);
    }

    #[test]
    fn test_unmatched_passthrough_collapsed() {
        let shaped = shape("  a   glass   of water  poured ");
        assert_eq!(shaped.prompt, "a glass of water poured");
        assert_eq!(shaped.role, SfxRole::Spot);
    }

    #[test]
    fn test_prompt_never_exceeds_limit() {
        let long = "écho ".repeat(200);
        let shaped = shape(&long);
        assert!(shaped.prompt.chars().count() <= MAX_PROMPT_CHARS);

        for raw in ["", "x", "phone ring", &"ab ".repeat(500)] {
            assert!(shape(raw).prompt.chars().count() <= MAX_PROMPT_CHARS);
        }
    }

    #[test]
    fn test_role_is_deterministic() {
        let a = shape("crowd murmur in a courtroom");
        let b = shape("crowd murmur in a courtroom");
        assert_eq!(a, b);
    }

    #[test]
    fn test_estimate_duration_tiers() {
        assert_eq!(estimate_duration("sharp single impact hit"), 4.0);
        assert_eq!(estimate_duration("body falling onto hard ground"), 3.0);
        assert_eq!(estimate_duration("phone vibrating"), 3.0);
        assert_eq!(estimate_duration("dial tone"), 2.0);
        assert_eq!(estimate_duration("door slam"), 2.0);
        assert_eq!(estimate_duration("footsteps approaching"), 4.0);
        assert_eq!(estimate_duration("wind howling"), 8.0);
        assert_eq!(estimate_duration("glass clink"), 4.0);
    }

    #[test]
    fn test_bed_synthesis_override() {
        let bed = shape("street traffic");
        assert_eq!(synthesis_duration(&bed), BED_SYNTHESIS_SECS);
        let spot = shape("knock on the door");
        assert!(synthesis_duration(&spot) <= MAX_SYNTHESIS_SECS);
    }

    #[test]
    fn test_derive_ambience_bed() {
        assert!(derive_ambience_bed("INT. HOSPITAL - NIGHT").starts_with("hospital"));
        assert!(derive_ambience_bed("the newsroom at dawn").starts_with("newsroom"));
        assert!(derive_ambience_bed("Monsoon rain").starts_with("steady rain"));
        assert!(derive_ambience_bed("EXT. STREET").starts_with("city street"));
        assert!(derive_ambience_bed("the old archive").starts_with("quiet archive"));
        assert_eq!(derive_ambience_bed("a kitchen"), "room tone ambience bed, subtle");
    }

    #[test]
    fn test_role_follows_cue_text_not_prompt() {
        // 改写后的提示词含 murmur / ambience，但原始提示没有底噪关键词
        let shaped = shape("news montage");
        assert!(shaped.prompt.contains("murmur"));
        assert_eq!(shaped.role, SfxRole::Spot);

        let shaped = shape("hospital");
        assert!(shaped.prompt.contains("ambience"));
        assert_eq!(shaped.role, SfxRole::Spot);
    }

    #[test]
    fn test_news_like() {
        assert!(is_news_like("overlapping tv news broadcast murmur"));
        assert!(!is_news_like("door creak"));
    }
}
