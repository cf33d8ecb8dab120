//! 脚本规范化
//!
//! - 场景标题 / 镜头指示统一为 `---` 分隔线
//! - 每个场景开头恰好一个 `(AMBIENCE: ...)` 底噪提示
//! - 去掉独立的舞台指示与对白中的括号内容，保留说话人情绪标注
//! - 场景开头的旁白画面描述转为底噪线索，不朗读
//!
//! 规范化是幂等的：对输出再次规范化得到相同文本

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::keywords::collapse_whitespace;
use crate::domain::sfx::{self, SfxRole};

use super::segmenter::{classify_line, is_bed_label, LineKind, DEFAULT_SPEAKER};

/// 场景分隔线
pub const SCENE_SEPARATOR: &str = "---";

static VISUAL_OPENER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:we see|we hear|the camera|the scene opens|scene opens|inside\b|a dimly lit|dimly lit|the room is|it is (?:night|dawn|dusk|morning))",
    )
    .expect("visual opener pattern")
});

static INLINE_PARENTHETICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[\(\[][^\)\]]*[\)\]]\s*").expect("inline parenthetical pattern"));

/// 单个场景的累积状态
#[derive(Debug, Default)]
struct Scene {
    /// 场景标题与画面描述，用于选择底噪
    hint: Vec<String>,
    bed: Option<String>,
    lines: Vec<String>,
    /// 已出现对白，之后的 Bed 提示不再视作开场底噪
    opened: bool,
    speaker: Option<String>,
}

impl Scene {
    fn with_heading(heading: Option<String>) -> Self {
        Self {
            hint: heading.into_iter().filter(|h| !h.is_empty()).collect(),
            ..Self::default()
        }
    }

    fn is_empty(&self) -> bool {
        self.bed.is_none() && self.lines.is_empty()
    }

    fn narrator_speaking(&self) -> bool {
        self.speaker.as_deref().map_or(true, |s| s == DEFAULT_SPEAKER)
    }

    fn bed_description(&self) -> String {
        if let Some(bed) = &self.bed {
            return bed.clone();
        }
        let fallback = sfx::derive_ambience_bed("");
        let hint = self.hint.join(" ");
        let from_hint = sfx::derive_ambience_bed(&hint);
        if !hint.is_empty() && from_hint != fallback {
            return from_hint.to_string();
        }
        sfx::derive_ambience_bed(&self.lines.join(" ")).to_string()
    }

    fn render(&self, out: &mut Vec<String>) {
        out.push(format!("(AMBIENCE: {})", self.bed_description()));
        out.extend(self.lines.iter().cloned());
    }
}

/// 规范化脚本文本
pub fn normalize_script(raw: &str) -> String {
    let mut scenes = vec![Scene::default()];

    for line in raw.lines() {
        let kind = classify_line(line);
        let Some(scene) = scenes.last_mut() else {
            break;
        };

        match kind {
            LineKind::Blank | LineKind::Metadata | LineKind::Parenthetical => {}
            LineKind::SceneBreak { heading } => scenes.push(Scene::with_heading(heading)),
            LineKind::CameraDirection => scenes.push(Scene::default()),
            LineKind::SilenceCue(_) => scene.lines.push(clean_line(line)),
            LineKind::SoundCue { label, text } => {
                let is_bed = is_bed_label(&label) || sfx::shape(&text).role == SfxRole::Bed;
                if is_bed && !scene.opened {
                    // 开场只保留第一个底噪提示
                    if scene.bed.is_none() && !text.is_empty() {
                        scene.bed = Some(text);
                    }
                } else if !text.is_empty() {
                    scene.lines.push(clean_line(line));
                }
            }
            LineKind::Header {
                speaker,
                emotion,
                inline,
            } => {
                let inline = inline.map(|t| strip_inline_parentheticals(&t));
                // 统一输出为 "NAME [emotion]: text" 形式
                let mut header = speaker.clone();
                if let Some(emotion) = &emotion {
                    header.push_str(&format!(" [{}]", emotion));
                }
                header.push(':');
                if let Some(text) = inline.as_deref().filter(|t| !t.is_empty()) {
                    header.push(' ');
                    header.push_str(text);
                    scene.opened = true;
                }
                scene.speaker = Some(speaker);
                scene.lines.push(header);
            }
            LineKind::Text(text) => {
                let stripped = strip_inline_parentheticals(&text);
                if !scene.opened
                    && scene.narrator_speaking()
                    && VISUAL_OPENER_RE.is_match(&stripped)
                {
                    scene.hint.push(stripped);
                    continue;
                }
                // 去掉括号后若改变了行的类别则丢弃，保证幂等
                if stripped.is_empty() || !matches!(classify_line(&stripped), LineKind::Text(_)) {
                    continue;
                }
                scene.opened = true;
                scene.lines.push(stripped);
            }
        }
    }

    let mut out = Vec::new();
    for scene in scenes.iter().filter(|s| !s.is_empty()) {
        if !out.is_empty() {
            out.push(SCENE_SEPARATOR.to_string());
        }
        scene.render(&mut out);
    }

    let normalized = out.join("\n");
    tracing::debug!(
        scenes = scenes.iter().filter(|s| !s.is_empty()).count(),
        "Script normalized"
    );
    normalized
}

fn clean_line(line: &str) -> String {
    super::segmenter::strip_markdown(line.trim())
}

fn strip_inline_parentheticals(text: &str) -> String {
    collapse_whitespace(&INLINE_PARENTHETICAL_RE.replace_all(text, " "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::script::{parse, Segment};

    fn bed_lines(normalized: &str) -> Vec<&str> {
        normalized
            .lines()
            .filter(|l| l.starts_with("(AMBIENCE:"))
            .collect()
    }

    #[test]
    fn test_inserts_bed_per_scene() {
        let raw = "INT. HOSPITAL ROOM - NIGHT\nDOCTOR: Stay calm.\nEXT. STREET - DAY\nARJUN: Taxi!";
        let normalized = normalize_script(raw);
        let lines: Vec<&str> = normalized.lines().collect();

        assert!(lines[0].starts_with("(AMBIENCE: hospital"));
        assert_eq!(lines[1], "DOCTOR: Stay calm.");
        assert_eq!(lines[2], SCENE_SEPARATOR);
        assert!(lines[3].starts_with("(AMBIENCE: city street"));
        assert_eq!(bed_lines(&normalized).len(), 2);
    }

    #[test]
    fn test_extra_opening_beds_are_dropped() {
        let raw = "(AMBIENCE: rain on the window)\n(BED: low hum)\nPRIYA: It won't stop.";
        let normalized = normalize_script(raw);
        assert_eq!(bed_lines(&normalized), vec!["(AMBIENCE: rain on the window)"]);
    }

    #[test]
    fn test_parentheticals_are_stripped() {
        let raw = "VIKRAM [cold]\n(leaning forward)\nYou know (pause) what I want.";
        let normalized = normalize_script(raw);
        assert!(normalized.contains("VIKRAM [cold]"));
        assert!(normalized.contains("You know what I want."));
        assert!(!normalized.contains("leaning"));
    }

    #[test]
    fn test_visual_opener_becomes_hint() {
        let raw = "We see a crowded newsroom, phones ringing.\nANCHOR: Breaking news tonight.";
        let normalized = normalize_script(raw);
        assert!(!normalized.contains("We see"));
        assert!(bed_lines(&normalized)[0].contains("newsroom"));
    }

    #[test]
    fn test_empty_prelude_is_skipped() {
        let normalized = normalize_script("\n\n---\nNARRATOR: Begin.");
        assert!(!normalized.starts_with(SCENE_SEPARATOR));
        assert_eq!(normalized.lines().count(), 2);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = "# EPISODE 1: Static\n\
                   INT. ARCHIVE - NIGHT\n\
                   We see dusty shelves.\n\
                   (SOUND: distant thunder)\n\
                   **MEERA [whispering]:** Did you hear that? (looks up)\n\
                   (beat)\n\
                   CUT TO:\n\
                   (AMBIENCE: street traffic)\n\
                   (AMBIENCE: crowd murmur)\n\
                   ARJUN\n\
                   Run.\n\
                   (SOUND: dead silence)";
        let once = normalize_script(raw);
        let twice = normalize_script(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalized_script_parses_with_beds() {
        let segments = parse(&normalize_script("NARRATOR\nHello there.\n(SOUND: door creak)"));
        assert!(matches!(
            segments[0],
            Segment::Sfx {
                role: SfxRole::Bed,
                ..
            }
        ));
        assert!(matches!(segments[1], Segment::Dialogue { .. }));
    }
}
