//! 脚本分段器
//!
//! 逐行分类（有序规则表，第一条命中生效），再由状态机
//! 把同一说话人的连续台词合并为一个对白片段。
//! 解析是全函数：任何输入都产出片段序列，不会失败。

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::keywords::{collapse_whitespace, first_match, KeywordRule};
use crate::domain::sfx::{self, SfxRole};
use crate::domain::voice::is_known_name;

use super::segment::{MotifType, SceneType, Segment, SilenceKind};

/// 场景切换静音时长（秒）
pub const SCENE_TRANSITION_SECS: f64 = 1.0;

/// 显式静音提示的上限（秒）
pub const MAX_PAUSE_SECS: f64 = 5.0;

/// 未出现说话人标记前的默认说话人
pub const DEFAULT_SPEAKER: &str = "NARRATOR";

/// 对白估算语速（词/秒），仅用于展示
const WORDS_PER_SEC: f64 = 2.5;

/// 单行分类结果
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Blank,
    /// 分隔线或场景标题，`heading` 为场景标题文本
    SceneBreak { heading: Option<String> },
    CameraDirection,
    SilenceCue(f64),
    SoundCue { label: String, text: String },
    Header {
        speaker: String,
        emotion: Option<String>,
        inline: Option<String>,
    },
    /// 标题、集数等元信息行，不朗读
    Metadata,
    /// 非音效的括号舞台指示
    Parenthetical,
    Text(String),
}

static SCENE_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:-{3,}|\*{3,}|(?:\*\s*){3,}|={3,}|_{3,}|\[\s*scene\s*break\s*\]|scene\s+\d+(?:\s*[:.\-].*)?)$")
        .expect("scene break pattern")
});

static SLUGLINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:int\./ext\.?|int/ext\.?|i/e\.?|int\.|ext\.)\s*(.*)$").expect("slugline pattern")
});

static CAMERA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:cut to|fade in|fade out|fade to|dissolve to|smash cut|match cut|close on|close up|angle on|pan to|zoom\b|camera\b|intercut|montage|back to)\b",
    )
    .expect("camera direction pattern")
});

static SILENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[\(\[]?\s*(?:silence|pause)\s*[:\-]?\s*(\d+(?:\.\d+)?)\s*(?:s|sec|secs|seconds?)?\s*[\)\]]?\.?$",
    )
    .expect("silence cue pattern")
});

static SOUND_CUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[\(\[]?\s*(sound effects?|sound|sfx|fx|music|ambience|ambient|bed)\s*:\s*(.*?)\s*[\)\]]?$",
    )
    .expect("sound cue pattern")
});

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([A-Za-z][A-Za-z0-9 .'\-]*?)\s*((?:[\(\[][^\)\]]*[\)\]]\s*)*)(?::\s*(.*))?$",
    )
    .expect("speaker header pattern")
});

static NOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\(\[]([^\)\]]*)[\)\]]").expect("header note pattern"));

static PARENTHETICAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\(\[][^\)\]]*[\)\]]$").expect("parenthetical pattern"));

/// 不是说话人的大写行
const NON_SPEAKER_NAMES: &[&str] = &[
    "YES", "NO", "OK", "OKAY", "THE END", "END", "FIN", "TO BE CONTINUED", "HELLO", "HEY", "WHAT",
    "WHY", "HOW", "STOP", "WAIT", "HELP", "NOW", "RUN",
];

/// 元信息行的首词
const METADATA_TOKENS: &[&str] = &[
    "EPISODE", "CHAPTER", "ACT", "TITLE", "NOTE", "SETTING", "LOCATION", "TIME", "PART",
];

/// 不算情绪的旁注
const NON_EMOTION_NOTES: &[&str] = &["V.O.", "VO", "O.S.", "OS", "O.C.", "CONT'D", "CONTD", "CONT."];

/// 保留在名字中的性别旁注，供音色分配使用
const GENDER_NOTES: &[&str] = &["MALE", "FEMALE", "MAN", "WOMAN", "BOY", "GIRL"];

const MAX_SPEAKER_WORDS: usize = 4;
const MAX_SPEAKER_CHARS: usize = 40;

const SILENCE_CUE_RULES: &[KeywordRule<f64>] = &[
    KeywordRule {
        keywords: &[
            "heavy silence",
            "absolute silence",
            "dead silence",
            "complete silence",
            "total silence",
            "long silence",
            "long pause",
        ],
        result: 2.0,
    },
    KeywordRule {
        keywords: &["silence", "silent", "pause", "beat"],
        result: 1.0,
    },
    KeywordRule {
        keywords: &["cut to"],
        result: 0.5,
    },
];

/// 纯静音提示允许出现的词
const SILENCE_ONLY_WORDS: &[&str] = &[
    "silence", "silent", "pause", "pauses", "paused", "beat", "beats", "heavy", "absolute", "dead",
    "complete", "total", "long", "short", "brief", "a", "an", "the", "of", "then", "moment",
    "cut", "to", "black", "and",
];

const MOTIF_RULES: &[KeywordRule<MotifType>] = &[
    KeywordRule {
        keywords: &["symbol", "pattern", "ouroboros", "serpent"],
        result: MotifType::Ouroboros,
    },
    KeywordRule {
        keywords: &["heartbeat", "heart beat", "pulse", "monitor"],
        result: MotifType::Heartbeat,
    },
    KeywordRule {
        keywords: &["glitch", "distort", "static"],
        result: MotifType::Glitch,
    },
];

const SCENE_RULES: &[KeywordRule<SceneType>] = &[
    KeywordRule {
        keywords: &["hospital", "monitor", "icu", "clinic", "ward"],
        result: SceneType::Hospital,
    },
    KeywordRule {
        keywords: &["psychoacoustic", "binaural", "hallucinat"],
        result: SceneType::Psychoacoustic,
    },
    KeywordRule {
        keywords: &["revelation", "realiz", "realis", "discover"],
        result: SceneType::Revelation,
    },
    KeywordRule {
        keywords: &["tense", "suspense", "thriller"],
        result: SceneType::Tense,
    },
];

type LineClassifier = fn(&str) -> Option<LineKind>;

/// 去掉 markdown 标记后依次尝试的分类规则
const LINE_RULES: &[LineClassifier] = &[
    slugline,
    camera_direction,
    silence_cue,
    sound_cue,
    speaker_header,
    parenthetical,
];

/// 解析脚本文本为片段序列
///
/// 结尾总是追加一个零时长的 `EndingLock` 静音，空文本片段被过滤
pub fn parse(raw: &str) -> Vec<Segment> {
    let mut state = SegmenterState::default();

    for line in raw.lines() {
        match classify_line(line) {
            LineKind::Blank | LineKind::Metadata | LineKind::Parenthetical => {}
            LineKind::SceneBreak { heading } => state.scene_break(heading.as_deref()),
            LineKind::CameraDirection => state.transition(),
            LineKind::SilenceCue(secs) => state.pause(secs),
            LineKind::SoundCue { label, text } => state.sound_cue(&label, &text),
            LineKind::Header {
                speaker,
                emotion,
                inline,
            } => state.header(speaker, emotion, inline),
            LineKind::Text(text) => state.text(text),
        }
    }

    let mut segments = state.finish();
    segments.retain(Segment::has_content);

    tracing::debug!(segments = segments.len(), "Script parsed");
    segments
}

/// 单行分类
pub fn classify_line(line: &str) -> LineKind {
    let raw = line.trim();
    if raw.is_empty() {
        return LineKind::Blank;
    }

    // 分隔线由 markdown 符号组成，必须在去标记之前判断
    if SCENE_BREAK_RE.is_match(raw) {
        return LineKind::SceneBreak { heading: None };
    }

    let clean = strip_markdown(raw);
    if clean.is_empty() {
        return LineKind::Blank;
    }
    if SCENE_BREAK_RE.is_match(&clean) {
        return LineKind::SceneBreak { heading: None };
    }

    LINE_RULES
        .iter()
        .find_map(|rule| rule(&clean))
        .unwrap_or(LineKind::Text(clean))
}

/// 去掉 markdown 强调、标题、引用标记
pub fn strip_markdown(line: &str) -> String {
    let trimmed = line.trim_start_matches(|c: char| c == '#' || c == '>' || c.is_whitespace());
    let stripped = trimmed
        .replace("**", "")
        .replace("__", "")
        .replace(['`', '*'], "");
    collapse_whitespace(&stripped)
}

/// 场景关键词
pub fn scene_for(text: &str) -> Option<SceneType> {
    first_match(SCENE_RULES, text)
}

/// 音效提示中的静音关键词对应的停顿时长
pub fn silence_for(text: &str) -> Option<f64> {
    first_match(SILENCE_CUE_RULES, text)
}

/// 动机音关键词
pub fn motif_for(text: &str) -> Option<MotifType> {
    first_match(MOTIF_RULES, text)
}

/// 提示是否只由静音类词语构成
pub fn is_silence_only(text: &str) -> bool {
    let lower = text.to_lowercase();
    let mut words = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .peekable();
    words.peek().is_some() && words.all(|w| SILENCE_ONLY_WORDS.contains(&w))
}

/// 是否为 Bed 类标签（AMBIENCE / BED）
pub fn is_bed_label(label: &str) -> bool {
    matches!(
        label.to_lowercase().as_str(),
        "ambience" | "ambient" | "bed"
    )
}

/// 基于词数的时长估算（秒），仅用于展示
///
/// 实际时长以混音引擎测量为准
pub fn estimate_duration_secs(segments: &[Segment]) -> f64 {
    segments
        .iter()
        .map(|segment| match segment {
            Segment::Dialogue { text, .. } => {
                text.split_whitespace().count() as f64 / WORDS_PER_SEC
            }
            Segment::Silence { duration_secs, .. } => *duration_secs,
            Segment::Sfx {
                prompt,
                role: SfxRole::Spot,
                ..
            } => sfx::estimate_duration(prompt),
            Segment::Sfx { .. } | Segment::Motif { .. } => 0.0,
        })
        .sum()
}

fn slugline(line: &str) -> Option<LineKind> {
    SLUGLINE_RE.captures(line).map(|caps| {
        let heading = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        LineKind::SceneBreak {
            heading: Some(heading.to_string()),
        }
    })
}

fn camera_direction(line: &str) -> Option<LineKind> {
    CAMERA_RE.is_match(line).then_some(LineKind::CameraDirection)
}

fn silence_cue(line: &str) -> Option<LineKind> {
    let caps = SILENCE_RE.captures(line)?;
    let secs: f64 = caps.get(1)?.as_str().parse().ok()?;
    Some(LineKind::SilenceCue(secs.clamp(0.0, MAX_PAUSE_SECS)))
}

fn sound_cue(line: &str) -> Option<LineKind> {
    let caps = SOUND_CUE_RE.captures(line)?;
    Some(LineKind::SoundCue {
        label: caps.get(1)?.as_str().to_uppercase(),
        text: caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default().to_string(),
    })
}

fn speaker_header(line: &str) -> Option<LineKind> {
    let caps = HEADER_RE.captures(line)?;
    let name = caps.get(1)?.as_str().trim();
    let notes = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
    let inline = caps.get(3).map(|m| m.as_str().trim());
    let has_colon = inline.is_some();

    let upper = name.to_uppercase();
    let words: Vec<&str> = name.split_whitespace().collect();
    let letters = name.chars().filter(|c| c.is_alphabetic()).count();

    if letters < 2 || words.len() > MAX_SPEAKER_WORDS || name.chars().count() > MAX_SPEAKER_CHARS
    {
        return None;
    }

    let first = words.first()?.trim_end_matches('.').to_uppercase();
    if METADATA_TOKENS.contains(&first.as_str()) && (has_colon || name == upper) {
        return Some(LineKind::Metadata);
    }
    if NON_SPEAKER_NAMES.contains(&upper.as_str()) {
        return None;
    }

    if has_colon {
        // 冒号形式允许首字母大写的名字，如 "Dr. Mehta:"
        let title_case = words
            .iter()
            .all(|w| w.chars().next().is_some_and(|c| c.is_uppercase() || c.is_numeric()));
        if !title_case || (words.len() > 3 && name != upper) {
            return None;
        }
        // 单个首字母大写词（如 "Listen:"）只有是已知名字时才算说话人
        if words.len() == 1 && name != upper && !is_single_word_speaker(&first) {
            return None;
        }
    } else {
        // 无冒号时整行必须大写，且不以句号结尾
        if name != upper || name.ends_with('.') {
            return None;
        }
    }

    let mut speaker = upper;
    let mut emotion = None;
    for note in NOTE_RE.captures_iter(notes) {
        let content = note.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        let content_upper = content.to_uppercase();
        if content.is_empty() || NON_EMOTION_NOTES.contains(&content_upper.as_str()) {
            continue;
        }
        if GENDER_NOTES.contains(&content_upper.as_str()) {
            speaker = format!("{} ({})", speaker, content_upper);
            continue;
        }
        if emotion.is_none() {
            emotion = Some(content.to_lowercase());
        }
    }

    Some(LineKind::Header {
        speaker,
        emotion,
        inline: inline.filter(|t| !t.is_empty()).map(str::to_string),
    })
}

fn is_single_word_speaker(word: &str) -> bool {
    word == DEFAULT_SPEAKER || is_known_name(word)
}

fn parenthetical(line: &str) -> Option<LineKind> {
    // (beat) / (long pause) 同样丢弃，停顿只来自音效提示
    PARENTHETICAL_RE
        .is_match(line)
        .then_some(LineKind::Parenthetical)
}

/// 分段状态机
struct SegmenterState {
    segments: Vec<Segment>,
    speaker: String,
    emotion: Option<String>,
    buffer: Vec<String>,
    scene: SceneType,
}

impl Default for SegmenterState {
    fn default() -> Self {
        Self {
            segments: Vec::new(),
            speaker: DEFAULT_SPEAKER.to_string(),
            emotion: None,
            buffer: Vec::new(),
            scene: SceneType::Normal,
        }
    }
}

impl SegmenterState {
    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let text = collapse_whitespace(&self.buffer.join(" "));
        self.buffer.clear();
        self.segments.push(Segment::Dialogue {
            speaker: self.speaker.clone(),
            emotion: self.emotion.clone(),
            text,
            scene: self.scene,
        });
    }

    fn scene_break(&mut self, heading: Option<&str>) {
        self.flush();
        self.scene = heading.and_then(scene_for).unwrap_or_default();
        self.push_transition();
    }

    fn transition(&mut self) {
        self.flush();
        self.push_transition();
    }

    /// 连续的场景切换只保留一个静音
    fn push_transition(&mut self) {
        let previous_is_transition = matches!(
            self.segments.last(),
            Some(Segment::Silence {
                silence: SilenceKind::SceneTransition,
                ..
            })
        );
        if previous_is_transition {
            return;
        }
        self.segments.push(Segment::Silence {
            duration_secs: SCENE_TRANSITION_SECS,
            silence: SilenceKind::SceneTransition,
            scene: self.scene,
        });
    }

    fn pause(&mut self, secs: f64) {
        self.flush();
        self.segments.push(Segment::Silence {
            duration_secs: secs.clamp(0.0, MAX_PAUSE_SECS),
            silence: SilenceKind::Pause,
            scene: self.scene,
        });
    }

    fn sound_cue(&mut self, label: &str, text: &str) {
        self.flush();

        if let Some(scene) = scene_for(text) {
            self.scene = scene;
        }

        if let Some(secs) = silence_for(text) {
            self.segments.push(Segment::Silence {
                duration_secs: secs,
                silence: SilenceKind::Pause,
                scene: self.scene,
            });
            if is_silence_only(text) {
                return;
            }
        }

        // AMBIENCE / BED 标签始终是底噪，不识别为动机音
        let bed_label = is_bed_label(label);
        if let Some(motif) = motif_for(text).filter(|_| !bed_label) {
            self.segments.push(Segment::Motif {
                motif,
                cue: text.to_string(),
                scene: self.scene,
            });
            return;
        }

        let shaped = sfx::shape(text);
        let role = if bed_label {
            SfxRole::Bed
        } else {
            shaped.role
        };
        self.segments.push(Segment::Sfx {
            cue: text.to_string(),
            prompt: shaped.prompt,
            role,
            scene: self.scene,
        });
    }

    fn header(&mut self, speaker: String, emotion: Option<String>, inline: Option<String>) {
        self.flush();
        self.speaker = speaker;
        self.emotion = emotion;
        if let Some(text) = inline {
            self.buffer.push(text);
        }
    }

    fn text(&mut self, text: String) {
        self.buffer.push(text);
    }

    fn finish(mut self) -> Vec<Segment> {
        self.flush();
        self.segments.push(Segment::ending_lock(self.scene));
        self.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dialogue(segment: &Segment) -> (&str, Option<&str>, &str) {
        match segment {
            Segment::Dialogue {
                speaker,
                emotion,
                text,
                ..
            } => (speaker.as_str(), emotion.as_deref(), text.as_str()),
            other => panic!("expected dialogue, got {:?}", other),
        }
    }

    #[test]
    fn test_dialogue_and_sound_cue() {
        let segments = parse("NARRATOR\nHello there.\n(SOUND: door creak)\nVIKRAM [cold]\nSit down.");
        assert_eq!(segments.len(), 4);

        assert_eq!(dialogue(&segments[0]), ("NARRATOR", None, "Hello there."));
        match &segments[1] {
            Segment::Sfx { cue, role, .. } => {
                assert_eq!(cue, "door creak");
                assert_eq!(*role, SfxRole::Spot);
            }
            other => panic!("expected sfx, got {:?}", other),
        }
        assert_eq!(dialogue(&segments[2]), ("VIKRAM", Some("cold"), "Sit down."));
        assert!(segments[3].is_ending_lock());
    }

    #[test]
    fn test_explicit_silence_cue() {
        let segments = parse("The room waits.\n(SILENCE: 2.5 seconds)\nThen a voice.");
        let silences: Vec<f64> = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Silence {
                    duration_secs,
                    silence: SilenceKind::Pause,
                    ..
                } => Some(*duration_secs),
                _ => None,
            })
            .collect();
        assert_eq!(silences, vec![2.5]);
    }

    #[test]
    fn test_silence_is_capped() {
        for line in ["SILENCE: 12 seconds", "[PAUSE: 9s]", "(silence - 30)"] {
            let segments = parse(line);
            match &segments[0] {
                Segment::Silence { duration_secs, .. } => {
                    assert!((0.0..=MAX_PAUSE_SECS).contains(duration_secs))
                }
                other => panic!("expected silence for {line:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_same_speaker_lines_are_grouped() {
        let segments = parse("ARJUN: First line.\nSecond line.\n\nThird line.\nPRIYA: Reply.");
        assert_eq!(
            dialogue(&segments[0]),
            ("ARJUN", None, "First line. Second line. Third line.")
        );
        assert_eq!(dialogue(&segments[1]), ("PRIYA", None, "Reply."));
    }

    #[test]
    fn test_scene_break_markers() {
        for marker in ["---", "***", "* * *", "===", "[SCENE BREAK]", "SCENE 3", "INT. KITCHEN - DAY", "CUT TO:"] {
            let segments = parse(&format!("A.\n{}\nB.", marker));
            assert!(
                matches!(
                    segments[1],
                    Segment::Silence {
                        silence: SilenceKind::SceneTransition,
                        duration_secs,
                        ..
                    } if duration_secs == SCENE_TRANSITION_SECS
                ),
                "marker {marker:?} produced {:?}",
                segments[1]
            );
            assert_eq!(segments.len(), 4, "marker {marker:?}");
        }
    }

    #[test]
    fn test_slugline_sets_scene_and_break_resets() {
        let segments = parse("INT. HOSPITAL CORRIDOR - NIGHT\nDOCTOR: Stay back.\n---\nLater.");
        assert_eq!(segments[1].scene(), SceneType::Hospital);
        assert_eq!(segments[3].scene(), SceneType::Normal);
    }

    #[test]
    fn test_silence_families_in_sound_cue() {
        let segments = parse("(SOUND: dead silence, then a door slams)");
        match &segments[0] {
            Segment::Silence { duration_secs, .. } => assert_eq!(*duration_secs, 2.0),
            other => panic!("expected silence, got {other:?}"),
        }
        assert!(matches!(segments[1], Segment::Sfx { .. }));

        // 纯静音提示不产生音效
        let segments = parse("[SFX: a long pause]");
        assert_eq!(segments.len(), 2);
        assert!(matches!(
            segments[0],
            Segment::Silence {
                silence: SilenceKind::Pause,
                ..
            }
        ));
    }

    #[test]
    fn test_motif_and_scene_families() {
        let segments = parse("(SOUND: heart monitor beeping)\nMEERA: Where am I?");
        match &segments[0] {
            Segment::Motif { motif, scene, .. } => {
                assert_eq!(*motif, MotifType::Heartbeat);
                assert_eq!(*scene, SceneType::Hospital);
            }
            other => panic!("expected motif, got {other:?}"),
        }
        assert_eq!(segments[1].scene(), SceneType::Hospital);

        let segments = parse("(SFX: the ouroboros symbol glows)");
        assert!(matches!(
            segments[0],
            Segment::Motif {
                motif: MotifType::Ouroboros,
                ..
            }
        ));
    }

    #[test]
    fn test_ambience_label_forces_bed() {
        let segments = parse("(AMBIENCE: quiet office)");
        assert!(matches!(
            segments[0],
            Segment::Sfx {
                role: SfxRole::Bed,
                ..
            }
        ));

        // 底噪描述中的 monitor 只影响场景，不产生动机音
        let segments = parse("(AMBIENCE: hospital corridor, distant monitor beeps)");
        assert!(matches!(
            segments[0],
            Segment::Sfx {
                role: SfxRole::Bed,
                scene: SceneType::Hospital,
                ..
            }
        ));
    }

    #[test]
    fn test_markdown_and_inline_header() {
        let segments = parse("**VIKRAM [Angry]:** Get out!\n# Dr. Mehta: Please sit.");
        assert_eq!(dialogue(&segments[0]), ("VIKRAM", Some("angry"), "Get out!"));
        assert_eq!(dialogue(&segments[1]), ("DR. MEHTA", None, "Please sit."));
    }

    #[test]
    fn test_header_notes() {
        assert_eq!(
            classify_line("VIKRAM (V.O.)"),
            LineKind::Header {
                speaker: "VIKRAM".to_string(),
                emotion: None,
                inline: None
            }
        );
        assert_eq!(
            classify_line("PHONE VOICE (FEMALE): Your call is important."),
            LineKind::Header {
                speaker: "PHONE VOICE (FEMALE)".to_string(),
                emotion: None,
                inline: Some("Your call is important.".to_string())
            }
        );
    }

    #[test]
    fn test_single_title_case_colon_word() {
        let segments = parse("ARJUN\nListen: I was there.");
        assert_eq!(dialogue(&segments[0]), ("ARJUN", None, "Listen: I was there."));

        let segments = parse("Priya: Where were you?\nNarrator: Silence fell.");
        assert_eq!(dialogue(&segments[0]), ("PRIYA", None, "Where were you?"));
        assert_eq!(dialogue(&segments[1]), ("NARRATOR", None, "Silence fell."));

        let segments = parse("LISTEN: I was there.");
        assert_eq!(dialogue(&segments[0]), ("LISTEN", None, "I was there."));
    }

    #[test]
    fn test_not_headers() {
        assert!(matches!(classify_line("NO"), LineKind::Text(_)));
        assert!(matches!(classify_line("Hello there."), LineKind::Text(_)));
        assert!(matches!(classify_line("The door opens: slowly."), LineKind::Text(_)));
        assert!(matches!(classify_line("STOP."), LineKind::Text(_)));
        assert_eq!(classify_line("EPISODE 3: The Fall"), LineKind::Metadata);
    }

    #[test]
    fn test_parentheticals() {
        assert_eq!(classify_line("(quietly)"), LineKind::Parenthetical);
        assert_eq!(classify_line("(beat)"), LineKind::Parenthetical);
        let segments = parse("ARJUN\n(smiling)\nHi.");
        assert_eq!(dialogue(&segments[0]), ("ARJUN", None, "Hi."));
    }

    #[test]
    fn test_beat_does_not_split_dialogue() {
        let segments = parse("ARJUN\nI know.\n(beat)\nYou lied.\n(long pause)\nGo.");
        assert_eq!(segments.len(), 2);
        assert_eq!(dialogue(&segments[0]), ("ARJUN", None, "I know. You lied. Go."));
        assert!(segments[1].is_ending_lock());
    }

    #[test]
    fn test_empty_input_yields_only_ending_lock() {
        let segments = parse("");
        assert_eq!(segments.len(), 1);
        assert!(segments[0].is_ending_lock());

        let segments = parse("(SOUND: )\n\n");
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn test_estimate_duration() {
        let segments = parse("NARRATOR: one two three four five\n(SILENCE: 2 seconds)");
        assert!((estimate_duration_secs(&segments) - 4.0).abs() < 1e-9);
    }
}
