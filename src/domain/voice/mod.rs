//! Voice Context - 音色分配
//!
//! 职责:
//! - 说话人性别推断
//! - 音色目录（旁白、滤波声、老年声、口音音色池）
//! - 单集音色分配会话
//! - 情绪 → 合成参数

mod catalog;
mod gender;
mod resolver;
mod settings;

pub use catalog::{AccentPool, GenderedVoices, VoiceCatalog};
pub use gender::{detect_gender, is_known_name, name_tokens, Gender};
pub use resolver::{normalize_speaker, AssignmentSource, VoiceAssignment, VoiceResolver};
pub use settings::VoiceSettings;
