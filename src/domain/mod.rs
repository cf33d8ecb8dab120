//! Domain Layer - 领域层
//!
//! 包含四个限界上下文:
//! - Script Context: 脚本规范化与分段
//! - Voice Context: 说话人音色分配
//! - SFX Context: 音效提示整形
//! - Audio: PCM WAV 工具

pub mod audio;
pub mod script;
pub mod sfx;
pub mod voice;

// 共享的关键词规则表
pub mod keywords;
