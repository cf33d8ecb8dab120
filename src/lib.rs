//! Soundstage - 广播剧单集制作核心
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Script Context: 脚本规范化与分段
//! - Voice Context: 说话人音色分配
//! - SFX Context: 音效提示整形
//! - Audio: PCM WAV 工具
//!
//! 应用层 (application/):
//! - Ports: 端口定义（TtsEngine, SfxEngine, AudioEngine, AudioProbe, BlobStore）
//! - Mixer: 多轨混音引擎
//! - Commands: 单集制作处理器
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: HTTP 合成客户端、ffmpeg 引擎、symphonia 测量、文件存储，以及演练用的假实现

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
