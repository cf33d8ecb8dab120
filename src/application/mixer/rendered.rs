//! 已合成的片段

use crate::domain::script::Segment;
use crate::domain::sfx::SfxRole;

/// 片段及其合成音频
///
/// 静音片段不携带音频，由混音引擎按时长在本地合成
#[derive(Debug, Clone)]
pub struct RenderedSegment {
    /// 片段在原始序列中的序号
    pub index: usize,
    pub segment: Segment,
    pub audio: Vec<u8>,
}

impl RenderedSegment {
    pub fn new(index: usize, segment: Segment, audio: Vec<u8>) -> Self {
        Self {
            index,
            segment,
            audio,
        }
    }

    pub fn silence(index: usize, segment: Segment) -> Self {
        Self::new(index, segment, Vec::new())
    }

    /// 音效层角色，只有音效与动机音才有
    pub fn role(&self) -> Option<SfxRole> {
        match &self.segment {
            Segment::Sfx { role, .. } => Some(*role),
            Segment::Motif { .. } => Some(SfxRole::Spot),
            _ => None,
        }
    }
}
