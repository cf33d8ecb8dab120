//! 时间线计算
//!
//! 对白与静音以实测时长推进时钟；音效与动机音只记录当前时钟作为偏移。

use serde::{Deserialize, Serialize};

use crate::domain::sfx::SfxRole;

/// 点音效提前触发的时间（秒）
pub const SPOT_PREROLL_SECS: f64 = 0.15;

/// 时间线输入项
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimelineItem {
    /// 推进时钟的片段（对白、静音）
    Advance(f64),
    /// 音效层事件
    Event {
        index: usize,
        role: SfxRole,
        duration_secs: f64,
    },
}

/// 已定位的音效层事件
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// 片段序号
    pub index: usize,
    pub role: SfxRole,
    pub offset_secs: f64,
    /// 渲染后的音频时长
    pub duration_secs: f64,
}

/// Bed 的铺设区间
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BedInterval {
    /// 在 `Timeline::events` 中的位置
    pub event: usize,
    pub start_secs: f64,
    pub end_secs: f64,
}

impl BedInterval {
    pub fn length_secs(&self) -> f64 {
        self.end_secs - self.start_secs
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    /// 对白主干总时长
    pub backbone_secs: f64,
    pub events: Vec<TimelineEvent>,
}

/// 按顺序累计时钟
pub fn build(items: impl IntoIterator<Item = TimelineItem>) -> Timeline {
    let mut clock = 0.0;
    let mut events = Vec::new();

    for item in items {
        match item {
            TimelineItem::Advance(secs) => clock += secs.max(0.0),
            TimelineItem::Event {
                index,
                role,
                duration_secs,
            } => {
                let offset_secs = match role {
                    SfxRole::Spot => (clock - SPOT_PREROLL_SECS).max(0.0),
                    SfxRole::Bed => clock,
                };
                events.push(TimelineEvent {
                    index,
                    role,
                    offset_secs,
                    duration_secs,
                });
            }
        }
    }

    Timeline {
        backbone_secs: clock,
        events,
    }
}

impl Timeline {
    /// 每个 Bed 一直铺到下一个 Bed 开始或节目结束，互不重叠。
    /// 长度为零的区间被丢弃
    pub fn bed_intervals(&self) -> Vec<BedInterval> {
        let beds: Vec<(usize, &TimelineEvent)> = self
            .events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.role == SfxRole::Bed)
            .collect();

        beds.iter()
            .enumerate()
            .filter_map(|(i, (position, event))| {
                let start_secs = event.offset_secs.min(self.backbone_secs);
                let end_secs = beds
                    .get(i + 1)
                    .map(|(_, next)| next.offset_secs)
                    .unwrap_or(self.backbone_secs)
                    .min(self.backbone_secs);
                (end_secs > start_secs).then_some(BedInterval {
                    event: *position,
                    start_secs,
                    end_secs,
                })
            })
            .collect()
    }

    /// 点音效（含动机音）在 `events` 中的位置
    pub fn spot_positions(&self) -> Vec<usize> {
        self.events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.role == SfxRole::Spot && e.offset_secs < self.backbone_secs)
            .map(|(position, _)| position)
            .collect()
    }
}
