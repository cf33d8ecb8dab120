//! filter_complex 滤镜图构建
//!
//! 纯函数，只拼接字符串，便于测试。
//! 所有滤镜图以 `[out]` 结尾，并统一重采样为混音格式。

use crate::application::ports::OUTPUT_LABEL;
use crate::domain::audio::PcmFormat;
use crate::domain::script::{MotifType, SceneType};
use crate::domain::sfx::SfxRole;

use super::options::{LoudnessTarget, MixOptions};
use super::timeline::Timeline;

/// 音乐尾音（秒）
pub const MUSIC_TAIL_SECS: f64 = 1.0;

/// 音效层对对白的压缩比
pub const SFX_DUCK_RATIO: u32 = 4;

/// 音乐对对白的压缩比
pub const MUSIC_DUCK_RATIO: u32 = 20;

const SPOT_FADE_IN_SECS: f64 = 0.02;
const SPOT_GAIN: f64 = 1.25;
const BED_GAIN: f64 = 0.6;
const MAX_BED_EDGE_FADE_SECS: f64 = 1.0;

/// aloop 的最大缓冲样本数，配合 atrim 实现无限循环
const LOOP_SIZE: u32 = i32::MAX as u32;

/// 统一输出格式并打上输出标签
fn finish(chain: &str, format: PcmFormat) -> String {
    format!(
        "{chain},aresample={rate},aformat=sample_fmts=s16:channel_layouts={layout}[{OUTPUT_LABEL}]",
        rate = format.sample_rate,
        layout = format.channel_layout(),
    )
}

fn fade_pair(total_secs: f64, fade_in: f64, fade_out: f64) -> Vec<String> {
    let mut filters = Vec::new();
    // 淡入淡出各不超过总长的一半
    let half = (total_secs / 2.0).max(0.0);
    let fade_in = fade_in.min(half);
    let fade_out = fade_out.min(half);
    if fade_in > 0.001 {
        filters.push(format!("afade=t=in:st=0:d={:.3}", fade_in));
    }
    if fade_out > 0.001 {
        filters.push(format!(
            "afade=t=out:st={:.3}:d={:.3}",
            total_secs - fade_out,
            fade_out
        ));
    }
    filters
}

/// 对白处理：高通、临场感提升、轻压缩、音量，以及场景染色
pub fn dialogue(scene: SceneType, volume: f64, format: PcmFormat) -> String {
    let mut filters = vec![
        "highpass=f=80".to_string(),
        "equalizer=f=3000:t=q:w=1.2:g=3".to_string(),
        "acompressor=threshold=-18dB:ratio=3:attack=5:release=80".to_string(),
        format!("volume={:.3}", volume),
    ];

    match scene {
        SceneType::Hospital | SceneType::Psychoacoustic => {
            filters.push("aphaser=in_gain=0.6:out_gain=0.8:delay=3:decay=0.4:speed=0.3".to_string());
            filters.push("vibrato=f=0.5:d=0.1".to_string());
        }
        SceneType::Revelation => filters.push("aecho=0.8:0.7:60:0.3".to_string()),
        SceneType::Normal | SceneType::Tense => {}
    }

    finish(&format!("[0:a]{}", filters.join(",")), format)
}

/// 音效处理：Bed 与新闻类内容用更强的低通
pub fn sfx(role: SfxRole, news_like: bool, volume: f64, format: PcmFormat) -> String {
    let cutoff = if role == SfxRole::Bed || news_like {
        3500
    } else {
        8000
    };
    finish(
        &format!("[0:a]lowpass=f={},volume={:.3}", cutoff, volume),
        format,
    )
}

/// 动机音的标志性处理链
pub fn motif(motif: MotifType, volume: f64, format: PcmFormat) -> String {
    let chain = match motif {
        MotifType::Ouroboros => "areverse,aecho=0.8:0.88:400:0.5,areverse,lowpass=f=2500",
        MotifType::Heartbeat => {
            "lowpass=f=120,bass=g=8:f=60,acompressor=threshold=-24dB:ratio=8:attack=2:release=50"
        }
        MotifType::Glitch => "acrusher=bits=6:mix=0.6,tremolo=f=12:d=0.7",
    };
    finish(&format!("[0:a]{},volume={:.3}", chain, volume), format)
}

/// 音效总线
///
/// 输入 `[i:a]` 对应 `timeline.events[i]`。以主干长度的静音为底，
/// 点音效延迟到偏移处，Bed 循环铺满各自区间。不做归一化求和，
/// 最后裁剪到主干的精确时长。没有可放置事件时返回 `None`。
pub fn sfx_bus(timeline: &Timeline, format: PcmFormat) -> Option<String> {
    let backbone = timeline.backbone_secs;
    let mut chains = vec![format!(
        "anullsrc=r={}:cl={},atrim=0:{:.3}[base]",
        format.sample_rate,
        format.channel_layout(),
        backbone
    )];
    let mut labels = vec!["[base]".to_string()];

    for position in timeline.spot_positions() {
        let event = &timeline.events[position];
        let delay_ms = (event.offset_secs * 1000.0).round() as u64;
        chains.push(format!(
            "[{position}:a]afade=t=in:st=0:d={:.3},volume={:.3},adelay=delays={delay_ms}:all=1[s{position}]",
            SPOT_FADE_IN_SECS, SPOT_GAIN
        ));
        labels.push(format!("[s{position}]"));
    }

    for bed in timeline.bed_intervals() {
        let length = bed.length_secs();
        let edge = (length / 4.0).min(MAX_BED_EDGE_FADE_SECS);
        let delay_ms = (bed.start_secs * 1000.0).round() as u64;
        let mut filters = vec![
            format!("aloop=loop=-1:size={}", LOOP_SIZE),
            format!("atrim=0:{:.3}", length),
            "asetpts=N/SR/TB".to_string(),
        ];
        filters.extend(fade_pair(length, edge, edge));
        filters.push(format!("volume={:.3}", BED_GAIN));
        filters.push(format!("adelay=delays={}:all=1", delay_ms));
        chains.push(format!("[{}:a]{}[b{}]", bed.event, filters.join(","), bed.event));
        labels.push(format!("[b{}]", bed.event));
    }

    if labels.len() == 1 {
        return None;
    }

    let mix = format!(
        "{}amix=inputs={}:normalize=0:duration=first,atrim=0:{:.3}",
        labels.join(""),
        labels.len(),
        backbone
    );
    chains.push(finish(&mix, format));
    Some(chains.join(";"))
}

/// 音乐层：循环、裁剪到主干加尾音、淡入淡出、音量
pub fn music_bed(backbone_secs: f64, options: &MixOptions, format: PcmFormat) -> String {
    let total = backbone_secs + MUSIC_TAIL_SECS;
    let mut filters = vec![
        format!("aloop=loop=-1:size={}", LOOP_SIZE),
        format!("atrim=0:{:.3}", total),
        "asetpts=N/SR/TB".to_string(),
    ];
    filters.extend(fade_pair(total, options.fade_in_secs, options.fade_out_secs));
    filters.push(format!("volume={:.3}", options.music_volume));
    finish(&format!("[0:a]{}", filters.join(",")), format)
}

/// 最终混音
///
/// 输入顺序：对白主干、音效总线（可选）、音乐层（可选）。
/// 对白只作为侧链信号，本身不被压缩。
pub fn mixdown(has_sfx: bool, has_music: bool, format: PcmFormat) -> String {
    let buses = usize::from(has_sfx) + usize::from(has_music);
    if buses == 0 {
        return finish("[0:a]alimiter=limit=0.95", format);
    }

    let mut keys = Vec::new();
    let mut chains = Vec::new();
    let mut mix_inputs = vec!["[dlg]".to_string()];
    let mut next_input = 1;

    if has_sfx {
        keys.push("[key_sfx]");
        chains.push(format!(
            "[{}:a][key_sfx]sidechaincompress=threshold=0.05:ratio={}:attack=20:release=300[sfx_ducked]",
            next_input, SFX_DUCK_RATIO
        ));
        mix_inputs.push("[sfx_ducked]".to_string());
        next_input += 1;
    }
    if has_music {
        keys.push("[key_music]");
        chains.push(format!(
            "[{}:a][key_music]sidechaincompress=threshold=0.03:ratio={}:attack=20:release=500[music_ducked]",
            next_input, MUSIC_DUCK_RATIO
        ));
        mix_inputs.push("[music_ducked]".to_string());
    }

    let split = format!("[0:a]asplit={}[dlg]{}", buses + 1, keys.join(""));
    let mix = format!(
        "{}amix=inputs={}:normalize=0:duration=longest,alimiter=limit=0.95",
        mix_inputs.join(""),
        mix_inputs.len()
    );

    let mut graph = vec![split];
    graph.extend(chains);
    graph.push(finish(&mix, format));
    graph.join(";")
}

/// EBU R128 响度标准化
pub fn loudness(target: &LoudnessTarget, format: PcmFormat) -> String {
    finish(
        &format!(
            "[0:a]loudnorm=I={}:TP={}:LRA={}",
            target.integrated_lufs, target.true_peak_db, target.loudness_range
        ),
        format,
    )
}

/// 编码阶段不做处理，采样格式交给编码器协商
pub fn encode() -> String {
    format!("[0:a]anull[{}]", OUTPUT_LABEL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::mixer::timeline::{build, TimelineItem};

    fn fmt() -> PcmFormat {
        PcmFormat::new(44100, 1)
    }

    #[test]
    fn test_dialogue_scene_coloring() {
        let normal = dialogue(SceneType::Normal, 1.0, fmt());
        assert!(normal.starts_with("[0:a]highpass=f=80"));
        assert!(normal.ends_with("aformat=sample_fmts=s16:channel_layouts=mono[out]"));
        assert!(!normal.contains("aphaser"));

        let hospital = dialogue(SceneType::Hospital, 1.0, fmt());
        assert!(hospital.contains("aphaser") && hospital.contains("vibrato"));

        let revelation = dialogue(SceneType::Revelation, 0.9, fmt());
        assert!(revelation.contains("aecho"));
        assert!(revelation.contains("volume=0.900"));
    }

    #[test]
    fn test_sfx_lowpass() {
        assert!(sfx(SfxRole::Bed, false, 0.8, fmt()).contains("lowpass=f=3500"));
        assert!(sfx(SfxRole::Spot, true, 0.8, fmt()).contains("lowpass=f=3500"));
        assert!(sfx(SfxRole::Spot, false, 0.8, fmt()).contains("lowpass=f=8000"));
    }

    #[test]
    fn test_motif_chains() {
        assert!(motif(MotifType::Ouroboros, 1.0, fmt()).contains("areverse,aecho"));
        assert!(motif(MotifType::Heartbeat, 1.0, fmt()).contains("ratio=8"));
        assert!(motif(MotifType::Glitch, 1.0, fmt()).contains("acrusher"));
    }

    #[test]
    fn test_sfx_bus_layout() {
        let timeline = build([
            TimelineItem::Event {
                index: 0,
                role: SfxRole::Bed,
                duration_secs: 10.0,
            },
            TimelineItem::Advance(2.0),
            TimelineItem::Event {
                index: 2,
                role: SfxRole::Spot,
                duration_secs: 1.0,
            },
            TimelineItem::Advance(4.0),
        ]);
        let graph = sfx_bus(&timeline, fmt()).unwrap();

        assert!(graph.starts_with("anullsrc=r=44100:cl=mono,atrim=0:6.000[base]"));
        assert!(graph.contains("[1:a]afade=t=in"));
        assert!(graph.contains("adelay=delays=1850:all=1[s1]"));
        assert!(graph.contains("[0:a]aloop=loop=-1"));
        assert!(graph.contains("atrim=0:6.000"));
        assert!(graph.contains("[base][s1][b0]amix=inputs=3:normalize=0:duration=first"));
        assert!(graph.ends_with("[out]"));
    }

    #[test]
    fn test_sfx_bus_without_events() {
        let timeline = build([TimelineItem::Advance(3.0)]);
        assert!(sfx_bus(&timeline, fmt()).is_none());
    }

    #[test]
    fn test_music_bed_tail_and_fades() {
        let graph = music_bed(9.0, &MixOptions::default(), fmt());
        assert!(graph.contains("atrim=0:10.000"));
        assert!(graph.contains("afade=t=in:st=0:d=2.000"));
        assert!(graph.contains("afade=t=out:st=7.000:d=3.000"));
        assert!(graph.contains("volume=0.150"));
    }

    #[test]
    fn test_mixdown_ducking() {
        let full = mixdown(true, true, fmt());
        assert!(full.starts_with("[0:a]asplit=3[dlg][key_sfx][key_music]"));
        assert!(full.contains("[1:a][key_sfx]sidechaincompress=threshold=0.05:ratio=4"));
        assert!(full.contains("[2:a][key_music]sidechaincompress=threshold=0.03:ratio=20"));
        assert!(full.contains("[dlg][sfx_ducked][music_ducked]amix=inputs=3:normalize=0"));

        let music_only = mixdown(false, true, fmt());
        assert!(music_only.contains("[1:a][key_music]"));

        let dry = mixdown(false, false, fmt());
        assert!(dry.starts_with("[0:a]alimiter"));
    }

    #[test]
    fn test_loudness_target() {
        let graph = loudness(&LoudnessTarget::default(), fmt());
        assert!(graph.contains("loudnorm=I=-16:TP=-1.5:LRA=11"));
    }
}
