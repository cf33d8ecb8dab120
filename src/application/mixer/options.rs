//! 混音参数

use serde::{Deserialize, Serialize};

/// 单次混音调用的参数，调用期间不可变
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixOptions {
    pub dialogue_volume: f64,
    pub sfx_volume: f64,
    pub music_volume: f64,
    /// 音乐淡入（秒）
    pub fade_in_secs: f64,
    /// 音乐淡出（秒）
    pub fade_out_secs: f64,
    /// 是否做 EBU R128 响度标准化
    pub normalize: bool,
    /// 是否在结尾追加静音
    pub end_with_silence: bool,
    pub ending_silence_secs: f64,
}

impl Default for MixOptions {
    fn default() -> Self {
        Self {
            dialogue_volume: 1.0,
            sfx_volume: 0.8,
            music_volume: 0.15,
            fade_in_secs: 2.0,
            fade_out_secs: 3.0,
            normalize: true,
            end_with_silence: true,
            ending_silence_secs: 3.0,
        }
    }
}

impl MixOptions {
    pub fn validate(&self) -> Result<(), String> {
        let volumes = [
            ("dialogue_volume", self.dialogue_volume),
            ("sfx_volume", self.sfx_volume),
            ("music_volume", self.music_volume),
        ];
        for (name, value) in volumes {
            if !(0.0..=4.0).contains(&value) {
                return Err(format!("{} must be within 0.0..=4.0, got {}", name, value));
            }
        }

        let durations = [
            ("fade_in_secs", self.fade_in_secs),
            ("fade_out_secs", self.fade_out_secs),
            ("ending_silence_secs", self.ending_silence_secs),
        ];
        for (name, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a non-negative number, got {}", name, value));
            }
        }
        Ok(())
    }
}

/// 响度标准化目标（对白标准）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoudnessTarget {
    /// 综合响度（LUFS）
    pub integrated_lufs: f64,
    /// 真峰值（dBTP）
    pub true_peak_db: f64,
    /// 响度范围（LU）
    pub loudness_range: f64,
}

impl Default for LoudnessTarget {
    fn default() -> Self {
        Self {
            integrated_lufs: -16.0,
            true_peak_db: -1.5,
            loudness_range: 11.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = MixOptions::default();
        assert_eq!(options.music_volume, 0.15);
        assert!(options.end_with_silence);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let options: MixOptions = serde_json::from_str(r#"{"music_volume": 0.3}"#).unwrap();
        assert_eq!(options.music_volume, 0.3);
        assert_eq!(options.ending_silence_secs, 3.0);
    }

    #[test]
    fn test_validate_rejects_negative() {
        let options = MixOptions {
            ending_silence_secs: -1.0,
            ..MixOptions::default()
        };
        assert!(options.validate().is_err());
    }
}
