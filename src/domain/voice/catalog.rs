//! 音色目录
//!
//! 默认音色为 ElevenLabs 预置音色 ID，可通过配置整体替换

use serde::{Deserialize, Serialize};

use super::Gender;

/// 按性别划分的音色列表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderedVoices {
    pub male: Vec<String>,
    pub female: Vec<String>,
}

impl GenderedVoices {
    fn from_ids(male: &[&str], female: &[&str]) -> Self {
        Self {
            male: male.iter().map(|s| s.to_string()).collect(),
            female: female.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// 未知性别时男女交错，保证轮换时两种音色都会出现
    pub fn for_gender(&self, gender: Gender) -> Vec<&str> {
        match gender {
            Gender::Male => self.male.iter().map(String::as_str).collect(),
            Gender::Female => self.female.iter().map(String::as_str).collect(),
            Gender::Unknown => {
                let mut voices = Vec::with_capacity(self.male.len() + self.female.len());
                let longest = self.male.len().max(self.female.len());
                for i in 0..longest {
                    if let Some(v) = self.male.get(i) {
                        voices.push(v.as_str());
                    }
                    if let Some(v) = self.female.get(i) {
                        voices.push(v.as_str());
                    }
                }
                voices
            }
        }
    }

    /// 特殊角色只取一个音色：女性取女声，其余取男声
    pub fn first_for(&self, gender: Gender) -> Option<&str> {
        let preferred = match gender {
            Gender::Female => self.female.first().or(self.male.first()),
            _ => self.male.first().or(self.female.first()),
        };
        preferred.map(String::as_str)
    }
}

/// 口音音色池
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccentPool {
    pub accent: String,
    #[serde(flatten)]
    pub voices: GenderedVoices,
}

/// 音色目录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceCatalog {
    /// 旁白音色
    pub narrator: String,
    /// 电话 / 机器人 / AI 等经过滤波处理的声音
    pub filtered: GenderedVoices,
    /// 老年角色
    pub elderly: GenderedVoices,
    /// 普通角色的口音音色池，第一个为默认
    pub pools: Vec<AccentPool>,
}

impl Default for VoiceCatalog {
    fn default() -> Self {
        Self {
            // George
            narrator: "JBFqnCBsd6RMkjVDRZzb".to_string(),
            // Roger / Laura
            filtered: GenderedVoices::from_ids(&["CYw3kZ02Hs0563khs1Fj"], &["FGY2WhTYpPnrIDTdsKH5"]),
            // Bill / Jessica
            elderly: GenderedVoices::from_ids(&["pqHfZKP75CvOlQylNhV4"], &["cgSgspJ2msm6clMCkdW9"]),
            pools: vec![
                AccentPool {
                    accent: "neutral".to_string(),
                    voices: GenderedVoices::from_ids(
                        // Brian, Eric, Chris, Will, Liam
                        &[
                            "nPczCjzI2devNBz1zQrb",
                            "cjVigY5qzO86Huf0OWal",
                            "iP95p4xoKVk53GoZ742B",
                            "bIHbv24MWmeRgasZH58o",
                            "TX3LPaxmHKxFdv7VOQHJ",
                        ],
                        // Sarah, Matilda, Rachel, Lily
                        &[
                            "EXAVITQu4vr4xnSDxMaL",
                            "XrExE9yKIg1WjnnlVkGX",
                            "21m00Tcm4TlvDq8ikWAM",
                            "pFZP5JQG7iQjIQuC4Bku",
                        ],
                    ),
                },
                AccentPool {
                    accent: "british".to_string(),
                    voices: GenderedVoices::from_ids(
                        // Daniel, Callum, Harry
                        &[
                            "onwK4e9ZLuTAKqWW03F9",
                            "N2lVS1w4EtoT3dr4eOWO",
                            "SOYHLrjzK2X1ezoPC6cr",
                        ],
                        // Alice, Lily
                        &["Xb7hH8MSUJpSbSDYk0k2", "pFZP5JQG7iQjIQuC4Bku"],
                    ),
                },
            ],
        }
    }
}

impl VoiceCatalog {
    /// 查找口音音色池，未配置的口音回落到第一个
    pub fn pool(&self, accent: &str) -> Option<&AccentPool> {
        self.pools
            .iter()
            .find(|p| p.accent.eq_ignore_ascii_case(accent))
            .or_else(|| self.pools.first())
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.narrator.trim().is_empty() {
            return Err("旁白音色不能为空");
        }
        if self.pools.is_empty() {
            return Err("至少需要一个口音音色池");
        }
        if self
            .pools
            .iter()
            .any(|p| p.voices.male.is_empty() && p.voices.female.is_empty())
        {
            return Err("口音音色池不能为空");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_is_valid() {
        assert!(VoiceCatalog::default().validate().is_ok());
    }

    #[test]
    fn test_pool_fallback() {
        let catalog = VoiceCatalog::default();
        assert_eq!(catalog.pool("BRITISH").unwrap().accent, "british");
        assert_eq!(catalog.pool("martian").unwrap().accent, "neutral");
    }

    #[test]
    fn test_unknown_gender_interleaves() {
        let voices = GenderedVoices::from_ids(&["m1", "m2"], &["f1"]);
        assert_eq!(voices.for_gender(Gender::Unknown), vec!["m1", "f1", "m2"]);
        assert_eq!(voices.first_for(Gender::Female), Some("f1"));
        assert_eq!(voices.first_for(Gender::Unknown), Some("m1"));
    }
}
