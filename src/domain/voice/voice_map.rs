//! Voice Context - VoiceMap
//!
//! 说话人标签 → 合成音色 ID 的只读映射

use std::collections::HashMap;

use serde::Serialize;

use super::errors::VoiceMapError;
use crate::domain::dialogue::UNKNOWN_SPEAKER;

/// 音色表
///
/// 不变量:
/// - 必须包含 `UNKNOWN_SPEAKER` 项，作为任何未登记说话人的兜底
/// - 构建后不可修改，可在请求间安全共享
#[derive(Debug, Clone, Serialize)]
pub struct VoiceMap {
    voices: HashMap<String, String>,
}

impl VoiceMap {
    /// 从映射表构建，缺少兜底项时返回错误
    pub fn new(voices: HashMap<String, String>) -> Result<Self, VoiceMapError> {
        match voices.get(UNKNOWN_SPEAKER) {
            Some(id) if !id.trim().is_empty() => {}
            _ => return Err(VoiceMapError::MissingFallback(UNKNOWN_SPEAKER)),
        }

        if let Some((character, _)) = voices.iter().find(|(_, id)| id.trim().is_empty()) {
            return Err(VoiceMapError::EmptyVoiceId(character.clone()));
        }

        Ok(Self { voices })
    }

    /// 解析说话人对应的音色 ID
    ///
    /// 大小写敏感的精确匹配，不做任何归一化；未命中时返回兜底音色
    pub fn resolve(&self, character: &str) -> &str {
        self.voices
            .get(character)
            .or_else(|| self.voices.get(UNKNOWN_SPEAKER))
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// 兜底音色 ID
    pub fn fallback(&self) -> &str {
        self.resolve(UNKNOWN_SPEAKER)
    }

    pub fn contains(&self, character: &str) -> bool {
        self.voices.contains_key(character)
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    /// 已登记的说话人（排序后，便于日志输出）
    pub fn characters(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.voices.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// 默认音色表（小妇人四姐妹 + 旁白 + 兜底）
pub fn default_voices() -> HashMap<String, String> {
    [
        ("Jo", "0ZOhGcBopt9S6GBK8tnj"),
        ("Meg", "FGY2WhTYpPnrIDTdsKH5"),
        ("Amy", "jsCqWAovK2LkecY7zXl4"),
        ("Beth", "oWAxZDx7w5VEj9dCyTzz"),
        ("Narrator", "t0jbNlBVZ17f02VDIeMI"),
        ("Unknown", "21m00Tcm4TlvDq8ikWAM"),
    ]
    .into_iter()
    .map(|(character, id)| (character.to_string(), id.to_string()))
    .collect()
}

impl Default for VoiceMap {
    fn default() -> Self {
        Self {
            voices: default_voices(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_character_resolves_to_mapped_voice() {
        let map = VoiceMap::default();
        assert_eq!(map.resolve("Jo"), "0ZOhGcBopt9S6GBK8tnj");
        assert_eq!(map.resolve("Narrator"), "t0jbNlBVZ17f02VDIeMI");
    }

    #[test]
    fn test_unknown_characters_fall_back() {
        let map = VoiceMap::default();
        let fallback = "21m00Tcm4TlvDq8ikWAM";
        for label in ["Unknown", "Marmee", "Laurie", "", "Mr. March"] {
            assert_eq!(map.resolve(label), fallback, "label {:?}", label);
        }
        assert_eq!(map.fallback(), fallback);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let map = VoiceMap::default();
        assert_eq!(map.resolve("jo"), map.fallback());
        assert_eq!(map.resolve("JO"), map.fallback());
        assert_eq!(map.resolve(" Jo"), map.fallback());
    }

    #[test]
    fn test_every_entry_resolves_to_itself() {
        let voices = default_voices();
        let map = VoiceMap::new(voices.clone()).unwrap();
        for (character, id) in &voices {
            assert_eq!(map.resolve(character), id);
        }
    }

    #[test]
    fn test_missing_fallback_is_rejected() {
        let mut voices = default_voices();
        voices.remove(UNKNOWN_SPEAKER);
        assert!(matches!(
            VoiceMap::new(voices),
            Err(VoiceMapError::MissingFallback(_))
        ));
    }

    #[test]
    fn test_empty_voice_id_is_rejected() {
        let mut voices = default_voices();
        voices.insert("Laurie".to_string(), " ".to_string());
        assert!(matches!(
            VoiceMap::new(voices),
            Err(VoiceMapError::EmptyVoiceId(c)) if c == "Laurie"
        ));
    }

    #[test]
    fn test_characters_sorted() {
        let map = VoiceMap::default();
        assert_eq!(
            map.characters(),
            vec!["Amy", "Beth", "Jo", "Meg", "Narrator", "Unknown"]
        );
        assert_eq!(map.len(), 6);
        assert!(map.contains("Beth"));
        assert!(!map.contains("beth"));
    }
}
