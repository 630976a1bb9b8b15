//! Dialogue Context - Value Objects

use serde::{Deserialize, Serialize};

/// 旁白标签（非对话的叙述文本）
pub const NARRATOR: &str = "Narrator";

/// 未知说话人标签，VoiceMap 必须包含此项作为兜底
pub const UNKNOWN_SPEAKER: &str = "Unknown";

/// 对话行 - 一个带说话人标签的朗读单元
///
/// 不变量:
/// - character 非空（缺失时为 `UNKNOWN_SPEAKER`）
/// - utterance 去除首尾空白后非空
///
/// 同一页内的顺序即播放顺序
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueLine {
    pub character: String,
    pub utterance: String,
}

impl DialogueLine {
    /// 创建对话行
    ///
    /// 空白说话人归为 `UNKNOWN_SPEAKER`；空白内容返回 `None`
    pub fn new(character: impl Into<String>, utterance: impl Into<String>) -> Option<Self> {
        let utterance = utterance.into().trim().to_string();
        if utterance.is_empty() {
            return None;
        }

        let character = character.into().trim().to_string();
        let character = if character.is_empty() {
            UNKNOWN_SPEAKER.to_string()
        } else {
            character
        };

        Some(Self {
            character,
            utterance,
        })
    }

    /// 旁白行
    pub fn narration(utterance: impl Into<String>) -> Option<Self> {
        Self::new(NARRATOR, utterance)
    }

    pub fn is_narration(&self) -> bool {
        self.character == NARRATOR
    }
}

impl std::fmt::Display for DialogueLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.character, self.utterance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_character_falls_back_to_unknown() {
        let line = DialogueLine::new("  ", "Hello").unwrap();
        assert_eq!(line.character, UNKNOWN_SPEAKER);
        assert_eq!(line.utterance, "Hello");
    }

    #[test]
    fn test_blank_utterance_is_dropped() {
        assert!(DialogueLine::new("Jo", "   \t").is_none());
        assert!(DialogueLine::new("Jo", "").is_none());
    }

    #[test]
    fn test_character_is_case_preserved() {
        let line = DialogueLine::new(" meg ", " Christmas won't be Christmas. ").unwrap();
        assert_eq!(line.character, "meg");
        assert_eq!(line.utterance, "Christmas won't be Christmas.");
    }

    #[test]
    fn test_narration() {
        let line = DialogueLine::narration("The four sisters sat knitting.").unwrap();
        assert!(line.is_narration());
        assert_eq!(line.to_string(), "Narrator: The four sisters sat knitting.");
    }
}
