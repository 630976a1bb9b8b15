//! 结构化响应提取
//!
//! 语言服务返回自由文本，其中嵌入一个 JSON 对象：
//!
//! ```text
//! Here are the dialogues:
//! { "dialogues": [ { "character": "Jo", "dialogue": "..." } ] }
//! Let me know if you need anything else.
//! ```
//!
//! 提取策略：取第一个 `{` 到最后一个 `}` 之间的片段解析。
//! 已知缺陷：对象前后的说明文字里若出现花括号，截取范围会出错。
//! 能要求服务直接输出 JSON 时（`json_mode`）应优先使用。

use serde::Deserialize;

use super::errors::ExtractionError;
use super::value_objects::{DialogueLine, UNKNOWN_SPEAKER};

#[derive(Debug, Deserialize)]
struct DialogueEnvelope {
    #[serde(default)]
    dialogues: Vec<DialogueRecord>,
}

#[derive(Debug, Deserialize)]
struct DialogueRecord {
    #[serde(default)]
    character: Option<String>,
    #[serde(default)]
    dialogue: Option<String>,
}

/// 定位响应中第一个 `{` 与最后一个 `}` 之间的片段（含两端）
pub fn find_structured_span(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&response[start..=end])
}

/// 从语言服务响应中提取对话列表
///
/// - 缺少 `dialogues` 字段视为空列表
/// - `character` 缺失或为空白 → `Unknown`
/// - `dialogue` 缺失或为空白的记录被丢弃
pub fn extract_dialogues(response: &str) -> Result<Vec<DialogueLine>, ExtractionError> {
    let span = find_structured_span(response).ok_or(ExtractionError::NoStructuredObject)?;

    let envelope: DialogueEnvelope =
        serde_json::from_str(span).map_err(|e| ExtractionError::InvalidJson(e.to_string()))?;

    let lines = envelope
        .dialogues
        .into_iter()
        .filter_map(|record| {
            DialogueLine::new(
                record.character.unwrap_or_else(|| UNKNOWN_SPEAKER.to_string()),
                record.dialogue.unwrap_or_default(),
            )
        })
        .collect();

    Ok(lines)
}
