//! Dialogue Context - 对话限界上下文
//!
//! 职责:
//! - 对话行（说话人 + 台词）
//! - 语言服务响应的结构化提取

mod errors;
mod extraction;
mod value_objects;

pub use errors::ExtractionError;
pub use extraction::{extract_dialogues, find_structured_span};
pub use value_objects::{DialogueLine, NARRATOR, UNKNOWN_SPEAKER};
