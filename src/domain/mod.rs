//! Domain Layer - 领域层
//!
//! 包含三个限界上下文:
//! - Dialogue Context: 对话行与说话人识别结果的提取
//! - Voice Context: 说话人 → 音色映射
//! - Audio Context: 音频片段与音轨组装

pub mod audio;
pub mod dialogue;
pub mod voice;

// 文档文本源的分页与归一化
mod page_text;

pub use page_text::{normalize_page_text, select_pages, split_pages, PAGE_BREAK};
