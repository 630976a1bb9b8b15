//! Audio Context - 音频限界上下文
//!
//! 职责:
//! - 内存音频片段（静音生成、拼接、格式转换）
//! - 音轨组装

mod assembly;
mod segment;

pub use assembly::{assemble, assemble_with_durations, AudioAssembly};
pub use segment::{AudioSegment, AudioSpec, PAUSE_MS};
