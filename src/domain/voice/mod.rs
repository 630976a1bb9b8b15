//! Voice Context - 音色限界上下文
//!
//! 职责:
//! - 说话人 → 音色 ID 映射（VoiceMap）
//! - 未知说话人兜底

mod errors;
mod voice_map;

pub use errors::VoiceMapError;
pub use voice_map::{default_voices, VoiceMap};
