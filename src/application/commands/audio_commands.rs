//! Audio Commands - 整页音频生成命令

use crate::application::ports::EncodedAudio;
use crate::domain::dialogue::DialogueLine;

/// 生成整页音频命令
#[derive(Debug, Clone)]
pub struct GenerateAudioCommand {
    /// 页码（从 1 开始，仅用于日志）
    pub page_number: Option<usize>,
    /// 已归一化的页面文本
    pub page_text: String,
}

/// 生成整页音频响应
#[derive(Debug, Clone)]
pub struct GenerateAudioResponse {
    pub audio: EncodedAudio,
    pub dialogues: Vec<DialogueLine>,
    pub clip_durations_ms: Vec<u64>,
    pub content_type: String,
}
