//! Audio Codec Port - 音频编解码抽象
//!
//! 解码：合成服务返回的压缩音频 → 内存 AudioSegment
//! 编码：组装后的 AudioSegment → 传输格式（Opus/WAV）

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::audio::AudioSegment;

/// 编解码错误
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),
}

/// 音频输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// Opus (OGG 容器) - 有损压缩，默认传输格式
    #[default]
    Opus,
    /// 16 位 PCM WAV
    Wav,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Opus => "ogg",
            AudioFormat::Wav => "wav",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Opus => "audio/ogg",
            AudioFormat::Wav => "audio/wav",
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioFormat::Opus => write!(f, "opus"),
            AudioFormat::Wav => write!(f, "wav"),
        }
    }
}

impl std::str::FromStr for AudioFormat {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "opus" | "ogg" => Ok(AudioFormat::Opus),
            "wav" => Ok(AudioFormat::Wav),
            _ => Err(CodecError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// 编码配置
#[derive(Debug, Clone)]
pub struct EncodeConfig {
    /// 输出格式
    pub format: AudioFormat,
    /// 目标比特率（bps），仅用于 Opus
    pub bitrate: u32,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            format: AudioFormat::Opus,
            bitrate: 32000, // 32kbps，语音足够
        }
    }
}

/// 编码结果
#[derive(Debug, Clone)]
pub struct EncodedAudio {
    /// 编码后的音频数据
    pub audio_data: Vec<u8>,
    /// 输出格式
    pub format: AudioFormat,
    /// 时长（毫秒）
    pub duration_ms: u64,
    /// 采样率（编码前）
    pub sample_rate: u32,
    /// 声道数
    pub channels: u8,
}

impl EncodedAudio {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn len(&self) -> usize {
        self.audio_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.audio_data.is_empty()
    }
}

/// Audio Codec Port
pub trait AudioCodecPort: Send + Sync {
    /// 解码压缩音频
    ///
    /// `format_hint` 仅用于加速探测，实际格式以数据内容为准
    fn decode(&self, data: &[u8], format_hint: Option<&str>) -> Result<AudioSegment, CodecError>;

    /// 编码为传输格式
    fn encode(
        &self,
        segment: &AudioSegment,
        config: &EncodeConfig,
    ) -> Result<EncodedAudio, CodecError>;

    /// 检查是否支持指定格式
    fn supports_format(&self, format: AudioFormat) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("opus".parse::<AudioFormat>().unwrap(), AudioFormat::Opus);
        assert_eq!("OGG".parse::<AudioFormat>().unwrap(), AudioFormat::Opus);
        assert_eq!("wav".parse::<AudioFormat>().unwrap(), AudioFormat::Wav);
        assert!("mp3".parse::<AudioFormat>().is_err());
    }

    #[test]
    fn test_format_metadata() {
        assert_eq!(AudioFormat::Opus.mime_type(), "audio/ogg");
        assert_eq!(AudioFormat::Wav.extension(), "wav");
        assert_eq!(AudioFormat::default(), AudioFormat::Opus);
    }
}
