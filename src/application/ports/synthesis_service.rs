//! Synthesis Service Port - 语音合成服务抽象
//!
//! 定义 TTS 合成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

/// 合成错误
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error (HTTP {status}): {message}")]
    ServiceError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Malformed audio: {0}")]
    MalformedAudio(String),
}

impl SynthesisError {
    /// 是否为可重试的瞬时错误（网络、超时、限流、服务端 5xx）
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NetworkError(_) | Self::Timeout => true,
            Self::ServiceError { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidResponse(_) | Self::MalformedAudio(_) => false,
        }
    }
}

/// 合成请求
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// 要合成的文本
    pub text: String,
    /// 音色 ID（由 VoiceMap 解析得到）
    pub voice_id: String,
    /// 合成模型，如 eleven_multilingual_v2
    pub model_id: String,
    /// 输出格式，如 mp3_44100_128
    pub output_format: String,
}

/// 合成响应
#[derive(Debug, Clone)]
pub struct SynthesisResponse {
    /// 压缩音频数据
    pub audio_data: Vec<u8>,
    /// 容器格式提示（如 "mp3"、"wav"），供解码器探测使用
    pub format_hint: Option<String>,
}

/// Synthesis Service Port
///
/// 外部语音合成服务的抽象接口
#[async_trait]
pub trait SynthesisServicePort: Send + Sync {
    /// 合成一段文本，返回压缩音频
    async fn synthesize(&self, request: SynthesisRequest)
        -> Result<SynthesisResponse, SynthesisError>;
}

/// 从 ElevenLabs 风格的输出格式中取出容器名，如 `mp3_44100_128` → `mp3`
pub fn container_of(output_format: &str) -> &str {
    output_format.split('_').next().unwrap_or(output_format)
}
