//! ElevenLabs TTS Client - 调用 ElevenLabs 文本转语音服务
//!
//! 实现 SynthesisServicePort trait
//!
//! 外部 API:
//! POST {base_url}/v1/text-to-speech/{voice_id}?output_format=mp3_44100_128
//! Header: xi-api-key
//! Request: {"text": "...", "model_id": "eleven_multilingual_v2"}  (JSON)
//! Response: 压缩音频二进制

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{
    container_of, SynthesisError, SynthesisRequest, SynthesisResponse, SynthesisServicePort,
};
use crate::infrastructure::adapters::retry::{retry_with_backoff, RetryPolicy};

const XI_API_KEY_HEADER: &str = "xi-api-key";

/// TTS 请求体 (JSON)
#[derive(Debug, Serialize)]
struct TextToSpeechBody<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// ElevenLabs 客户端配置
#[derive(Debug, Clone)]
pub struct ElevenLabsClientConfig {
    /// 服务基础 URL
    pub base_url: String,
    /// API Key
    pub api_key: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// 重试次数
    pub max_retries: u32,
}

impl Default for ElevenLabsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.elevenlabs.io".to_string(),
            api_key: String::new(),
            timeout_secs: 120,
            max_retries: 0,
        }
    }
}

impl ElevenLabsClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// ElevenLabs 客户端
pub struct ElevenLabsClient {
    client: Client,
    config: ElevenLabsClientConfig,
}

impl ElevenLabsClient {
    /// 创建新的客户端
    pub fn new(config: ElevenLabsClientConfig) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SynthesisError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 获取合成 URL
    fn synthesis_url(&self, voice_id: &str) -> String {
        format!(
            "{}/v1/text-to-speech/{}",
            self.config.base_url.trim_end_matches('/'),
            voice_id
        )
    }

    /// 单次调用
    async fn synthesize_once(
        &self,
        request: &SynthesisRequest,
    ) -> Result<SynthesisResponse, SynthesisError> {
        let url = self.synthesis_url(&request.voice_id);
        let body = TextToSpeechBody {
            text: &request.text,
            model_id: &request.model_id,
        };

        tracing::debug!(
            url = %url,
            voice_id = %request.voice_id,
            text_len = request.text.len(),
            "Sending TTS request"
        );

        let response = self
            .client
            .post(&url)
            .header(XI_API_KEY_HEADER, &self.config.api_key)
            .query(&[("output_format", request.output_format.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SynthesisError::Timeout
                } else if e.is_connect() {
                    SynthesisError::NetworkError(format!("Cannot connect to TTS service: {}", e))
                } else {
                    SynthesisError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SynthesisError::ServiceError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let audio_data = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::InvalidResponse(format!("Failed to read audio: {}", e)))?
            .to_vec();

        tracing::debug!(
            voice_id = %request.voice_id,
            audio_size = audio_data.len(),
            "TTS synthesis completed"
        );

        Ok(SynthesisResponse {
            audio_data,
            format_hint: Some(container_of(&request.output_format).to_string()),
        })
    }
}

#[async_trait]
impl SynthesisServicePort for ElevenLabsClient {
    async fn synthesize(
        &self,
        request: SynthesisRequest,
    ) -> Result<SynthesisResponse, SynthesisError> {
        retry_with_backoff(
            RetryPolicy::new(self.config.max_retries),
            "text_to_speech",
            SynthesisError::is_retryable,
            || self.synthesize_once(&request),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ElevenLabsClientConfig::default();
        assert_eq!(config.base_url, "https://api.elevenlabs.io");
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.max_retries, 0);
    }

    #[test]
    fn test_config_builder() {
        let config = ElevenLabsClientConfig::new("xi-secret").with_timeout(30);
        assert_eq!(config.api_key, "xi-secret");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_synthesis_url() {
        let config = ElevenLabsClientConfig {
            base_url: "http://localhost:9000/".to_string(),
            ..Default::default()
        };
        let client = ElevenLabsClient::new(config).unwrap();
        assert_eq!(
            client.synthesis_url("21m00Tcm4TlvDq8ikWAM"),
            "http://localhost:9000/v1/text-to-speech/21m00Tcm4TlvDq8ikWAM"
        );
    }

    #[test]
    fn test_body_shape() {
        let body = serde_json::to_value(TextToSpeechBody {
            text: "Hello",
            model_id: "eleven_multilingual_v2",
        })
        .unwrap();
        assert_eq!(body["text"], "Hello");
        assert_eq!(body["model_id"], "eleven_multilingual_v2");
    }
}
