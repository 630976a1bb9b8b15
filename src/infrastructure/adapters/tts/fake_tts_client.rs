//! Fake TTS Client - 离线合成客户端
//!
//! 不调用外部服务，按台词长度生成一段正弦音（WAV），
//! 不同音色使用不同音高，便于试听分辨

use async_trait::async_trait;
use std::f32::consts::TAU;

use crate::application::ports::{
    SynthesisError, SynthesisRequest, SynthesisResponse, SynthesisServicePort,
};
use crate::domain::audio::{AudioSegment, AudioSpec};
use crate::infrastructure::adapters::codec::encode_wav;

/// Fake TTS Client 配置
#[derive(Debug, Clone)]
pub struct FakeTtsClientConfig {
    /// 采样率
    pub sample_rate: u32,
    /// 每个字符对应的时长（毫秒）
    pub ms_per_char: u64,
    /// 最短时长（毫秒）
    pub min_duration_ms: u64,
    /// 模拟的合成延迟（毫秒）
    pub latency_ms: u64,
}

impl Default for FakeTtsClientConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            ms_per_char: 60,
            min_duration_ms: 300,
            latency_ms: 0,
        }
    }
}

/// Fake TTS Client
pub struct FakeTtsClient {
    config: FakeTtsClientConfig,
}

impl FakeTtsClient {
    pub fn new(config: FakeTtsClientConfig) -> Self {
        tracing::info!(
            sample_rate = config.sample_rate,
            ms_per_char = config.ms_per_char,
            "FakeTtsClient initialized"
        );
        Self { config }
    }

    /// 使用默认配置创建
    pub fn with_defaults() -> Self {
        Self::new(FakeTtsClientConfig::default())
    }

    /// 台词对应的时长
    pub fn duration_for(&self, text: &str) -> u64 {
        (text.chars().count() as u64 * self.config.ms_per_char).max(self.config.min_duration_ms)
    }

    /// 音色对应的音高（110Hz - 440Hz）
    fn pitch_for(voice_id: &str) -> f32 {
        let hash = voice_id
            .bytes()
            .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
        110.0 + (hash % 331) as f32
    }

    fn render(&self, text: &str, voice_id: &str) -> AudioSegment {
        let spec = AudioSpec::new(self.config.sample_rate, 1);
        let frames = spec.frames_for_ms(self.duration_for(text));
        let pitch = Self::pitch_for(voice_id);
        let rate = self.config.sample_rate as f32;

        let samples = (0..frames)
            .map(|i| 0.3 * (TAU * pitch * i as f32 / rate).sin())
            .collect();

        AudioSegment::from_samples(samples, spec)
    }
}

#[async_trait]
impl SynthesisServicePort for FakeTtsClient {
    async fn synthesize(
        &self,
        request: SynthesisRequest,
    ) -> Result<SynthesisResponse, SynthesisError> {
        tracing::debug!(
            text_len = request.text.len(),
            voice_id = %request.voice_id,
            "FakeTtsClient: rendering tone"
        );

        if self.config.latency_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(self.config.latency_ms)).await;
        }

        let segment = self.render(&request.text, &request.voice_id);

        Ok(SynthesisResponse {
            audio_data: encode_wav(&segment),
            format_hint: Some("wav".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::AudioCodecPort;
    use crate::infrastructure::adapters::codec::SymphoniaCodec;

    fn request(text: &str, voice_id: &str) -> SynthesisRequest {
        SynthesisRequest {
            text: text.to_string(),
            voice_id: voice_id.to_string(),
            model_id: "fake".to_string(),
            output_format: "wav".to_string(),
        }
    }

    #[test]
    fn test_duration_grows_with_text() {
        let client = FakeTtsClient::with_defaults();
        assert_eq!(client.duration_for("Hi"), 300);
        assert_eq!(client.duration_for(&"a".repeat(10)), 600);
    }

    #[test]
    fn test_pitch_is_stable_per_voice() {
        let a = FakeTtsClient::pitch_for("0ZOhGcBopt9S6GBK8tnj");
        assert_eq!(a, FakeTtsClient::pitch_for("0ZOhGcBopt9S6GBK8tnj"));
        assert!((110.0..=440.0).contains(&a));
    }

    #[tokio::test]
    async fn test_output_decodes_to_expected_duration() {
        let client = FakeTtsClient::with_defaults();
        let text = "It's so dreadful to be poor!";
        let response = client.synthesize(request(text, "voice")).await.unwrap();

        let decoded = SymphoniaCodec::new()
            .decode(&response.audio_data, response.format_hint.as_deref())
            .unwrap();
        assert_eq!(decoded.duration_ms(), client.duration_for(text));
        assert_eq!(decoded.spec(), AudioSpec::new(22050, 1));
    }
}
