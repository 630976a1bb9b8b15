//! Speech Synthesizer - 单行语音合成
//!
//! 解析音色 → 调用合成服务 → 解码 → 末尾附加 1000ms 停顿。
//! 任何失败都直接返回错误：缺失的片段会让后续行错位

use std::sync::Arc;

use crate::application::ports::{
    AudioCodecPort, SynthesisError, SynthesisRequest, SynthesisServicePort,
};
use crate::domain::audio::AudioSegment;
use crate::domain::dialogue::DialogueLine;
use crate::domain::voice::VoiceMap;

/// 合成模型与输出格式
#[derive(Debug, Clone)]
pub struct SynthesisSettings {
    pub model_id: String,
    pub output_format: String,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            model_id: "eleven_multilingual_v2".to_string(),
            output_format: "mp3_44100_128".to_string(),
        }
    }
}

/// 语音合成器
pub struct SpeechSynthesizer {
    service: Arc<dyn SynthesisServicePort>,
    codec: Arc<dyn AudioCodecPort>,
    voices: Arc<VoiceMap>,
    settings: SynthesisSettings,
}

impl SpeechSynthesizer {
    pub fn new(
        service: Arc<dyn SynthesisServicePort>,
        codec: Arc<dyn AudioCodecPort>,
        voices: Arc<VoiceMap>,
        settings: SynthesisSettings,
    ) -> Self {
        Self {
            service,
            codec,
            voices,
            settings,
        }
    }

    /// 构建合成请求
    pub fn request_for(&self, line: &DialogueLine) -> SynthesisRequest {
        SynthesisRequest {
            text: line.utterance.clone(),
            voice_id: self.voices.resolve(&line.character).to_string(),
            model_id: self.settings.model_id.clone(),
            output_format: self.settings.output_format.clone(),
        }
    }

    /// 合成一行，返回 `语音 + 停顿`
    pub async fn synthesize(&self, line: &DialogueLine) -> Result<AudioSegment, SynthesisError> {
        let request = self.request_for(line);
        let voice_id = request.voice_id.clone();

        let response = self.service.synthesize(request).await?;
        if response.audio_data.is_empty() {
            return Err(SynthesisError::MalformedAudio(
                "empty audio payload".to_string(),
            ));
        }

        let speech = self
            .codec
            .decode(&response.audio_data, response.format_hint.as_deref())
            .map_err(|e| SynthesisError::MalformedAudio(e.to_string()))?;

        if speech.is_empty() {
            return Err(SynthesisError::MalformedAudio(
                "decoded audio has no frames".to_string(),
            ));
        }

        tracing::debug!(
            character = %line.character,
            voice_id = %voice_id,
            speech_ms = speech.duration_ms(),
            audio_size = response.audio_data.len(),
            "Line synthesized"
        );

        let pause = AudioSegment::pause(speech.spec());
        Ok(&speech + &pause)
    }
}
