//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::application::ports::AudioFormat;
use crate::domain::voice::{default_voices, VoiceMap, VoiceMapError};

/// 应用主配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// 对话归属（语言模型）服务配置
    #[serde(default)]
    pub llm: LlmConfig,

    /// TTS 服务配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// 音色表
    #[serde(default = "default_voice_entries")]
    pub voices: Vec<VoiceEntry>,

    /// 音频配置
    #[serde(default)]
    pub audio: AudioConfig,

    /// 流水线配置
    #[serde(default)]
    pub pipeline: PipelineSettings,

    /// 输入文档配置
    #[serde(default)]
    pub input: InputConfig,

    /// 输出配置
    #[serde(default)]
    pub output: OutputConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            tts: TtsConfig::default(),
            voices: default_voice_entries(),
            audio: AudioConfig::default(),
            pipeline: PipelineSettings::default(),
            input: InputConfig::default(),
            output: OutputConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// 由音色表配置构建 VoiceMap
    pub fn voice_map(&self) -> Result<VoiceMap, VoiceMapError> {
        let table: HashMap<String, String> = self
            .voices
            .iter()
            .map(|entry| (entry.character.clone(), entry.voice_id.clone()))
            .collect();
        VoiceMap::new(table)
    }
}

/// 对话归属服务配置（OpenAI 兼容的对话补全接口）
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// 服务基础 URL
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// API Key
    #[serde(default)]
    pub api_key: Option<String>,

    /// 模型名称
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// 采样温度
    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,

    /// 要求服务直接返回 JSON 对象
    #[serde(default)]
    pub json_mode: bool,

    /// 请求超时时间（秒）
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    /// 最大重试次数
    #[serde(default)]
    pub max_retries: u32,
}

fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_llm_model() -> String {
    "llama3-70b-8192".to_string()
}

fn default_llm_temperature() -> f32 {
    0.1
}

fn default_llm_timeout() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key: None,
            model: default_llm_model(),
            temperature: default_llm_temperature(),
            json_mode: false,
            timeout_secs: default_llm_timeout(),
            max_retries: 0,
        }
    }
}

/// TTS 服务提供方
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    /// ElevenLabs 文本转语音
    #[default]
    ElevenLabs,
    /// 离线正弦音（演示与测试）
    Fake,
}

impl std::fmt::Display for TtsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TtsProvider::ElevenLabs => write!(f, "elevenlabs"),
            TtsProvider::Fake => write!(f, "fake"),
        }
    }
}

/// TTS 服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    /// 服务提供方
    #[serde(default)]
    pub provider: TtsProvider,

    /// 服务基础 URL
    #[serde(default = "default_tts_base_url")]
    pub base_url: String,

    /// API Key
    #[serde(default)]
    pub api_key: Option<String>,

    /// 合成模型
    #[serde(default = "default_tts_model_id")]
    pub model_id: String,

    /// 服务端输出格式（容器_采样率_比特率）
    #[serde(default = "default_tts_output_format")]
    pub output_format: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,

    /// 最大重试次数
    #[serde(default)]
    pub max_retries: u32,
}

fn default_tts_base_url() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_tts_model_id() -> String {
    "eleven_multilingual_v2".to_string()
}

fn default_tts_output_format() -> String {
    "mp3_44100_128".to_string()
}

fn default_tts_timeout() -> u64 {
    120
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            provider: TtsProvider::default(),
            base_url: default_tts_base_url(),
            api_key: None,
            model_id: default_tts_model_id(),
            output_format: default_tts_output_format(),
            timeout_secs: default_tts_timeout(),
            max_retries: 0,
        }
    }
}

/// 音色表项
///
/// 以列表形式配置，说话人标签大小写敏感
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VoiceEntry {
    pub character: String,
    pub voice_id: String,
}

fn default_voice_entries() -> Vec<VoiceEntry> {
    let mut entries: Vec<VoiceEntry> = default_voices()
        .into_iter()
        .map(|(character, voice_id)| VoiceEntry {
            character,
            voice_id,
        })
        .collect();
    entries.sort_by(|a, b| a.character.cmp(&b.character));
    entries
}

/// 音频配置
#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// 输出格式
    /// 可选: opus, wav
    #[serde(default)]
    pub output_format: AudioFormat,

    /// 目标比特率（bps），用于 Opus
    /// 语音推荐: 16000-64000
    #[serde(default = "default_bitrate")]
    pub bitrate: u32,
}

fn default_bitrate() -> u32 {
    32000 // 32kbps，语音足够
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            output_format: AudioFormat::default(),
            bitrate: default_bitrate(),
        }
    }
}

/// 流水线配置
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSettings {
    /// 同时进行的合成请求数，1 表示严格串行
    #[serde(default = "default_max_concurrent_synthesis")]
    pub max_concurrent_synthesis: usize,
}

fn default_max_concurrent_synthesis() -> usize {
    1
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_concurrent_synthesis: default_max_concurrent_synthesis(),
        }
    }
}

/// 输入文档配置
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// 纯文本文档路径（页之间以换页符分隔）
    #[serde(default = "default_input_path")]
    pub path: PathBuf,

    /// 只处理指定页（从 1 开始），为空时处理全部
    #[serde(default)]
    pub page: Option<usize>,
}

fn default_input_path() -> PathBuf {
    PathBuf::from("data/book.txt")
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
            page: None,
        }
    }
}

/// 输出配置
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// 音频输出目录
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/audio")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别 (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否输出 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.llm.model, "llama3-70b-8192");
        assert_eq!(config.tts.provider, TtsProvider::ElevenLabs);
        assert_eq!(config.tts.output_format, "mp3_44100_128");
        assert_eq!(config.audio.output_format, AudioFormat::Opus);
        assert_eq!(config.pipeline.max_concurrent_synthesis, 1);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_default_voice_entries_build_voice_map() {
        let voices = AppConfig::default().voice_map().unwrap();
        assert_eq!(voices.len(), 6);
        assert_eq!(voices.resolve("Jo"), "0ZOhGcBopt9S6GBK8tnj");
        assert_eq!(voices.resolve("Laurie"), "21m00Tcm4TlvDq8ikWAM");
    }

    #[test]
    fn test_voice_map_requires_fallback() {
        let config = AppConfig {
            voices: vec![VoiceEntry {
                character: "Jo".to_string(),
                voice_id: "voice-jo".to_string(),
            }],
            ..Default::default()
        };
        assert!(config.voice_map().is_err());
    }

    #[test]
    fn test_provider_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            provider: TtsProvider,
        }
        let w: Wrapper = serde_json::from_str(r#"{"provider": "fake"}"#).unwrap();
        assert_eq!(w.provider, TtsProvider::Fake);
        assert_eq!(w.provider.to_string(), "fake");
    }
}
