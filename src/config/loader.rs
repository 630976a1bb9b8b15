//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `PAGECAST_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `PAGECAST_LLM__API_KEY=gsk_...`
/// - `PAGECAST_TTS__PROVIDER=fake`
/// - `PAGECAST_INPUT__PATH=data/little_women.txt`
/// - `PAGECAST_PIPELINE__MAX_CONCURRENT_SYNTHESIS=4`
///
/// # 返回
/// - `Ok(AppConfig)` - 成功加载的配置
/// - `Err(ConfigError)` - 加载失败
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("llm.base_url", "https://api.groq.com/openai/v1")?
        .set_default("llm.model", "llama3-70b-8192")?
        .set_default("llm.temperature", 0.1)?
        .set_default("llm.json_mode", false)?
        .set_default("llm.timeout_secs", 60)?
        .set_default("llm.max_retries", 0)?
        .set_default("tts.provider", "elevenlabs")?
        .set_default("tts.base_url", "https://api.elevenlabs.io")?
        .set_default("tts.model_id", "eleven_multilingual_v2")?
        .set_default("tts.output_format", "mp3_44100_128")?
        .set_default("tts.timeout_secs", 120)?
        .set_default("tts.max_retries", 0)?
        .set_default("audio.output_format", "opus")?
        .set_default("audio.bitrate", 32000)?
        .set_default("pipeline.max_concurrent_synthesis", 1)?
        .set_default("input.path", "data/book.txt")?
        .set_default("output.dir", "data/audio")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        // 搜索默认配置文件
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 前缀: PAGECAST_
    // 层级分隔符: __ (双下划线)
    // 例如: PAGECAST_TTS__API_KEY=sk_...
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix("PAGECAST")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 构建配置
    let config = builder.build()?;

    // 5. 反序列化为 AppConfig
    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    // 6. 验证配置
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    // 音色表必须包含兜底项
    config
        .voice_map()
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

    if config.pipeline.max_concurrent_synthesis == 0 {
        return Err(ConfigError::ValidationError(
            "max_concurrent_synthesis must be at least 1".to_string(),
        ));
    }

    if config.llm.base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "LLM base URL cannot be empty".to_string(),
        ));
    }

    if config.tts.base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "TTS base URL cannot be empty".to_string(),
        ));
    }

    if config.input.page == Some(0) {
        return Err(ConfigError::ValidationError(
            "Page numbers start at 1".to_string(),
        ));
    }

    Ok(())
}

/// 隐藏密钥，只保留前 4 个字符
fn mask_secret(secret: Option<&str>) -> String {
    match secret {
        None => "<unset>".to_string(),
        Some(s) if s.chars().count() <= 4 => "****".to_string(),
        Some(s) => format!("{}****", s.chars().take(4).collect::<String>()),
    }
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("LLM: {} (model {})", config.llm.base_url, config.llm.model);
    tracing::info!("LLM API Key: {}", mask_secret(config.llm.api_key.as_deref()));
    tracing::info!("LLM JSON Mode: {}", config.llm.json_mode);
    tracing::info!("TTS Provider: {}", config.tts.provider);
    tracing::info!("TTS: {} (model {})", config.tts.base_url, config.tts.model_id);
    tracing::info!("TTS API Key: {}", mask_secret(config.tts.api_key.as_deref()));
    tracing::info!("TTS Timeout: {}s", config.tts.timeout_secs);
    tracing::info!("Voices: {}", config.voices.len());
    tracing::info!(
        "Output Format: {} @ {}bps",
        config.audio.output_format,
        config.audio.bitrate
    );
    tracing::info!(
        "Max Concurrent Synthesis: {}",
        config.pipeline.max_concurrent_synthesis
    );
    tracing::info!("Input: {:?}", config.input.path);
    if let Some(page) = config.input.page {
        tracing::info!("Page: {}", page);
    }
    tracing::info!("Output Directory: {:?}", config.output.dir);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::AudioFormat;
    use crate::config::types::TtsProvider;
    use std::io::Write;

    #[test]
    fn test_load_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.llm.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.tts.base_url, "https://api.elevenlabs.io");
        assert_eq!(config.output.dir, std::path::PathBuf::from("data/audio"));
    }

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_missing_fallback_voice() {
        let mut config = AppConfig::default();
        config.voices.retain(|entry| entry.character != "Unknown");
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_concurrency() {
        let mut config = AppConfig::default();
        config.pipeline.max_concurrent_synthesis = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_empty_base_url() {
        let mut config = AppConfig::default();
        config.tts.base_url = String::new();
        assert!(validate_config(&config).is_err());

        let mut config = AppConfig::default();
        config.llm.base_url = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_page_zero() {
        let mut config = AppConfig::default();
        config.input.page = Some(0);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret(None), "<unset>");
        assert_eq!(mask_secret(Some("abc")), "****");
        assert_eq!(mask_secret(Some("gsk_1234567890")), "gsk_****");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[llm]
model = "llama-3.1-8b-instant"
json_mode = true

[tts]
provider = "fake"

[audio]
output_format = "wav"

[pipeline]
max_concurrent_synthesis = 4

[input]
path = "books/little_women.txt"
page = 3

[[voices]]
character = "Laurie"
voice_id = "voice-laurie"

[[voices]]
character = "Unknown"
voice_id = "voice-unknown"
"#
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert!(config.llm.json_mode);
        assert_eq!(config.llm.temperature, 0.1);
        assert_eq!(config.tts.provider, TtsProvider::Fake);
        assert_eq!(config.audio.output_format, AudioFormat::Wav);
        assert_eq!(config.pipeline.max_concurrent_synthesis, 4);
        assert_eq!(config.input.page, Some(3));

        let voices = config.voice_map().unwrap();
        assert_eq!(voices.resolve("Laurie"), "voice-laurie");
        assert_eq!(voices.resolve("Jo"), "voice-unknown");
    }

    #[test]
    fn test_load_rejects_voice_table_without_fallback() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
[[voices]]
character = "Jo"
voice_id = "voice-jo"
"#
        )
        .unwrap();

        assert!(matches!(
            load_config_from_path(Some(file.path())),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
