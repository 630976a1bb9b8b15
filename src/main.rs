//! Pagecast - 多角色有声书页面生成
//!
//! 读取纯文本文档，逐页识别说话人、按角色音色合成、
//! 组装为单条音轨并写入输出目录

use std::path::Path;
use std::sync::Arc;

use pagecast::application::ports::{
    AudioCodecPort, EncodeConfig, SynthesisServicePort,
};
use pagecast::application::{
    GenerateAudioCommand, GenerateAudioHandler, PipelineConfig, PipelineOrchestrator,
    SpeakerAttributor, SpeechSynthesizer, SynthesisSettings,
};
use pagecast::config::{load_config, print_config, AppConfig, TtsProvider};
use pagecast::domain::{select_pages, split_pages};
use pagecast::infrastructure::adapters::{
    ChatCompletionClient, ChatCompletionClientConfig, ElevenLabsClient, ElevenLabsClientConfig,
    FakeTtsClient, SymphoniaCodec,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    init_tracing(&config);

    tracing::info!("Pagecast - 多角色有声书页面生成");
    print_config(&config);

    let pipeline = Arc::new(build_pipeline(&config)?);
    let handler = GenerateAudioHandler::new(pipeline);

    // 读取文档并分页
    let document = tokio::fs::read_to_string(&config.input.path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {:?}: {}", config.input.path, e))?;
    let pages = split_pages(&document);
    tracing::info!(pages = pages.len(), path = ?config.input.path, "Document loaded");

    let selected = select_pages(&pages, config.input.page);
    if selected.is_empty() {
        anyhow::bail!(
            "Page {:?} not found ({} pages in document)",
            config.input.page,
            pages.len()
        );
    }

    tokio::fs::create_dir_all(&config.output.dir).await?;

    for (page_number, page_text) in selected {
        let response = handler
            .handle(GenerateAudioCommand {
                page_number: Some(page_number),
                page_text: page_text.to_string(),
            })
            .await?;

        let stem = format!("page-{:03}", page_number);
        let audio_path = config
            .output
            .dir
            .join(format!("{}.{}", stem, response.audio.format.extension()));
        let dialogues_path = config.output.dir.join(format!("{}.dialogues.json", stem));

        write_file(&audio_path, &response.audio.audio_data).await?;
        write_file(
            &dialogues_path,
            &serde_json::to_vec_pretty(&response.dialogues)?,
        )
        .await?;

        tracing::info!(
            page = page_number,
            lines = response.dialogues.len(),
            duration_ms = response.audio.duration_ms,
            size = response.audio.len(),
            content_type = %response.content_type,
            path = %audio_path.display(),
            "Page written"
        );
    }

    tracing::info!("All pages complete");

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let log_filter = format!("{},pagecast={}", config.log.level, config.log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// 按配置组装适配器与流水线
fn build_pipeline(config: &AppConfig) -> anyhow::Result<PipelineOrchestrator> {
    let voices = Arc::new(config.voice_map()?);
    tracing::info!(characters = ?voices.characters(), "Voice map loaded");

    // 对话归属服务
    let llm_config = ChatCompletionClientConfig {
        base_url: config.llm.base_url.clone(),
        api_key: config.llm.api_key.clone(),
        model: config.llm.model.clone(),
        temperature: config.llm.temperature,
        json_mode: config.llm.json_mode,
        timeout_secs: config.llm.timeout_secs,
        max_retries: config.llm.max_retries,
    };
    if llm_config.api_key.is_none() {
        tracing::warn!("LLM API key is not set; attribution requests may be rejected");
    }
    let llm = Arc::new(ChatCompletionClient::new(llm_config)?);

    // 语音合成服务
    let tts: Arc<dyn SynthesisServicePort> = match config.tts.provider {
        TtsProvider::ElevenLabs => {
            let api_key = config
                .tts
                .api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("tts.api_key is required for ElevenLabs"))?;
            let tts_config = ElevenLabsClientConfig {
                base_url: config.tts.base_url.clone(),
                api_key,
                timeout_secs: config.tts.timeout_secs,
                max_retries: config.tts.max_retries,
            };
            Arc::new(ElevenLabsClient::new(tts_config)?)
        }
        TtsProvider::Fake => Arc::new(FakeTtsClient::with_defaults()),
    };

    let codec: Arc<dyn AudioCodecPort> = Arc::new(SymphoniaCodec::new());
    if !codec.supports_format(config.audio.output_format) {
        anyhow::bail!("Unsupported output format: {}", config.audio.output_format);
    }

    let attributor = Arc::new(SpeakerAttributor::new(llm));
    let synthesizer = Arc::new(SpeechSynthesizer::new(
        tts,
        codec.clone(),
        voices,
        SynthesisSettings {
            model_id: config.tts.model_id.clone(),
            output_format: config.tts.output_format.clone(),
        },
    ));

    let pipeline_config = PipelineConfig {
        max_concurrent_synthesis: config.pipeline.max_concurrent_synthesis,
        encode: EncodeConfig {
            format: config.audio.output_format,
            bitrate: config.audio.bitrate,
        },
        ..Default::default()
    };

    Ok(PipelineOrchestrator::new(
        attributor,
        synthesizer,
        codec,
        pipeline_config,
    ))
}

async fn write_file(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    tokio::fs::write(path, data)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))
}
