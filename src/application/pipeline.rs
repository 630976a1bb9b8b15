//! Pipeline Orchestrator - 整页流水线
//!
//! 状态流转（线性，仅在合成失败时短路）:
//! `Start → Attributed → Synthesized → Assembled → Encoded → Done`
//!
//! - 识别失败：以空列表继续，最终输出 1000ms 静音
//! - 任一行合成失败：整页失败，不输出任何音频
//! - 并发合成时按原始行号重新排序后再组装

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;
use uuid::Uuid;

use crate::application::attributor::SpeakerAttributor;
use crate::application::error::ApplicationError;
use crate::application::ports::{AudioCodecPort, EncodeConfig, EncodedAudio};
use crate::application::synthesizer::SpeechSynthesizer;
use crate::domain::audio::{assemble_with_durations, AudioSegment, AudioSpec};
use crate::domain::dialogue::DialogueLine;

/// 流水线阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Start,
    Attributed,
    Synthesized,
    Assembled,
    Encoded,
    Done,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineStage::Start => "start",
            PipelineStage::Attributed => "attributed",
            PipelineStage::Synthesized => "synthesized",
            PipelineStage::Assembled => "assembled",
            PipelineStage::Encoded => "encoded",
            PipelineStage::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// 流水线配置
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// 最大并发合成数，1 表示严格顺序
    pub max_concurrent_synthesis: usize,
    /// 输出编码
    pub encode: EncodeConfig,
    /// 没有任何片段时静音音轨使用的格式
    pub fallback_spec: AudioSpec,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_synthesis: 1,
            encode: EncodeConfig::default(),
            fallback_spec: AudioSpec::default(),
        }
    }
}

/// 一次运行的完整结果
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// 识别出的对话（播放顺序）
    pub dialogues: Vec<DialogueLine>,
    /// 每行片段时长（含行尾停顿），与 dialogues 一一对应
    pub clip_durations_ms: Vec<u64>,
    /// 编码后的音频
    pub audio: EncodedAudio,
}

/// 流水线编排器
pub struct PipelineOrchestrator {
    attributor: Arc<SpeakerAttributor>,
    synthesizer: Arc<SpeechSynthesizer>,
    codec: Arc<dyn AudioCodecPort>,
    config: PipelineConfig,
}

impl PipelineOrchestrator {
    pub fn new(
        attributor: Arc<SpeakerAttributor>,
        synthesizer: Arc<SpeechSynthesizer>,
        codec: Arc<dyn AudioCodecPort>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            attributor,
            synthesizer,
            codec,
            config,
        }
    }

    /// 整页文本 → 编码后的音频
    pub async fn run(&self, page_text: &str) -> Result<EncodedAudio, ApplicationError> {
        self.run_detailed(page_text).await.map(|output| output.audio)
    }

    /// 整页文本 → 完整结果（对话、片段时长、音频）
    pub async fn run_detailed(&self, page_text: &str) -> Result<PipelineOutput, ApplicationError> {
        let span = tracing::info_span!("pipeline", run_id = %Uuid::new_v4());
        self.execute(page_text).instrument(span).await
    }

    async fn execute(&self, page_text: &str) -> Result<PipelineOutput, ApplicationError> {
        tracing::debug!(stage = %PipelineStage::Start, text_len = page_text.len());

        let dialogues = self.attributor.attribute(page_text).await;
        tracing::debug!(stage = %PipelineStage::Attributed, lines = dialogues.len());

        let clips = self.synthesize_all(&dialogues).await?;
        tracing::debug!(stage = %PipelineStage::Synthesized, clips = clips.len());

        let assembly = assemble_with_durations(&clips, self.config.fallback_spec);
        let clip_durations_ms = assembly.clip_durations_ms().to_vec();
        let track = assembly.finish();
        tracing::debug!(
            stage = %PipelineStage::Assembled,
            duration_ms = track.duration_ms()
        );

        let audio = self.codec.encode(&track, &self.config.encode)?;
        tracing::debug!(
            stage = %PipelineStage::Encoded,
            format = %audio.format,
            size = audio.len()
        );

        tracing::info!(
            stage = %PipelineStage::Done,
            lines = dialogues.len(),
            duration_ms = audio.duration_ms,
            size = audio.len(),
            "Page audio generated"
        );

        Ok(PipelineOutput {
            dialogues,
            clip_durations_ms,
            audio,
        })
    }

    /// 合成所有行，结果顺序与输入一致
    async fn synthesize_all(
        &self,
        lines: &[DialogueLine],
    ) -> Result<Vec<AudioSegment>, ApplicationError> {
        if self.config.max_concurrent_synthesis <= 1 || lines.len() <= 1 {
            return self.synthesize_sequential(lines).await;
        }
        self.synthesize_concurrent(lines).await
    }

    async fn synthesize_sequential(
        &self,
        lines: &[DialogueLine],
    ) -> Result<Vec<AudioSegment>, ApplicationError> {
        let mut clips = Vec::with_capacity(lines.len());
        for (index, line) in lines.iter().enumerate() {
            let clip = self.synthesizer.synthesize(line).await.map_err(|e| {
                tracing::error!(index, character = %line.character, error = %e, "Synthesis failed");
                ApplicationError::synthesis(index, &line.character, e)
            })?;
            clips.push(clip);
        }
        Ok(clips)
    }

    async fn synthesize_concurrent(
        &self,
        lines: &[DialogueLine],
    ) -> Result<Vec<AudioSegment>, ApplicationError> {
        // 使用 semaphore 控制并发
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_synthesis));

        // JoinSet 被丢弃时会取消其中所有任务（包括调用方放弃等待的情况）
        let mut tasks = JoinSet::new();
        for (index, line) in lines.iter().cloned().enumerate() {
            let semaphore = semaphore.clone();
            let synthesizer = self.synthesizer.clone();
            tasks.spawn(
                async move {
                    // semaphore 不会被关闭，permit 持有到任务完成
                    let _permit = semaphore.acquire_owned().await.ok();
                    (index, synthesizer.synthesize(&line).await)
                }
                .in_current_span(),
            );
        }

        let mut slots: Vec<Option<AudioSegment>> = vec![None; lines.len()];

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Ok(clip))) => slots[index] = Some(clip),
                Ok((index, Err(e))) => {
                    let character = &lines[index].character;
                    tracing::error!(index, character = %character, error = %e, "Synthesis failed");
                    // 第一个失败即终止，返回时 JoinSet 取消其余任务
                    return Err(ApplicationError::synthesis(index, character, e));
                }
                Err(e) => {
                    return Err(ApplicationError::internal(format!(
                        "Synthesis task failed: {}",
                        e
                    )));
                }
            }
        }

        // 按原始行号重新排序
        slots
            .into_iter()
            .enumerate()
            .map(|(index, clip)| {
                clip.ok_or_else(|| {
                    ApplicationError::internal(format!("Missing clip for line {}", index))
                })
            })
            .collect()
    }
}
