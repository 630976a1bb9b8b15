//! Audio Command Handlers

use std::sync::Arc;

use crate::application::commands::audio_commands::{GenerateAudioCommand, GenerateAudioResponse};
use crate::application::error::ApplicationError;
use crate::application::pipeline::PipelineOrchestrator;

/// GenerateAudio Handler - 生成整页音频
pub struct GenerateAudioHandler {
    pipeline: Arc<PipelineOrchestrator>,
}

impl GenerateAudioHandler {
    pub fn new(pipeline: Arc<PipelineOrchestrator>) -> Self {
        Self { pipeline }
    }

    pub async fn handle(
        &self,
        cmd: GenerateAudioCommand,
    ) -> Result<GenerateAudioResponse, ApplicationError> {
        tracing::info!(
            page = ?cmd.page_number,
            text_len = cmd.page_text.len(),
            "Generating page audio"
        );

        let output = self.pipeline.run_detailed(&cmd.page_text).await.map_err(|e| {
            tracing::error!(page = ?cmd.page_number, error = %e, "Page audio generation failed");
            e
        })?;

        Ok(GenerateAudioResponse {
            content_type: output.audio.mime_type().to_string(),
            audio: output.audio,
            dialogues: output.dialogues,
            clip_durations_ms: output.clip_durations_ms,
        })
    }
}
