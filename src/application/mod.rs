//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（AttributionService、SynthesisService、AudioCodec）
//! - attributor / synthesizer / pipeline: 说话人识别、单行合成、整页流水线
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod attributor;
pub mod commands;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod queries;
pub mod synthesizer;

// Re-exports
pub use attributor::{build_prompt, SpeakerAttributor, ATTRIBUTION_INSTRUCTION};
pub use commands::{
    handlers::GenerateAudioHandler, GenerateAudioCommand, GenerateAudioResponse,
};
pub use error::ApplicationError;
pub use pipeline::{PipelineConfig, PipelineOrchestrator, PipelineOutput, PipelineStage};
pub use ports::{
    AttributionError, AttributionServicePort, AudioCodecPort, AudioFormat, CodecError,
    EncodeConfig, EncodedAudio, SynthesisError, SynthesisRequest, SynthesisResponse,
    SynthesisServicePort,
};
pub use queries::{
    handlers::PreviewDialoguesHandler, PreviewDialoguesQuery, PreviewDialoguesResponse,
};
pub use synthesizer::{SpeechSynthesizer, SynthesisSettings};
