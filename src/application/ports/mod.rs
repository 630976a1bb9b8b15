//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod attribution_service;
mod audio_codec;
mod synthesis_service;

pub use attribution_service::{AttributionError, AttributionServicePort};
pub use audio_codec::{AudioCodecPort, AudioFormat, CodecError, EncodeConfig, EncodedAudio};
pub use synthesis_service::{
    container_of, SynthesisError, SynthesisRequest, SynthesisResponse, SynthesisServicePort,
};
