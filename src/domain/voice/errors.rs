//! Voice Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoiceMapError {
    #[error("Voice map has no entry for the fallback speaker '{0}'")]
    MissingFallback(&'static str),

    #[error("Voice id for '{0}' is empty")]
    EmptyVoiceId(String),
}
