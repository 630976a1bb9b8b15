//! 应用层错误定义
//!
//! 请求级错误：任何一行合成失败都会使整页失败，不返回不完整的音频

use thiserror::Error;

use crate::application::ports::{CodecError, SynthesisError};

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 某一行合成失败
    #[error("Synthesis failed at line {index} ({character}): {source}")]
    Synthesis {
        index: usize,
        character: String,
        source: SynthesisError,
    },

    /// 编码为传输格式失败
    #[error("Encoding error: {0}")]
    Encoding(#[from] CodecError),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建合成错误
    pub fn synthesis(index: usize, character: impl Into<String>, source: SynthesisError) -> Self {
        Self::Synthesis {
            index,
            character: character.into(),
            source,
        }
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }

    /// 出错的行号（仅合成错误）
    pub fn line_index(&self) -> Option<usize> {
        match self {
            Self::Synthesis { index, .. } => Some(*index),
            Self::Encoding(_) | Self::InternalError(_) => None,
        }
    }
}
