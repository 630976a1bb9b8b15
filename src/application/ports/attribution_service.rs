//! Attribution Service Port - 语言理解服务抽象
//!
//! 发送一段提示词，返回服务的自由文本回答。具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::dialogue::ExtractionError;

/// 说话人识别错误
#[derive(Debug, Error)]
pub enum AttributionError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error (HTTP {status}): {message}")]
    ServiceError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
}

impl AttributionError {
    /// 是否为可重试的瞬时错误（网络、超时、限流、服务端 5xx）
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NetworkError(_) | Self::Timeout => true,
            Self::ServiceError { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidResponse(_) | Self::Extraction(_) => false,
        }
    }
}

/// Attribution Service Port
///
/// 单方法能力接口，测试中可替换为固定响应
#[async_trait]
pub trait AttributionServicePort: Send + Sync {
    /// 发送提示词，返回服务的文本回答
    async fn complete(&self, prompt: &str) -> Result<String, AttributionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(AttributionError::Timeout.is_retryable());
        assert!(AttributionError::NetworkError("reset".into()).is_retryable());
        assert!(AttributionError::ServiceError {
            status: 429,
            message: "rate limited".into()
        }
        .is_retryable());
        assert!(AttributionError::ServiceError {
            status: 503,
            message: String::new()
        }
        .is_retryable());
        assert!(!AttributionError::ServiceError {
            status: 401,
            message: "bad key".into()
        }
        .is_retryable());
        assert!(!AttributionError::from(ExtractionError::NoStructuredObject).is_retryable());
    }
}
