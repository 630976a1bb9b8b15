//! Dialogue Context - Errors

use thiserror::Error;

/// 从语言服务响应中提取结构化对象失败
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("No JSON structure found")]
    NoStructuredObject,

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
}
