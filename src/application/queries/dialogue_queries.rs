//! Dialogue Queries - 对话预览查询

use serde::Serialize;

use crate::domain::dialogue::DialogueLine;

/// 预览页面对话查询
#[derive(Debug, Clone)]
pub struct PreviewDialoguesQuery {
    pub page_text: String,
}

/// 预览页面对话响应
#[derive(Debug, Clone, Serialize)]
pub struct PreviewDialoguesResponse {
    pub dialogues: Vec<DialogueLine>,
}
