//! Speaker Attributor - 说话人识别
//!
//! 把一页文本交给语言理解服务，按出现顺序切分为（说话人, 台词）列表。
//!
//! 错误策略：服务调用失败或响应无法解析时不向上抛出，
//! `attribute` 返回空列表（"没有可合成的内容"），由下游生成静音音轨

use std::sync::Arc;

use crate::application::ports::{AttributionError, AttributionServicePort};
use crate::domain::dialogue::{extract_dialogues, DialogueLine, NARRATOR};

/// 识别指令
///
/// 要求服务按顺序列出每段对话和旁白，并以固定结构返回
pub const ATTRIBUTION_INSTRUCTION: &str = r#"Extract all character dialogues and narrator text from the given book page. Identify each speaker and associate their spoken lines with them in sequential order. If the text is not a dialogue, label it as "Narrator".

Respond with a JSON object of this shape:

{
    "dialogues": [
        {
            "character": "Character Name",
            "dialogue": "Spoken line of the character."
        },
        {
            "character": "Narrator",
            "dialogue": "Descriptive text between dialogues."
        }
    ]
}"#;

/// 构建完整提示词
pub fn build_prompt(page_text: &str) -> String {
    format!(
        "{}\n\nText to process:\n{}\n",
        ATTRIBUTION_INSTRUCTION, page_text
    )
}

/// 说话人识别器
pub struct SpeakerAttributor {
    service: Arc<dyn AttributionServicePort>,
}

impl SpeakerAttributor {
    pub fn new(service: Arc<dyn AttributionServicePort>) -> Self {
        Self { service }
    }

    /// 识别说话人，保留具体错误
    ///
    /// 空白文本直接返回空列表，不调用服务
    pub async fn try_attribute(
        &self,
        page_text: &str,
    ) -> Result<Vec<DialogueLine>, AttributionError> {
        if page_text.trim().is_empty() {
            tracing::debug!("Blank page, skipping attribution");
            return Ok(Vec::new());
        }

        let prompt = build_prompt(page_text);
        let response = self.service.complete(&prompt).await?;
        let lines = extract_dialogues(&response)?;

        tracing::debug!(
            text_len = page_text.len(),
            lines = lines.len(),
            narrated = lines.iter().filter(|l| l.character == NARRATOR).count(),
            "Attribution completed"
        );

        Ok(lines)
    }

    /// 识别说话人
    ///
    /// 任何失败都降级为空列表
    pub async fn attribute(&self, page_text: &str) -> Vec<DialogueLine> {
        match self.try_attribute(page_text).await {
            Ok(lines) => lines,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    text_len = page_text.len(),
                    "Attribution failed, continuing with no dialogue"
                );
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::domain::dialogue::ExtractionError;

    /// 固定响应的语言服务
    struct CannedService {
        response: Result<String, u16>,
        calls: AtomicUsize,
    }

    impl CannedService {
        fn ok(response: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(response.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                response: Err(status),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl AttributionServicePort for CannedService {
        async fn complete(&self, prompt: &str) -> Result<String, AttributionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(prompt.contains("Text to process:"));
            match &self.response {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(AttributionError::ServiceError {
                    status: *status,
                    message: "unavailable".to_string(),
                }),
            }
        }
    }

    const PAGE: &str = "\"We've got Father and Mother,\" said Beth contentedly.";

    #[tokio::test]
    async fn test_attribute_parses_embedded_object() {
        let service = CannedService::ok(
            r#"Here you go:
{"dialogues": [
  {"character": "Beth", "dialogue": "We've got Father and Mother."},
  {"character": "Narrator", "dialogue": "said Beth contentedly."}
]}
Anything else?"#,
        );
        let attributor = SpeakerAttributor::new(service.clone());

        let lines = attributor.attribute(PAGE).await;
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].character, "Beth");
        assert_eq!(lines[1].character, NARRATOR);
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_service_failure_yields_empty() {
        let attributor = SpeakerAttributor::new(CannedService::failing(503));

        assert!(attributor.attribute(PAGE).await.is_empty());
        assert!(matches!(
            attributor.try_attribute(PAGE).await,
            Err(AttributionError::ServiceError { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn test_response_without_object_yields_empty() {
        let attributor =
            SpeakerAttributor::new(CannedService::ok("I could not find any dialogue."));

        assert!(attributor.attribute(PAGE).await.is_empty());
        assert!(matches!(
            attributor.try_attribute(PAGE).await,
            Err(AttributionError::Extraction(ExtractionError::NoStructuredObject))
        ));
    }

    #[tokio::test]
    async fn test_blank_page_skips_service() {
        let service = CannedService::ok("{}");
        let attributor = SpeakerAttributor::new(service.clone());

        assert!(attributor.attribute("   ").await.is_empty());
        assert!(attributor.attribute("").await.is_empty());
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_prompt_contains_instruction_and_text() {
        let prompt = build_prompt(PAGE);
        assert!(prompt.starts_with("Extract all character dialogues"));
        assert!(prompt.contains("\"dialogues\""));
        assert!(prompt.ends_with(&format!("Text to process:\n{}\n", PAGE)));
    }
}
