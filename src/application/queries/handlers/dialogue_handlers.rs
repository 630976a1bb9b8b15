//! Dialogue Query Handlers

use std::sync::Arc;

use crate::application::attributor::SpeakerAttributor;
use crate::application::queries::dialogue_queries::{
    PreviewDialoguesQuery, PreviewDialoguesResponse,
};

/// PreviewDialogues Handler - 只做说话人识别，不合成
///
/// 识别失败时返回空列表
pub struct PreviewDialoguesHandler {
    attributor: Arc<SpeakerAttributor>,
}

impl PreviewDialoguesHandler {
    pub fn new(attributor: Arc<SpeakerAttributor>) -> Self {
        Self { attributor }
    }

    pub async fn handle(&self, query: PreviewDialoguesQuery) -> PreviewDialoguesResponse {
        let dialogues = self.attributor.attribute(&query.page_text).await;
        PreviewDialoguesResponse { dialogues }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::application::ports::{AttributionError, AttributionServicePort};

    struct Fixed;

    #[async_trait]
    impl AttributionServicePort for Fixed {
        async fn complete(&self, _prompt: &str) -> Result<String, AttributionError> {
            Ok(r#"{"dialogues": [{"character": "Amy", "dialogue": "I don't think it's fair."}]}"#
                .to_string())
        }
    }

    #[tokio::test]
    async fn test_preview_returns_dialogues() {
        let handler = PreviewDialoguesHandler::new(Arc::new(SpeakerAttributor::new(Arc::new(Fixed))));

        let response = handler
            .handle(PreviewDialoguesQuery {
                page_text: "\"I don't think it's fair,\" added little Amy.".to_string(),
            })
            .await;

        assert_eq!(response.dialogues.len(), 1);
        assert_eq!(response.dialogues[0].character, "Amy");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["dialogues"][0]["utterance"], "I don't think it's fair.");
    }
}
