//! Chat Completion Client - 调用 OpenAI 兼容的对话补全服务
//!
//! 实现 AttributionServicePort trait
//!
//! 外部 API:
//! POST {base_url}/chat/completions
//! Request: {"model": "...", "messages": [{"role": "user", "content": "..."}], "temperature": 0.1}
//! Response: {"choices": [{"message": {"content": "..."}}]}

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{AttributionError, AttributionServicePort};
use crate::infrastructure::adapters::retry::{retry_with_backoff, RetryPolicy};

/// 请求体
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// 响应体（只取需要的字段）
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionResponse {
    /// 取 choices[0].message.content
    fn into_content(self) -> Option<String> {
        self.choices.into_iter().next()?.message.content
    }
}

/// 对话补全客户端配置
#[derive(Debug, Clone)]
pub struct ChatCompletionClientConfig {
    /// 服务基础 URL（含 /v1 之类的版本前缀）
    pub base_url: String,
    /// API Key（Bearer）
    pub api_key: Option<String>,
    /// 模型名称
    pub model: String,
    /// 采样温度
    pub temperature: f32,
    /// 是否要求服务直接返回 JSON 对象
    pub json_mode: bool,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// 重试次数
    pub max_retries: u32,
}

impl Default for ChatCompletionClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key: None,
            model: "llama3-70b-8192".to_string(),
            temperature: 0.1,
            json_mode: false,
            timeout_secs: 60,
            max_retries: 0,
        }
    }
}

impl ChatCompletionClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// 对话补全客户端
pub struct ChatCompletionClient {
    client: Client,
    config: ChatCompletionClientConfig,
}

impl ChatCompletionClient {
    /// 创建新的客户端
    pub fn new(config: ChatCompletionClientConfig) -> Result<Self, AttributionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AttributionError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 获取补全 URL
    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
            response_format: self.config.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        }
    }

    /// 单次调用
    async fn complete_once(&self, prompt: &str) -> Result<String, AttributionError> {
        let url = self.completions_url();

        tracing::debug!(
            url = %url,
            model = %self.config.model,
            prompt_len = prompt.len(),
            "Sending chat completion request"
        );

        let mut request = self.client.post(&url).json(&self.request_body(prompt));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AttributionError::Timeout
            } else if e.is_connect() {
                AttributionError::NetworkError(format!(
                    "Cannot connect to language service: {}",
                    e
                ))
            } else {
                AttributionError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AttributionError::ServiceError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AttributionError::InvalidResponse(format!("Invalid JSON body: {}", e)))?;

        let content = body.into_content().ok_or_else(|| {
            AttributionError::InvalidResponse("Missing choices[0].message.content".to_string())
        })?;

        tracing::debug!(content_len = content.len(), "Chat completion received");

        Ok(content)
    }
}

#[async_trait]
impl AttributionServicePort for ChatCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, AttributionError> {
        retry_with_backoff(
            RetryPolicy::new(self.config.max_retries),
            "chat_completion",
            AttributionError::is_retryable,
            || self.complete_once(prompt),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ChatCompletionClientConfig::default();
        assert_eq!(config.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(config.model, "llama3-70b-8192");
        assert_eq!(config.max_retries, 0);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = ChatCompletionClientConfig::new("http://localhost:8000/v1/")
            .with_api_key("secret")
            .with_model("qwen2.5-7b-instruct");
        let client = ChatCompletionClient::new(config).unwrap();
        assert_eq!(
            client.completions_url(),
            "http://localhost:8000/v1/chat/completions"
        );
        assert_eq!(client.config.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_request_body_shape() {
        let client = ChatCompletionClient::new(ChatCompletionClientConfig::default()).unwrap();
        let body = serde_json::to_value(client.request_body("hello")).unwrap();

        assert_eq!(body["model"], "llama3-70b-8192");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_json_mode_requests_json_object() {
        let config = ChatCompletionClientConfig {
            json_mode: true,
            ..Default::default()
        };
        let client = ChatCompletionClient::new(config).unwrap();
        let body = serde_json::to_value(client.request_body("hello")).unwrap();
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_response_content_extraction() {
        let body: ChatCompletionResponse = serde_json::from_str(
            r#"{"id": "x", "choices": [{"index": 0, "message": {"role": "assistant", "content": "{\"dialogues\": []}"}}]}"#,
        )
        .unwrap();
        assert_eq!(body.into_content().as_deref(), Some("{\"dialogues\": []}"));

        let empty: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(empty.into_content().is_none());
    }
}
