//! LLM Adapter - 语言理解服务客户端实现

mod chat_completion_client;

pub use chat_completion_client::*;
