//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod codec;
pub mod llm;
pub mod retry;
pub mod tts;

pub use codec::*;
pub use llm::*;
pub use retry::{retry_with_backoff, RetryPolicy};
pub use tts::*;
