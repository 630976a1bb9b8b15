//! 应用层 - 查询（读操作）
//!
//! CQRS 查询侧：不产生音频的只读操作

mod dialogue_queries;

pub mod handlers;

pub use dialogue_queries::*;
