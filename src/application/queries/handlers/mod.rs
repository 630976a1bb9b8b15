//! Query Handlers 实现
//!
//! 所有 QueryHandler 的具体实现

mod dialogue_handlers;

pub use dialogue_handlers::*;
