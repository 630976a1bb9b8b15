//! 应用层 - 命令
//!
//! CQRS 命令侧：触发外部合成、产生音频的操作

mod audio_commands;

pub mod handlers;

pub use audio_commands::*;
