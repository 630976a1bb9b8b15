//! Pagecast - 多角色有声书页面生成
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Dialogue: 对话行与结构化响应解析
//! - Voice: 说话人 → 音色映射
//! - Audio: PCM 片段、静音、拼接与整页组装
//!
//! 应用层 (application/):
//! - Ports: 端口定义（AttributionService, SynthesisService, AudioCodec）
//! - Attributor / Synthesizer / Pipeline: 说话人识别、单行合成、整页编排
//! - Commands: 生成整页音频
//! - Queries: 预览对话
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: 对话补全客户端、ElevenLabs / 离线 TTS 客户端、音频编解码、重试

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
