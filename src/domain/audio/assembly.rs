//! Audio Context - 音轨组装
//!
//! 开头插入一段 1000ms 静音，之后按输入顺序拼接各片段。
//! 行尾停顿已在合成阶段附加在每个片段上，这里不再插入。

use super::segment::{AudioSegment, AudioSpec};

/// 组装中的音轨
///
/// 记录每个片段的时长，便于核对顺序
#[derive(Debug, Clone)]
pub struct AudioAssembly {
    track: AudioSegment,
    clip_durations_ms: Vec<u64>,
}

impl AudioAssembly {
    /// 以一段前导停顿开始
    pub fn new(spec: AudioSpec) -> Self {
        Self {
            track: AudioSegment::pause(spec),
            clip_durations_ms: Vec::new(),
        }
    }

    /// 追加一个片段
    pub fn push(&mut self, clip: &AudioSegment) {
        self.clip_durations_ms.push(clip.duration_ms());
        self.track.append(clip);
    }

    /// 已追加片段的时长（按追加顺序，不含前导停顿）
    pub fn clip_durations_ms(&self) -> &[u64] {
        &self.clip_durations_ms
    }

    pub fn len(&self) -> usize {
        self.clip_durations_ms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clip_durations_ms.is_empty()
    }

    pub fn duration_ms(&self) -> u64 {
        self.track.duration_ms()
    }

    pub fn finish(self) -> AudioSegment {
        self.track
    }
}

/// 组装音轨
///
/// 前导停顿采用第一个片段的格式；没有片段时使用 `fallback_spec`，
/// 返回一段 1000ms 静音
pub fn assemble(segments: &[AudioSegment], fallback_spec: AudioSpec) -> AudioSegment {
    assemble_with_durations(segments, fallback_spec).finish()
}

/// 组装音轨，保留每个片段的时长记录
pub fn assemble_with_durations(
    segments: &[AudioSegment],
    fallback_spec: AudioSpec,
) -> AudioAssembly {
    let spec = segments
        .first()
        .map(AudioSegment::spec)
        .unwrap_or(fallback_spec);

    segments.iter().fold(AudioAssembly::new(spec), |mut assembly, clip| {
        assembly.push(clip);
        assembly
    })
}
