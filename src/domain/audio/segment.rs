//! Audio Context - AudioSegment
//!
//! 解码后的内存音频：交错排列的 f32 PCM 样本 + 格式描述

use std::ops::Add;

/// 行间停顿时长（毫秒）
pub const PAUSE_MS: u64 = 1000;

/// 音频格式描述
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpec {
    /// 采样率（Hz）
    pub sample_rate: u32,
    /// 声道数
    pub channels: u8,
}

impl AudioSpec {
    pub fn new(sample_rate: u32, channels: u8) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// 指定时长对应的帧数
    pub fn frames_for_ms(&self, duration_ms: u64) -> usize {
        (duration_ms * self.sample_rate as u64 / 1000) as usize
    }
}

impl Default for AudioSpec {
    /// 与合成服务的 mp3_44100_128 输出一致
    fn default() -> Self {
        Self::new(44100, 1)
    }
}

/// 音频片段
///
/// 值语义：所有操作都产生新片段，不修改输入
#[derive(Debug, Clone)]
pub struct AudioSegment {
    samples: Vec<f32>,
    spec: AudioSpec,
}

impl AudioSegment {
    /// 由交错样本构建，末尾不足一帧的样本被丢弃
    pub fn from_samples(mut samples: Vec<f32>, spec: AudioSpec) -> Self {
        let channels = spec.channels.max(1) as usize;
        samples.truncate(samples.len() - samples.len() % channels);
        Self { samples, spec }
    }

    /// 静音片段
    pub fn silent(duration_ms: u64, spec: AudioSpec) -> Self {
        let frames = spec.frames_for_ms(duration_ms);
        Self {
            samples: vec![0.0; frames * spec.channels.max(1) as usize],
            spec,
        }
    }

    /// 标准行间停顿
    pub fn pause(spec: AudioSpec) -> Self {
        Self::silent(PAUSE_MS, spec)
    }

    pub fn spec(&self) -> AudioSpec {
        self.spec
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// 帧数（每帧包含所有声道的一个样本）
    pub fn frames(&self) -> usize {
        self.samples.len() / self.spec.channels.max(1) as usize
    }

    /// 时长（毫秒，向下取整）
    pub fn duration_ms(&self) -> u64 {
        if self.spec.sample_rate == 0 {
            return 0;
        }
        self.frames() as u64 * 1000 / self.spec.sample_rate as u64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 转换为指定格式（声道混合 + 线性重采样）
    pub fn conform(&self, spec: AudioSpec) -> AudioSegment {
        if self.spec == spec {
            return self.clone();
        }

        let remixed = remix_channels(&self.samples, self.spec.channels, spec.channels);
        let resampled = resample(
            &remixed,
            self.spec.sample_rate,
            spec.sample_rate,
            spec.channels,
        );

        AudioSegment::from_samples(resampled, spec)
    }

    /// 拼接，结果采用 self 的格式
    pub fn concat(&self, other: &AudioSegment) -> AudioSegment {
        let mut joined = AudioSegment {
            samples: Vec::with_capacity(self.samples.len() + other.samples.len()),
            spec: self.spec,
        };
        joined.samples.extend_from_slice(&self.samples);
        joined.append(other);
        joined
    }

    /// 原地追加，other 先转换为 self 的格式
    pub(crate) fn append(&mut self, other: &AudioSegment) {
        if other.spec == self.spec {
            self.samples.extend_from_slice(&other.samples);
        } else {
            self.samples.extend_from_slice(&other.conform(self.spec).samples);
        }
    }
}

impl Add<&AudioSegment> for &AudioSegment {
    type Output = AudioSegment;

    fn add(self, rhs: &AudioSegment) -> AudioSegment {
        self.concat(rhs)
    }
}

impl Add for AudioSegment {
    type Output = AudioSegment;

    fn add(self, rhs: AudioSegment) -> AudioSegment {
        self.concat(&rhs)
    }
}

/// 声道转换：先混为单声道，再复制到目标声道数
fn remix_channels(samples: &[f32], from: u8, to: u8) -> Vec<f32> {
    let from = from.max(1) as usize;
    let to = to.max(1) as usize;
    if from == to {
        return samples.to_vec();
    }

    let mut out = Vec::with_capacity(samples.len() / from * to);
    for frame in samples.chunks_exact(from) {
        let mixed = frame.iter().sum::<f32>() / from as f32;
        out.extend(std::iter::repeat(mixed).take(to));
    }
    out
}

/// 简单线性重采样
fn resample(samples: &[f32], from_rate: u32, to_rate: u32, channels: u8) -> Vec<f32> {
    if from_rate == to_rate || from_rate == 0 || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let channel_count = channels.max(1) as usize;
    let frame_count = samples.len() / channel_count;
    let new_frame_count = (frame_count as f64 * ratio) as usize;
    let mut resampled = Vec::with_capacity(new_frame_count * channel_count);

    for i in 0..new_frame_count {
        let src_pos = i as f64 / ratio;
        let src_idx = src_pos as usize;
        let frac = src_pos - src_idx as f64;

        for ch in 0..channel_count {
            let idx0 = src_idx * channel_count + ch;
            let idx1 = ((src_idx + 1).min(frame_count - 1)) * channel_count + ch;

            let s0 = samples.get(idx0).copied().unwrap_or(0.0);
            let s1 = samples.get(idx1).copied().unwrap_or(s0);

            resampled.push(s0 + (s1 - s0) * frac as f32);
        }
    }

    resampled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(duration_ms: u64, spec: AudioSpec, level: f32) -> AudioSegment {
        let frames = spec.frames_for_ms(duration_ms);
        AudioSegment::from_samples(vec![level; frames * spec.channels as usize], spec)
    }

    #[test]
    fn test_silent_duration() {
        let spec = AudioSpec::default();
        let silence = AudioSegment::silent(1000, spec);
        assert_eq!(silence.duration_ms(), 1000);
        assert_eq!(silence.frames(), 44100);
        assert!(silence.samples().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_pause_is_one_second() {
        let pause = AudioSegment::pause(AudioSpec::new(16000, 2));
        assert_eq!(pause.duration_ms(), PAUSE_MS);
        assert_eq!(pause.samples().len(), 32000);
    }

    #[test]
    fn test_add_sums_durations_and_keeps_inputs() {
        let spec = AudioSpec::new(16000, 1);
        let a = tone(250, spec, 0.5);
        let b = tone(750, spec, -0.5);

        let joined = &a + &b;
        assert_eq!(joined.duration_ms(), 1000);
        assert_eq!(a.duration_ms(), 250);
        assert_eq!(b.duration_ms(), 750);
        assert_eq!(joined.samples()[0], 0.5);
        assert_eq!(*joined.samples().last().unwrap(), -0.5);
    }

    #[test]
    fn test_concat_is_associative() {
        let spec = AudioSpec::new(8000, 1);
        let a = tone(100, spec, 0.1);
        let b = tone(200, spec, 0.2);
        let c = tone(300, spec, 0.3);

        let left = (&(&a + &b)) + &c;
        let right = &a + &(&b + &c);
        assert_eq!(left.samples(), right.samples());
    }

    #[test]
    fn test_concat_conforms_rhs_format() {
        let left = tone(500, AudioSpec::new(16000, 1), 0.25);
        let right = tone(500, AudioSpec::new(32000, 2), 0.25);

        let joined = left + right;
        assert_eq!(joined.spec(), AudioSpec::new(16000, 1));
        assert_eq!(joined.duration_ms(), 1000);
        assert!(joined.samples().iter().all(|&s| (s - 0.25).abs() < 1e-6));
    }

    #[test]
    fn test_append_matches_concat() {
        let spec = AudioSpec::new(16000, 1);
        let a = tone(300, spec, 0.1);
        let b = tone(200, AudioSpec::new(8000, 2), 0.4);

        let mut appended = a.clone();
        appended.append(&b);
        assert_eq!(appended.samples(), a.concat(&b).samples());
        assert_eq!(appended.spec(), spec);
        assert_eq!(appended.duration_ms(), 500);
    }

    #[test]
    fn test_from_samples_drops_partial_frame() {
        let seg = AudioSegment::from_samples(vec![0.0; 5], AudioSpec::new(8000, 2));
        assert_eq!(seg.frames(), 2);
        assert_eq!(seg.samples().len(), 4);
    }
}
