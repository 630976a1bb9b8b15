//! Symphonia Codec - 基于 symphonia 的音频编解码器
//!
//! 支持：
//! - MP3 / WAV 解码为内存 PCM
//! - PCM → WAV (16 位) 编码
//! - PCM → Opus (OGG 容器) 编码

use ogg::writing::PacketWriter;
use opus::{Application, Channels, Encoder};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{
    AudioCodecPort, AudioFormat, CodecError, EncodeConfig, EncodedAudio,
};
use crate::domain::audio::{AudioSegment, AudioSpec};

/// 音频编解码器
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaCodec;

impl SymphoniaCodec {
    pub fn new() -> Self {
        Self
    }

    /// 使用 symphonia 解码为 PCM
    fn decode_to_pcm(
        &self,
        data: &[u8],
        format_hint: Option<&str>,
    ) -> Result<AudioSegment, CodecError> {
        if data.is_empty() {
            return Err(CodecError::InvalidInput("Empty audio data".to_string()));
        }

        let cursor = Cursor::new(data.to_vec());
        let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = format_hint {
            hint.with_extension(ext);
        }

        let format_opts = format_options();
        let metadata_opts = MetadataOptions::default();

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &format_opts, &metadata_opts)
            .map_err(|e| CodecError::DecodingError(format!("Probe failed: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| CodecError::DecodingError("No audio track found".to_string()))?;

        let mut sample_rate = track.codec_params.sample_rate;
        let mut channels = track.codec_params.channels.map(|c| c.count() as u8);

        let decoder_opts = DecoderOptions::default();
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &decoder_opts)
            .map_err(|e| CodecError::DecodingError(format!("Decoder creation failed: {}", e)))?;

        let mut samples: Vec<f32> = Vec::new();
        let track_id = track.id;
        let mut packets = 0usize;
        let mut failed_packets = 0usize;

        loop {
            let packet = match format.next_packet() {
                Ok(p) => p,
                Err(symphonia::core::errors::Error::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    return Err(CodecError::DecodingError(format!(
                        "Packet read error: {}",
                        e
                    )));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            packets += 1;
            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(e) => {
                    failed_packets += 1;
                    tracing::warn!(error = %e, packet = packets, "Decode error (skipping packet)");
                    continue;
                }
            };

            // MP3 的格式信息可能要到首帧解码后才确定
            let spec = *decoded.spec();
            sample_rate.get_or_insert(spec.rate);
            channels.get_or_insert(spec.channels.count() as u8);

            let num_frames = decoded.frames();
            let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);
            // Only take the actual samples, not the entire buffer capacity
            let actual_samples = num_frames * spec.channels.count();
            samples.extend(&sample_buf.samples()[..actual_samples]);
        }

        check_packet_failures(failed_packets, packets)?;

        let sample_rate = sample_rate
            .ok_or_else(|| CodecError::DecodingError("Unknown sample rate".to_string()))?;
        let channels =
            channels.ok_or_else(|| CodecError::DecodingError("Unknown channel count".to_string()))?;

        Ok(AudioSegment::from_samples(
            samples,
            AudioSpec::new(sample_rate, channels),
        ))
    }

    /// 将 PCM f32 样本编码为 Opus (OGG 容器)
    fn encode_opus(&self, segment: &AudioSegment, bitrate: u32) -> Result<Vec<u8>, CodecError> {
        // Opus 仅支持单声道或立体声，以及 8k/12k/16k/24k/48k 采样率
        let source = segment.spec();
        let target = AudioSpec::new(
            opus_compatible_sample_rate(source.sample_rate),
            source.channels.clamp(1, 2),
        );
        let pcm = segment.conform(target);

        let sample_rate = target.sample_rate;
        let channel_count = target.channels as usize;
        let channels = if channel_count == 1 {
            Channels::Mono
        } else {
            Channels::Stereo
        };

        // 创建 Opus 编码器 (Application::Voip 优化语音)
        let mut encoder = Encoder::new(sample_rate, channels, Application::Voip).map_err(|e| {
            CodecError::EncodingError(format!("Failed to create Opus encoder: {}", e))
        })?;

        encoder
            .set_bitrate(opus::Bitrate::Bits(bitrate as i32))
            .map_err(|e| CodecError::EncodingError(format!("Failed to set bitrate: {}", e)))?;

        // 编码器延迟 (lookahead，编码器采样率下的样本数)
        let lookahead = encoder
            .get_lookahead()
            .map(|l| l as u64)
            .unwrap_or(312 * sample_rate as u64 / 48000);

        // RFC 7845: pre-skip 与 granule position 均以 48kHz 样本计
        let to_48k = |samples: u64| samples * 48000 / sample_rate as u64;
        let pre_skip_48k = to_48k(lookahead);
        // 末页 granule 指向真实音频的结尾，播放器据此裁掉补零与冲刷帧
        let end_granule = pre_skip_48k + to_48k(pcm.frames() as u64);

        let pcm_i16: Vec<i16> = pcm.samples().iter().map(|&s| to_i16(s)).collect();

        // 使用 20ms frame
        let frame_size = (sample_rate as usize * 20) / 1000;
        let samples_per_frame = frame_size * channel_count;

        let mut ogg_data = Vec::new();
        {
            let mut packet_writer = PacketWriter::new(&mut ogg_data);

            let opus_head = create_opus_head(channel_count as u8, sample_rate, pre_skip_48k as u16);
            packet_writer
                .write_packet(opus_head, 0, ogg::PacketWriteEndInfo::EndPage, 0)
                .map_err(|e| CodecError::EncodingError(format!("Failed to write Opus head: {}", e)))?;

            packet_writer
                .write_packet(create_opus_tags(), 0, ogg::PacketWriteEndInfo::EndPage, 0)
                .map_err(|e| CodecError::EncodingError(format!("Failed to write Opus tags: {}", e)))?;

            let mut output_buf = vec![0u8; 4000];

            let frame_granule = to_48k(frame_size as u64);
            let mut granule_pos: u64 = pre_skip_48k;

            // 末尾额外编码静音帧，冲出编码器缓冲区中的样本
            let flush_frames = (lookahead as usize).div_ceil(frame_size).max(1);
            let silence_frame = vec![0i16; samples_per_frame];

            let frames: Vec<Vec<i16>> = pcm_i16
                .chunks(samples_per_frame)
                .map(|chunk| {
                    let mut frame = chunk.to_vec();
                    frame.resize(samples_per_frame, 0);
                    frame
                })
                .chain(std::iter::repeat(silence_frame).take(flush_frames))
                .collect();
            let last = frames.len() - 1;

            for (idx, frame) in frames.iter().enumerate() {
                let encoded_len = encoder
                    .encode(frame, &mut output_buf)
                    .map_err(|e| CodecError::EncodingError(format!("Opus encode failed: {}", e)))?;

                granule_pos = (granule_pos + frame_granule).min(end_granule);

                let end_info = if idx == last {
                    ogg::PacketWriteEndInfo::EndStream
                } else {
                    ogg::PacketWriteEndInfo::NormalPacket
                };

                packet_writer
                    .write_packet(output_buf[..encoded_len].to_vec(), 0, end_info, granule_pos)
                    .map_err(|e| {
                        CodecError::EncodingError(format!("Failed to write Opus packet: {}", e))
                    })?;
            }
        }

        Ok(ogg_data)
    }
}

impl AudioCodecPort for SymphoniaCodec {
    fn decode(&self, data: &[u8], format_hint: Option<&str>) -> Result<AudioSegment, CodecError> {
        self.decode_to_pcm(data, format_hint)
    }

    fn encode(
        &self,
        segment: &AudioSegment,
        config: &EncodeConfig,
    ) -> Result<EncodedAudio, CodecError> {
        let audio_data = match config.format {
            AudioFormat::Wav => encode_wav(segment),
            AudioFormat::Opus => self.encode_opus(segment, config.bitrate)?,
        };

        tracing::debug!(
            format = %config.format,
            duration_ms = segment.duration_ms(),
            size = audio_data.len(),
            "Audio encoded"
        );

        Ok(EncodedAudio {
            audio_data,
            format: config.format,
            duration_ms: segment.duration_ms(),
            sample_rate: segment.spec().sample_rate,
            channels: segment.spec().channels,
        })
    }

    fn supports_format(&self, format: AudioFormat) -> bool {
        match format {
            AudioFormat::Wav => true,
            AudioFormat::Opus => true,
        }
    }
}

/// 解码失败的包占比超过该比例时视为损坏
const MAX_FAILED_PACKET_RATIO: f64 = 0.05;

/// 开启 gapless，裁掉 MP3 编码器延迟与末尾补零
fn format_options() -> FormatOptions {
    FormatOptions {
        enable_gapless: true,
        ..Default::default()
    }
}

/// 少量坏包可跳过；坏包过多或全部失败时报错，避免静默截短语音
fn check_packet_failures(failed: usize, total: usize) -> Result<(), CodecError> {
    if failed == 0 {
        return Ok(());
    }
    if failed == total || failed as f64 > total as f64 * MAX_FAILED_PACKET_RATIO {
        return Err(CodecError::DecodingError(format!(
            "{} of {} packets failed to decode",
            failed, total
        )));
    }
    Ok(())
}

#[inline]
fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0) as i16
}

/// 将 PCM f32 样本编码为 16 位 WAV
pub fn encode_wav(segment: &AudioSegment) -> Vec<u8> {
    let spec = segment.spec();
    let bits_per_sample: u16 = 16;
    let num_channels = spec.channels.max(1) as u16;
    let sample_rate = spec.sample_rate;
    let byte_rate = sample_rate * num_channels as u32 * (bits_per_sample / 8) as u32;
    let block_align = num_channels * (bits_per_sample / 8);

    let data_size = segment.samples().len() * 2;
    let file_size = 36 + data_size;

    let mut wav = Vec::with_capacity(44 + data_size);

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(file_size as u32).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    wav.extend_from_slice(&num_channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&(data_size as u32).to_le_bytes());

    for &sample in segment.samples() {
        wav.extend_from_slice(&to_i16(sample).to_le_bytes());
    }

    wav
}

/// 获取 Opus 兼容的采样率
fn opus_compatible_sample_rate(sample_rate: u32) -> u32 {
    match sample_rate {
        8000 | 12000 | 16000 | 24000 | 48000 => sample_rate,
        r if r <= 8000 => 8000,
        r if r <= 12000 => 12000,
        r if r <= 16000 => 16000,
        r if r <= 24000 => 24000,
        _ => 48000,
    }
}

/// 创建 Opus Head 包 (RFC 7845)
fn create_opus_head(channels: u8, sample_rate: u32, pre_skip: u16) -> Vec<u8> {
    let mut head = Vec::with_capacity(19);
    head.extend_from_slice(b"OpusHead");
    head.push(1); // Version
    head.push(channels);
    head.extend_from_slice(&pre_skip.to_le_bytes());
    head.extend_from_slice(&sample_rate.to_le_bytes()); // Input sample rate
    head.extend_from_slice(&0i16.to_le_bytes()); // Output gain
    head.push(0); // Channel mapping family
    head
}

/// 创建 Opus Tags 包
fn create_opus_tags() -> Vec<u8> {
    let vendor = "pagecast";
    let mut tags = Vec::new();
    tags.extend_from_slice(b"OpusTags");
    tags.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    tags.extend_from_slice(vendor.as_bytes());
    tags.extend_from_slice(&0u32.to_le_bytes()); // No user comments
    tags
}

/// 读取 Ogg Opus 流的 pre-skip 与末页 granule position（均为 48kHz 样本）
#[cfg(test)]
pub(crate) fn opus_stream_bounds(data: &[u8]) -> (u64, u64) {
    let mut reader = ogg::reading::PacketReader::new(Cursor::new(data.to_vec()));
    let mut pre_skip = None;
    let mut end_granule = 0;

    while let Some(packet) = reader.read_packet().unwrap() {
        if pre_skip.is_none() {
            assert_eq!(&packet.data[..8], b"OpusHead");
            pre_skip = Some(u16::from_le_bytes([packet.data[10], packet.data[11]]) as u64);
        }
        if packet.last_in_stream() {
            end_granule = packet.absgp_page();
        }
    }

    (pre_skip.unwrap(), end_granule)
}
