//! Track decoding (Symphonia)
//!
//! Whole tracks are decoded into memory as stereo frames at their native
//! sample rate. The output callback then plays them at any rate without
//! touching the disk.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::error::{AudioError, AudioResult};
use crate::types::StereoSample;

/// A fully decoded track
#[derive(Debug, Clone)]
pub struct DecodedTrack {
    /// Stereo frames; one frame is one tick
    pub frames: Arc<[StereoSample]>,
    /// Native sample rate of the frames
    pub sample_rate: u32,
}

impl DecodedTrack {
    pub fn len(&self) -> u64 {
        self.frames.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Fold interleaved samples into stereo frames
///
/// Mono is duplicated to both sides; anything wider keeps its first two
/// channels.
pub fn interleaved_to_stereo(samples: &[f32], channels: usize, out: &mut Vec<StereoSample>) {
    match channels {
        0 => {}
        1 => out.extend(samples.iter().map(|&s| StereoSample::mono(s))),
        _ => out.extend(
            samples
                .chunks_exact(channels)
                .map(|frame| StereoSample::new(frame[0], frame[1])),
        ),
    }
}

/// Decode an audio file to stereo frames
pub fn decode_file(path: &Path) -> AudioResult<DecodedTrack> {
    let file = File::open(path).map_err(|e| AudioError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::UnsupportedFormat("No audio track found".to_string()))?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AudioError::UnsupportedFormat("Unknown sample rate".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))?;

    let mut frames: Vec<StereoSample> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                log::warn!("decode_file: error reading packet: {}", e);
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                log::warn!("decode_file: skipping bad packet: {}", e);
                continue;
            }
            Err(e) => return Err(AudioError::DecodeError(e.to_string())),
        };

        let spec = *decoded.spec();
        let needed = decoded.capacity();
        // SampleBuffer capacity counts samples across all channels
        if sample_buf
            .as_ref()
            .map_or(true, |b| b.capacity() < needed * spec.channels.count())
        {
            sample_buf = Some(SampleBuffer::new(needed as u64, spec));
        }

        if let Some(buf) = sample_buf.as_mut() {
            buf.copy_interleaved_ref(decoded);
            interleaved_to_stereo(buf.samples(), spec.channels.count(), &mut frames);
        }
    }

    if frames.is_empty() {
        return Err(AudioError::DecodeError(format!(
            "{} contains no audio",
            path.display()
        )));
    }

    log::info!(
        "decode_file: {} frames at {}Hz from {:?}",
        frames.len(),
        sample_rate,
        path
    );

    Ok(DecodedTrack {
        frames: frames.into(),
        sample_rate,
    })
}
