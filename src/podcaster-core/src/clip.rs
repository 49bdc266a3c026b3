//! In-memory audio clips.
//!
//! A [`Clip`] holds decoded waveform data as one `f32` plane per channel,
//! plus the sample rate. Clips are decoded once from disk and never written
//! back to their source file.

use std::path::Path;

use crate::error::PodcastError;

/// A decoded audio waveform.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// One sample plane per channel, all the same length.
    pub channels: Vec<Vec<f32>>,
}

impl Clip {
    /// Create a clip from per-channel sample planes.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Decode a WAV file into `f32` planes.
    ///
    /// Integer formats are normalized into [-1.0, 1.0] by 2^(bits-1);
    /// float samples are taken verbatim.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PodcastError> {
        let mut reader = hound::WavReader::open(path.as_ref())?;
        let spec = reader.spec();

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => {
                reader.samples::<f32>().collect::<Result<_, _>>()?
            }
            hound::SampleFormat::Int => {
                let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()?
            }
        };

        let channel_count = spec.channels as usize;
        let frames = interleaved.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in interleaved.chunks_exact(channel_count) {
            for (plane, &sample) in channels.iter_mut().zip(frame) {
                plane.push(sample);
            }
        }

        Ok(Self {
            sample_rate: spec.sample_rate,
            channels,
        })
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    /// Number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Widen the clip to `target` channels by duplicating the mono plane.
    ///
    /// A clip that already has `target` or more channels is returned
    /// unchanged. Narrowing is never performed.
    pub fn widen_to(mut self, target: usize) -> Self {
        if self.channels.len() == 1 && target > 1 {
            let plane = self.channels[0].clone();
            self.channels.resize(target, plane);
        }
        self
    }

    /// Mix another clip into this one, sample-wise.
    ///
    /// Both clips are zero-padded to the longer length. A mono clip mixed
    /// with a stereo one is widened first. Summed samples are left
    /// unclamped. Both clips must share a sample rate; the caller enforces
    /// this before mixing.
    pub fn overlay(self, other: Clip) -> Clip {
        let target_channels = self.channel_count().max(other.channel_count());
        let mut base = self.widen_to(target_channels);
        let other = other.widen_to(target_channels);

        let frames = base.frames().max(other.frames());
        for (plane, other_plane) in base.channels.iter_mut().zip(&other.channels) {
            plane.resize(frames, 0.0);
            for (sample, &addend) in plane.iter_mut().zip(other_plane) {
                *sample += addend;
            }
        }
        base
    }

    /// Append another clip's samples after this one's, with zero gap.
    ///
    /// Channel layouts are reconciled by widening the narrower side.
    pub fn append(self, other: Clip) -> Clip {
        let target_channels = self.channel_count().max(other.channel_count());
        let mut base = self.widen_to(target_channels);
        let other = other.widen_to(target_channels);

        for (plane, other_plane) in base.channels.iter_mut().zip(&other.channels) {
            plane.extend_from_slice(other_plane);
        }
        base
    }

    /// Write the clip as a 32-bit float WAV file.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), PodcastError> {
        let spec = hound::WavSpec {
            channels: self.channel_count() as u16,
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };

        let mut writer = hound::WavWriter::create(path.as_ref(), spec)?;
        for i in 0..self.frames() {
            for plane in &self.channels {
                writer.write_sample(plane[i])?;
            }
        }
        writer.finalize()?;
        Ok(())
    }
}
