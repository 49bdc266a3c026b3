//! Clip stitching engine.
//!
//! Assembles a directory of per-utterance clips into one podcast waveform.
//! Clip files are named `<order>-<label>.wav`. Clips sharing an order key
//! play simultaneously and are mixed together; groups play one after
//! another in ascending numeric order. The order key is the only sequencing
//! information — directory listing order is irrelevant.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;

use crate::clip::Clip;
use crate::error::PodcastError;

/// What to do when overlay summation leaves the [-1.0, 1.0] range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Keep summed samples as-is, even outside the valid range.
    #[default]
    Allow,
    /// Clamp every sample to [-1.0, 1.0].
    Clamp,
    /// Rescale the whole waveform by 1/peak when the peak exceeds 1.0.
    Normalize,
}

/// A stitching strategy: turns a directory of clips into one audio file.
///
/// Implementations differ in how they represent and combine waveforms but
/// share the same entry point and clip naming convention.
#[async_trait]
pub trait ClipStitcher: Send + Sync {
    /// Short name this strategy is selected by.
    fn name(&self) -> &'static str;

    /// Stitch every clip under `input_dir` into
    /// `output_dir/output_file_name`, creating `output_dir` if needed and
    /// overwriting any existing file at the destination.
    async fn stitch(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        output_file_name: &str,
    ) -> Result<(), PodcastError>;
}

/// Look up a stitching strategy by name.
pub fn get_stitcher(name: &str, overflow: OverflowPolicy) -> Option<Box<dyn ClipStitcher>> {
    match name.to_lowercase().as_str() {
        "samples" => Some(Box::new(SampleStitcher::new(overflow))),
        "segments" => Some(Box::new(SegmentStitcher::new(overflow))),
        "frames" => Some(Box::new(FrameStitcher)),
        _ => None,
    }
}

/// List all available stitching strategy names.
pub fn available_stitchers() -> Vec<&'static str> {
    vec!["samples", "segments", "frames"]
}

/// Parse the numeric order prefix of a clip file name.
///
/// The prefix is the stem text before the first `-`; a stem with no
/// delimiter is taken whole.
fn parse_order(path: &Path) -> Result<u32, PodcastError> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let prefix = stem.split_once('-').map_or(stem, |(prefix, _)| prefix);
    prefix
        .parse::<u32>()
        .map_err(|_| PodcastError::InvalidClipName(display_name(path)))
}

/// Discover clip files under `input_dir` and group them by order key.
///
/// Only `.wav` files are considered. Members of each group are sorted by
/// file name so mixing order is deterministic regardless of how the
/// directory happens to be listed.
fn collect_clip_groups(input_dir: &Path) -> Result<BTreeMap<u32, Vec<PathBuf>>, PodcastError> {
    let mut groups: BTreeMap<u32, Vec<PathBuf>> = BTreeMap::new();

    for entry in fs::read_dir(input_dir)? {
        let path = entry?.path();
        let is_wav = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
        if !path.is_file() || !is_wav {
            continue;
        }
        groups.entry(parse_order(&path)?).or_default().push(path);
    }

    if groups.is_empty() {
        return Err(PodcastError::NoClipsFound(input_dir.to_path_buf()));
    }

    for members in groups.values_mut() {
        members.sort();
    }
    Ok(groups)
}

/// Enforce the one-sample-rate-per-run invariant. The first decoded clip
/// fixes the rate; no resampling is ever performed.
fn check_sample_rate(
    expected: &mut Option<u32>,
    clip: &Clip,
    path: &Path,
) -> Result<(), PodcastError> {
    match *expected {
        None => {
            *expected = Some(clip.sample_rate);
            Ok(())
        }
        Some(rate) if rate == clip.sample_rate => Ok(()),
        Some(rate) => Err(PodcastError::SampleRateMismatch {
            file: display_name(path),
            expected: rate,
            actual: clip.sample_rate,
        }),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}

fn apply_overflow(composite: &mut Clip, policy: OverflowPolicy) {
    match policy {
        OverflowPolicy::Allow => {}
        OverflowPolicy::Clamp => {
            for plane in &mut composite.channels {
                for sample in plane.iter_mut() {
                    *sample = sample.clamp(-1.0, 1.0);
                }
            }
        }
        OverflowPolicy::Normalize => {
            let peak = composite
                .channels
                .iter()
                .flatten()
                .fold(0.0_f32, |peak, sample| peak.max(sample.abs()));
            if peak > 1.0 {
                let gain = 1.0 / peak;
                for plane in &mut composite.channels {
                    for sample in plane.iter_mut() {
                        *sample *= gain;
                    }
                }
            }
        }
    }
}

/// Duplicate a lone mono plane up to `target` channels.
fn widen_planes(planes: &mut Vec<Vec<f32>>, target: usize) {
    if planes.len() == 1 && target > 1 {
        let plane = planes[0].clone();
        planes.resize(target, plane);
    }
}

/// Numeric-buffer stitcher (the default strategy).
///
/// Works directly on per-channel sample planes: every group member is
/// zero-padded to the group's longest clip and summed per channel, then
/// group waveforms are concatenated in ascending order. Mono clips that
/// meet stereo material are widened by duplicating their plane.
pub struct SampleStitcher {
    overflow: OverflowPolicy,
}

impl SampleStitcher {
    pub fn new(overflow: OverflowPolicy) -> Self {
        Self { overflow }
    }
}

#[async_trait]
impl ClipStitcher for SampleStitcher {
    fn name(&self) -> &'static str {
        "samples"
    }

    async fn stitch(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        output_file_name: &str,
    ) -> Result<(), PodcastError> {
        let groups = collect_clip_groups(input_dir)?;

        let mut sample_rate = None;
        let mut planes: Vec<Vec<f32>> = Vec::new();

        for members in groups.values() {
            let mut group_planes: Vec<Vec<f32>> = Vec::new();
            let mut group_frames = 0;

            for path in members {
                let clip = Clip::load(path)?;
                check_sample_rate(&mut sample_rate, &clip, path)?;

                let source_channels = clip.channel_count();
                while group_planes.len() < source_channels {
                    // the running mix so far is mono: duplicate it
                    let widened = group_planes.first().cloned().unwrap_or_default();
                    group_planes.push(widened);
                }

                group_frames = group_frames.max(clip.frames());
                for (index, plane) in group_planes.iter_mut().enumerate() {
                    plane.resize(group_frames, 0.0);
                    // a mono clip feeds every output channel
                    let source = &clip.channels[index % source_channels];
                    for (sample, &addend) in plane.iter_mut().zip(source) {
                        *sample += addend;
                    }
                }
            }

            let channel_count = planes.len().max(group_planes.len());
            widen_planes(&mut planes, channel_count);
            widen_planes(&mut group_planes, channel_count);

            if planes.is_empty() {
                planes = group_planes;
            } else {
                for (plane, group_plane) in planes.iter_mut().zip(&group_planes) {
                    plane.extend_from_slice(group_plane);
                }
            }
        }

        let sample_rate =
            sample_rate.ok_or_else(|| PodcastError::NoClipsFound(input_dir.to_path_buf()))?;
        let mut composite = Clip::new(sample_rate, planes);
        apply_overflow(&mut composite, self.overflow);

        fs::create_dir_all(output_dir)?;
        composite.write(output_dir.join(output_file_name))?;
        Ok(())
    }
}

/// Segment-combinator stitcher.
///
/// Expresses the same overlay and concatenation semantics through the
/// [`Clip::overlay`] and [`Clip::append`] combinators.
pub struct SegmentStitcher {
    overflow: OverflowPolicy,
}

impl SegmentStitcher {
    pub fn new(overflow: OverflowPolicy) -> Self {
        Self { overflow }
    }
}

#[async_trait]
impl ClipStitcher for SegmentStitcher {
    fn name(&self) -> &'static str {
        "segments"
    }

    async fn stitch(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        output_file_name: &str,
    ) -> Result<(), PodcastError> {
        let groups = collect_clip_groups(input_dir)?;

        let mut sample_rate = None;
        let mut composite: Option<Clip> = None;

        for members in groups.values() {
            let mut mixed: Option<Clip> = None;
            for path in members {
                let clip = Clip::load(path)?;
                check_sample_rate(&mut sample_rate, &clip, path)?;
                mixed = Some(match mixed {
                    None => clip,
                    Some(mix) => mix.overlay(clip),
                });
            }
            if let Some(mixed) = mixed {
                composite = Some(match composite {
                    None => mixed,
                    Some(built) => built.append(mixed),
                });
            }
        }

        let mut composite =
            composite.ok_or_else(|| PodcastError::NoClipsFound(input_dir.to_path_buf()))?;
        apply_overflow(&mut composite, self.overflow);

        fs::create_dir_all(output_dir)?;
        composite.write(output_dir.join(output_file_name))?;
        Ok(())
    }
}

/// Raw-frame stitcher.
///
/// Copies every clip's frames verbatim into the output in ascending group
/// order, one clip after another, without mixing clips that share an order
/// key. Frames are never re-encoded, so every clip must match the first
/// clip's format exactly.
pub struct FrameStitcher;

#[async_trait]
impl ClipStitcher for FrameStitcher {
    fn name(&self) -> &'static str {
        "frames"
    }

    async fn stitch(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        output_file_name: &str,
    ) -> Result<(), PodcastError> {
        let groups = collect_clip_groups(input_dir)?;

        // Validate every clip header before the destination file exists, so
        // a bad clip can never leave a partial output behind.
        let mut expected: Option<hound::WavSpec> = None;
        for path in groups.values().flatten() {
            let reader = hound::WavReader::open(path)?;
            let spec = reader.spec();
            match expected {
                None => expected = Some(spec),
                Some(first) => {
                    if spec.sample_rate != first.sample_rate {
                        return Err(PodcastError::SampleRateMismatch {
                            file: display_name(path),
                            expected: first.sample_rate,
                            actual: spec.sample_rate,
                        });
                    }
                    if spec.channels != first.channels {
                        return Err(PodcastError::ChannelLayoutMismatch {
                            file: display_name(path),
                            expected: first.channels,
                            actual: spec.channels,
                        });
                    }
                    if spec.bits_per_sample != first.bits_per_sample
                        || spec.sample_format != first.sample_format
                    {
                        return Err(PodcastError::ClipFormatMismatch(display_name(path)));
                    }
                }
            }
        }
        let spec = expected.ok_or_else(|| PodcastError::NoClipsFound(input_dir.to_path_buf()))?;

        fs::create_dir_all(output_dir)?;
        let mut writer = hound::WavWriter::create(output_dir.join(output_file_name), spec)?;
        for path in groups.values().flatten() {
            let mut reader = hound::WavReader::open(path)?;
            match spec.sample_format {
                hound::SampleFormat::Float => {
                    for sample in reader.samples::<f32>() {
                        writer.write_sample(sample?)?;
                    }
                }
                hound::SampleFormat::Int => {
                    for sample in reader.samples::<i32>() {
                        writer.write_sample(sample?)?;
                    }
                }
            }
        }
        writer.finalize()?;
        Ok(())
    }
}
