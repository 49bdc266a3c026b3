//! Speech synthesis for transcript items using kokoro-tiny.

use kokoro_tiny::TtsEngine;
use std::path::{Path, PathBuf};

use crate::error::PodcastError;
use crate::transcript::{Transcript, TranscriptItem};

/// Output sample rate of the kokoro engine.
pub const SYNTHESIS_SAMPLE_RATE: u32 = 24_000;

/// Kokoro has a strict limit on input text length.
const MAX_CHUNK_CHARS: usize = 200;
/// Silence inserted between synthesized chunks (0.3 seconds at 24 kHz).
const CHUNK_PAUSE_SAMPLES: usize = 7_200;
/// Silence appended after each utterance (0.5 seconds at 24 kHz).
const TRAILING_PAUSE_SAMPLES: usize = 12_000;

/// File name for a rendered clip: the item's playback order, a delimiter,
/// and the speaker id.
pub fn clip_file_name(order: u32, speaker_id: &str) -> String {
    format!("{}-{}.wav", order, speaker_id)
}

/// Renders transcript speech items to clip files.
pub struct SpeechSynthesizer {
    engine: TtsEngine,
    available_voices: Vec<String>,
}

impl SpeechSynthesizer {
    /// Initialize the TTS engine (downloads model on first run).
    pub async fn new() -> Result<Self, PodcastError> {
        let engine = TtsEngine::new()
            .await
            .map_err(|e| PodcastError::TtsError(format!("Failed to initialize TTS: {}", e)))?;

        let available_voices = engine.voices();

        Ok(Self {
            engine,
            available_voices,
        })
    }

    /// Get list of available voice IDs.
    pub fn available_voices(&self) -> &[String] {
        &self.available_voices
    }

    /// Validate that a voice ID exists.
    pub fn validate_voice(&self, voice_id: &str) -> Result<(), PodcastError> {
        if voice_id.is_empty() {
            return Err(PodcastError::TtsError(format!(
                "Voice ID cannot be empty. Available voices:\n{}",
                self.format_available_voices()
            )));
        }

        if !self.available_voices.contains(&voice_id.to_string()) {
            return Err(PodcastError::TtsError(format!(
                "Unknown voice '{}'. Available voices:\n{}",
                voice_id,
                self.format_available_voices()
            )));
        }

        Ok(())
    }

    /// Format available voices for display.
    fn format_available_voices(&self) -> String {
        let mut english_voices: Vec<&String> = self
            .available_voices
            .iter()
            .filter(|v| {
                v.starts_with("af_")
                    || v.starts_with("am_")
                    || v.starts_with("bf_")
                    || v.starts_with("bm_")
            })
            .collect();
        english_voices.sort();

        english_voices
            .iter()
            .map(|v| format!("  - {}", v))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Validate the voices of every host in a transcript.
    pub fn validate_hosts(&self, transcript: &Transcript) -> Result<(), PodcastError> {
        for host in &transcript.hosts {
            self.validate_voice(&host.voice)?;
        }
        Ok(())
    }

    /// Render one transcript item to a clip file under `clips_dir`.
    ///
    /// Returns the clip path for speech items. Music themes are not
    /// synthesized; their clips are provisioned separately under the same
    /// naming convention.
    pub async fn render_item(
        &mut self,
        transcript: &Transcript,
        item: &TranscriptItem,
        clips_dir: &Path,
    ) -> Result<Option<PathBuf>, PodcastError> {
        let TranscriptItem::Speech {
            order,
            speaker_id,
            content,
        } = item
        else {
            return Ok(None);
        };

        let host = transcript
            .host(speaker_id)
            .ok_or_else(|| PodcastError::UnknownHost(speaker_id.clone()))?;
        let voice = host.voice.clone();
        let samples = self.synthesize(content, &voice)?;

        tokio::fs::create_dir_all(clips_dir).await?;
        let path = clips_dir.join(clip_file_name(*order, speaker_id));
        let path_str = path
            .to_str()
            .ok_or_else(|| PodcastError::TtsError("clip path is not valid UTF-8".to_string()))?;
        self.engine
            .save_wav(path_str, &samples)
            .map_err(|e| PodcastError::TtsError(format!("Failed to save WAV: {}", e)))?;

        Ok(Some(path))
    }

    /// Synthesize text in chunks to stay under the engine's text limit.
    pub fn synthesize(&mut self, text: &str, voice_id: &str) -> Result<Vec<f32>, PodcastError> {
        self.validate_voice(voice_id)?;

        let mut samples = Vec::new();
        for chunk in split_into_chunks(text, MAX_CHUNK_CHARS) {
            let chunk_samples = self
                .engine
                .synthesize(&chunk, Some(voice_id))
                .map_err(|e| PodcastError::TtsError(format!("Synthesis failed: {}", e)))?;
            samples.extend(chunk_samples);

            // pause between chunks so sentences do not run together
            samples.resize(samples.len() + CHUNK_PAUSE_SAMPLES, 0.0);
        }

        // trailing padding so the end of the utterance is not cut off
        samples.resize(samples.len() + TRAILING_PAUSE_SAMPLES, 0.0);

        Ok(samples)
    }
}

/// Split text into chunks short enough for the synthesis engine,
/// preferring sentence boundaries and falling back to commas.
fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for piece in split_pieces(text, max_chars) {
        if !current.is_empty() && current.len() + piece.len() + 1 > max_chars {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&piece);
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Sentences of `text`, with any sentence longer than `max_chars` further
/// split on commas.
fn split_pieces(text: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();

    for sentence in text.split_inclusive(['.', '!', '?', ';']) {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }
        if sentence.len() > max_chars {
            pieces.extend(
                sentence
                    .split_inclusive(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(str::to_string),
            );
        } else {
            pieces.push(sentence.to_string());
        }
    }

    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_file_name_encodes_order_and_speaker() {
        assert_eq!(clip_file_name(0, "jane"), "0-jane.wav");
        assert_eq!(clip_file_name(12, "john"), "12-john.wav");
    }

    #[test]
    fn test_split_into_chunks_respects_limit() {
        let text = "Hello world. This is a test. Another sentence here.";
        let chunks = split_into_chunks(text, 30);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.len() <= 35); // short sentences may join with a space
        }
    }

    #[test]
    fn test_split_into_chunks_packs_short_sentences() {
        let text = "One. Two. Three.";
        let chunks = split_into_chunks(text, 200);
        assert_eq!(chunks, vec!["One. Two. Three."]);
    }

    #[test]
    fn test_split_into_chunks_falls_back_to_commas() {
        let long_sentence = format!("{}, {}, {}.", "a".repeat(40), "b".repeat(40), "c".repeat(40));
        let chunks = split_into_chunks(&long_sentence, 50);
        assert!(chunks.len() >= 3);
        for chunk in &chunks {
            assert!(chunk.len() <= 50);
        }
    }

    #[test]
    fn test_split_into_chunks_skips_blank_input() {
        assert!(split_into_chunks("   ", 200).is_empty());
    }
}
