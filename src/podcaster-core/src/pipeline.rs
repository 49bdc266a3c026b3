//! Episode pipeline.
//!
//! Drives one episode end to end: generate the transcript, persist it,
//! render speech clips, and stitch the clips into the finished podcast
//! file.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::PodcastError;
use crate::generator::TranscriptGenerator;
use crate::sources::Source;
use crate::stitcher::ClipStitcher;
use crate::store::TranscriptStore;
use crate::synthesis::SpeechSynthesizer;
use crate::transcript::{Transcript, TranscriptItem};

/// Where pipeline artifacts land, all under one root.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    /// Transcript JSON files.
    pub transcripts: PathBuf,
    /// Per-episode clip directories.
    pub clips: PathBuf,
    /// Finished podcast files.
    pub podcasts: PathBuf,
}

impl OutputPaths {
    /// Standard layout under a single root directory.
    pub fn under<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        Self {
            transcripts: root.join("transcripts"),
            clips: root.join("clips"),
            podcasts: root.join("podcasts"),
        }
    }
}

/// Callback for pipeline events.
pub type PodcastCallback = Box<dyn Fn(PodcastEvent) + Send + Sync>;

/// Events emitted while producing an episode.
#[derive(Debug, Clone)]
pub enum PodcastEvent {
    /// Transcript generation is starting.
    TranscriptStart { outline: String },
    /// The transcript has been generated and persisted.
    TranscriptReady { title: String, items: usize },
    /// A speech clip has been rendered.
    ClipRendered { order: u32, speaker: String },
    /// An item was skipped by the synthesis step.
    ItemSkipped { order: u32, reason: String },
    /// Clip stitching is starting.
    StitchStart { strategy: String },
    /// The finished podcast has been written.
    Done { output: PathBuf },
}

/// Produces one podcast episode from an outline and source articles.
pub struct PodcastPipeline {
    config: Config,
    generator: TranscriptGenerator,
    synthesizer: SpeechSynthesizer,
    stitcher: Box<dyn ClipStitcher>,
    store: TranscriptStore,
    output: OutputPaths,
    callback: Option<PodcastCallback>,
}

impl PodcastPipeline {
    pub fn new(
        config: Config,
        generator: TranscriptGenerator,
        synthesizer: SpeechSynthesizer,
        stitcher: Box<dyn ClipStitcher>,
        output: OutputPaths,
    ) -> Self {
        let store = TranscriptStore::new(&output.transcripts);
        Self {
            config,
            generator,
            synthesizer,
            stitcher,
            store,
            output,
            callback: None,
        }
    }

    /// Set a callback for pipeline events.
    pub fn with_callback(mut self, callback: PodcastCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Produce one episode. Returns the path of the finished podcast file.
    pub async fn run(
        &mut self,
        outline: &Source,
        sources: &[Source],
    ) -> Result<PathBuf, PodcastError> {
        self.emit_event(PodcastEvent::TranscriptStart {
            outline: outline.path.display().to_string(),
        });

        let prompt = self.config.render_transcript_prompt(sources, outline);
        let transcript = self.generator.generate(&prompt).await?;
        self.synthesizer.validate_hosts(&transcript)?;
        self.store.write(&transcript).await?;

        self.emit_event(PodcastEvent::TranscriptReady {
            title: transcript.title.clone(),
            items: transcript.items.len(),
        });

        let clips_dir = self.output.clips.join(transcript.file_stem());
        self.render_clips(&transcript, &clips_dir).await?;

        self.emit_event(PodcastEvent::StitchStart {
            strategy: self.stitcher.name().to_string(),
        });

        let file_name = output_file_name(&transcript.title);
        self.stitcher
            .stitch(&clips_dir, &self.output.podcasts, &file_name)
            .await?;

        let output = self.output.podcasts.join(&file_name);
        self.emit_event(PodcastEvent::Done {
            output: output.clone(),
        });
        Ok(output)
    }

    async fn render_clips(
        &mut self,
        transcript: &Transcript,
        clips_dir: &Path,
    ) -> Result<(), PodcastError> {
        for item in &transcript.items {
            match self
                .synthesizer
                .render_item(transcript, item, clips_dir)
                .await?
            {
                Some(_) => {
                    if let TranscriptItem::Speech {
                        order, speaker_id, ..
                    } = item
                    {
                        self.emit_event(PodcastEvent::ClipRendered {
                            order: *order,
                            speaker: speaker_id.clone(),
                        });
                    }
                }
                None => {
                    self.emit_event(PodcastEvent::ItemSkipped {
                        order: item.order(),
                        reason: "not a speech item".to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Emit an event if a callback is registered.
    fn emit_event(&self, event: PodcastEvent) {
        if let Some(ref callback) = self.callback {
            callback(event);
        }
    }
}

/// Generate the output file name for an episode.
pub fn output_file_name(title: &str) -> String {
    // Sanitize the title for use as a file name
    let sanitized: String = title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    // Truncate if too long
    let truncated = if sanitized.len() > 50 {
        &sanitized[..50]
    } else {
        &sanitized
    };

    format!("{}.wav", truncated.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name_sanitizes_title() {
        assert_eq!(
            output_file_name("Should AI be open source?"),
            "Should AI be open source_.wav"
        );
    }

    #[test]
    fn test_output_file_name_truncates_long_titles() {
        let long_title = "A".repeat(100);
        let file_name = output_file_name(&long_title);
        assert!(file_name.len() < 60);
    }

    #[test]
    fn test_output_paths_layout() {
        let paths = OutputPaths::under("out");
        assert_eq!(paths.transcripts, PathBuf::from("out/transcripts"));
        assert_eq!(paths.clips, PathBuf::from("out/clips"));
        assert_eq!(paths.podcasts, PathBuf::from("out/podcasts"));
    }
}
