//! Podcaster Core Library
//!
//! Provides transcript generation, speech synthesis, and the clip
//! stitching engine that assembles finished podcast audio.

pub mod clip;
pub mod config;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod sources;
pub mod stitcher;
pub mod store;
pub mod synthesis;
pub mod transcript;

pub use clip::Clip;
pub use config::{Config, default_config};
pub use error::PodcastError;
pub use generator::{GeneratorConfig, TranscriptGenerator};
pub use pipeline::{OutputPaths, PodcastEvent, PodcastPipeline};
pub use sources::Source;
pub use stitcher::{ClipStitcher, OverflowPolicy, available_stitchers, get_stitcher};
pub use store::TranscriptStore;
pub use synthesis::SpeechSynthesizer;
pub use transcript::{Host, Transcript, TranscriptItem};
