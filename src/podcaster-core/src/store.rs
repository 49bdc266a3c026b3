//! Transcript persistence.
//!
//! Transcripts are stored as pretty-printed JSON files named after the
//! episode title, one file per episode.

use std::path::{Path, PathBuf};

use crate::error::PodcastError;
use crate::transcript::Transcript;

/// Filesystem-backed transcript storage.
pub struct TranscriptStore {
    directory: PathBuf,
}

impl TranscriptStore {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    /// List stored transcript file names.
    pub async fn list(&self) -> Result<Vec<String>, PodcastError> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.directory).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_json = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("json"));
            if is_json {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Write a transcript, creating the directory if needed. Returns the
    /// path written.
    pub async fn write(&self, transcript: &Transcript) -> Result<PathBuf, PodcastError> {
        tokio::fs::create_dir_all(&self.directory).await?;

        let json = serde_json::to_string_pretty(transcript)
            .map_err(|e| PodcastError::TranscriptError(format!("serialization failed: {}", e)))?;

        let path = self
            .directory
            .join(format!("{}.json", transcript.file_stem()));
        tokio::fs::write(&path, json).await?;
        Ok(path)
    }

    /// Load a transcript by stored file name.
    pub async fn load(&self, name: &str) -> Result<Transcript, PodcastError> {
        let content = tokio::fs::read_to_string(self.directory.join(name)).await?;
        serde_json::from_str(&content)
            .map_err(|e| PodcastError::TranscriptError(format!("invalid transcript JSON: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{Host, TranscriptItem};

    fn sample_transcript() -> Transcript {
        Transcript {
            title: "Deep Dive".to_string(),
            hosts: vec![Host {
                id: "jane".to_string(),
                name: "Jane Doe".to_string(),
                voice: "af_sky".to_string(),
            }],
            items: vec![TranscriptItem::Speech {
                order: 0,
                speaker_id: "jane".to_string(),
                content: "Hello.".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_write_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path().join("transcripts"));

        let path = store.write(&sample_transcript()).await.unwrap();
        assert_eq!(path.file_name().unwrap(), "Deep_Dive.json");

        let loaded = store.load("Deep_Dive.json").await.unwrap();
        assert_eq!(loaded.title, "Deep Dive");
        assert_eq!(loaded.items.len(), 1);
    }

    #[tokio::test]
    async fn test_list_returns_only_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = TranscriptStore::new(dir.path());
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        store.write(&sample_transcript()).await.unwrap();

        let names = store.list().await.unwrap();
        assert_eq!(names, vec!["Deep_Dive.json"]);
    }
}
