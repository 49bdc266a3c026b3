//! Podcast transcript model.
//!
//! A transcript is the unit handed from generation to synthesis: an episode
//! title, the hosts, and an ordered list of items. Items sharing an `order`
//! value are meant to play at the same time.

use serde::{Deserialize, Serialize};

use crate::error::PodcastError;

/// A podcast host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    /// Short identifier used in item references and clip file names.
    pub id: String,
    /// Display name.
    pub name: String,
    /// TTS voice ID for this host.
    pub voice: String,
}

/// One item of a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TranscriptItem {
    /// A spoken utterance by one host.
    Speech {
        order: u32,
        speaker_id: String,
        content: String,
    },
    /// A music cue; its audio is provisioned outside the synthesis step.
    MusicTheme { order: u32, theme: String },
}

impl TranscriptItem {
    /// Playback position of this item. Items with equal order play
    /// simultaneously.
    pub fn order(&self) -> u32 {
        match self {
            TranscriptItem::Speech { order, .. } => *order,
            TranscriptItem::MusicTheme { order, .. } => *order,
        }
    }
}

/// A full episode transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub title: String,
    pub hosts: Vec<Host>,
    pub items: Vec<TranscriptItem>,
}

impl Transcript {
    /// Find a host by its id.
    pub fn host(&self, id: &str) -> Option<&Host> {
        self.hosts.iter().find(|host| host.id == id)
    }

    /// Check that every speech item references a known host.
    pub fn validate(&self) -> Result<(), PodcastError> {
        for item in &self.items {
            if let TranscriptItem::Speech { speaker_id, .. } = item {
                if self.host(speaker_id).is_none() {
                    return Err(PodcastError::UnknownHost(speaker_id.clone()));
                }
            }
        }
        Ok(())
    }

    /// Filesystem-safe stem derived from the episode title.
    pub fn file_stem(&self) -> String {
        self.title
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_transcript() -> Transcript {
        Transcript {
            title: "AI & You".to_string(),
            hosts: vec![Host {
                id: "jane".to_string(),
                name: "Jane Doe".to_string(),
                voice: "af_sky".to_string(),
            }],
            items: vec![
                TranscriptItem::Speech {
                    order: 0,
                    speaker_id: "jane".to_string(),
                    content: "Welcome to the show.".to_string(),
                },
                TranscriptItem::MusicTheme {
                    order: 1,
                    theme: "outro".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_item_tag_round_trip() {
        let json = r#"{"type":"speech","order":3,"speaker_id":"john","content":"Hi."}"#;
        let item: TranscriptItem = serde_json::from_str(json).unwrap();
        assert!(matches!(
            &item,
            TranscriptItem::Speech { order: 3, speaker_id, .. } if speaker_id == "john"
        ));

        let theme = r#"{"type":"music_theme","order":0,"theme":"intro"}"#;
        let item: TranscriptItem = serde_json::from_str(theme).unwrap();
        assert_eq!(item.order(), 0);
    }

    #[test]
    fn test_validate_accepts_known_speakers() {
        assert!(sample_transcript().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_speaker() {
        let mut transcript = sample_transcript();
        transcript.items.push(TranscriptItem::Speech {
            order: 2,
            speaker_id: "ghost".to_string(),
            content: "Boo.".to_string(),
        });

        assert!(matches!(
            transcript.validate(),
            Err(PodcastError::UnknownHost(id)) if id == "ghost"
        ));
    }

    #[test]
    fn test_file_stem_replaces_unsafe_characters() {
        assert_eq!(sample_transcript().file_stem(), "AI___You");
    }
}
