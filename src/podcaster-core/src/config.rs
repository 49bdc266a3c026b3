//! Configuration module for loading TOML config files.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::PodcastError;
use crate::sources::Source;
use crate::stitcher::OverflowPolicy;
use crate::transcript::Host;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub hosts: Vec<Host>,
    pub prompts: PromptsConfig,
    #[serde(default)]
    pub stitcher: StitcherConfig,
}

/// Prompt templates.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptsConfig {
    /// Template for the transcript generation prompt. Supports the
    /// `{hosts}`, `{sources}` and `{outline}` placeholders.
    pub transcript_prompt: String,
}

/// Stitching engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StitcherConfig {
    /// Strategy name, resolved through `stitcher::get_stitcher`.
    #[serde(default = "default_strategy")]
    pub strategy: String,
    #[serde(default)]
    pub overflow: OverflowPolicy,
}

impl Default for StitcherConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            overflow: OverflowPolicy::default(),
        }
    }
}

fn default_strategy() -> String {
    "samples".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PodcastError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| PodcastError::ConfigError(format!("Failed to read config: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| PodcastError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Load configuration from string content.
    pub fn from_str(content: &str) -> Result<Self, PodcastError> {
        toml::from_str(content)
            .map_err(|e| PodcastError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Render the transcript generation prompt, with placeholders replaced.
    pub fn render_transcript_prompt(&self, sources: &[Source], outline: &Source) -> String {
        let hosts = self
            .hosts
            .iter()
            .map(|host| format!("- {} (id: {}, voice: {})", host.name, host.id, host.voice))
            .collect::<Vec<_>>()
            .join("\n");

        let sources = sources
            .iter()
            .map(|source| source.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n---\n\n");

        self.prompts
            .transcript_prompt
            .replace("{hosts}", &hosts)
            .replace("{sources}", &sources)
            .replace("{outline}", &outline.text)
    }
}

/// Default configuration embedded in the binary.
pub fn default_config() -> Config {
    Config {
        hosts: vec![
            Host {
                id: "jane".to_string(),
                name: "Jane Doe".to_string(),
                voice: "bf_emma".to_string(),
            },
            Host {
                id: "john".to_string(),
                name: "John Smith".to_string(),
                voice: "bm_george".to_string(),
            },
        ],
        prompts: PromptsConfig {
            transcript_prompt: DEFAULT_TRANSCRIPT_PROMPT.to_string(),
        },
        stitcher: StitcherConfig::default(),
    }
}

const DEFAULT_TRANSCRIPT_PROMPT: &str = r#"You are writing the full transcript of a podcast episode.

HOSTS:
{hosts}

EPISODE OUTLINE:
{outline}

SOURCE MATERIAL:
{sources}

TRANSCRIPT RULES:
- Follow the outline section by section, drawing facts only from the source material
- Write natural conversational dialogue between the hosts - questions, reactions, handoffs
- Every host should contribute; avoid long monologues
- Give items the same order number ONLY when they genuinely speak at the same time (brief interjections, talking over each other)
- Otherwise order numbers increase by one per item
- Use EXACTLY the hosts listed above, with their ids unchanged

CRITICAL OUTPUT RULES:
- Output ONLY a single JSON object - no prose before or after, no markdown code fences
- The JSON must have this shape:
  {
    "title": "Episode title",
    "hosts": [{"id": "jane", "name": "Jane Doe", "voice": "bf_emma"}],
    "items": [
      {"type": "speech", "order": 0, "speaker_id": "jane", "content": "Spoken words only."},
      {"type": "music_theme", "order": 1, "theme": "intro"}
    ]
  }
- "speaker_id" must be the id of one of the hosts
- "content" is spoken words only - no stage directions, no sound effects, no asterisks
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_placeholders() {
        let config = default_config();
        assert!(config.prompts.transcript_prompt.contains("{hosts}"));
        assert!(config.prompts.transcript_prompt.contains("{outline}"));
        assert!(config.prompts.transcript_prompt.contains("{sources}"));
    }

    #[test]
    fn test_render_transcript_prompt_replaces_placeholders() {
        let config = default_config();
        let sources = vec![Source {
            text: "Article body.".to_string(),
            path: "article.txt".into(),
        }];
        let outline = Source {
            text: "1. Intro\n2. Wrap-up".to_string(),
            path: "outline.txt".into(),
        };

        let prompt = config.render_transcript_prompt(&sources, &outline);
        assert!(prompt.contains("Jane Doe (id: jane, voice: bf_emma)"));
        assert!(prompt.contains("Article body."));
        assert!(prompt.contains("1. Intro"));
        assert!(!prompt.contains("{hosts}"));
        assert!(!prompt.contains("{sources}"));
        assert!(!prompt.contains("{outline}"));
    }

    #[test]
    fn test_parse_config_from_toml() {
        let config = Config::from_str(
            r#"
            [[hosts]]
            id = "ada"
            name = "Ada"
            voice = "af_sky"

            [prompts]
            transcript_prompt = "{outline}"

            [stitcher]
            strategy = "segments"
            overflow = "clamp"
            "#,
        )
        .unwrap();

        assert_eq!(config.hosts.len(), 1);
        assert_eq!(config.stitcher.strategy, "segments");
        assert_eq!(config.stitcher.overflow, OverflowPolicy::Clamp);
    }

    #[test]
    fn test_stitcher_section_is_optional() {
        let config = Config::from_str(
            r#"
            [[hosts]]
            id = "ada"
            name = "Ada"
            voice = "af_sky"

            [prompts]
            transcript_prompt = "{outline}"
            "#,
        )
        .unwrap();

        assert_eq!(config.stitcher.strategy, "samples");
        assert_eq!(config.stitcher.overflow, OverflowPolicy::Allow);
    }
}
