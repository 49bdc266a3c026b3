//! Transcript generation through an OpenAI-compatible chat API.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs,
};

use crate::error::PodcastError;
use crate::transcript::Transcript;

const SYSTEM_PROMPT: &str = "You are a podcast transcript writer. You respond with a single JSON \
     object describing the episode transcript and nothing else.";

const MAX_COMPLETION_TOKENS: u32 = 8192;

/// API configuration for the generator.
///
/// Values are supplied by the caller; the generator never reads the
/// process environment itself.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// OpenAI-compatible API base URL.
    pub api_base: String,
    /// API key for authentication.
    pub api_key: String,
    /// Chat model to use.
    pub model: String,
}

impl GeneratorConfig {
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_base: api_base.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

/// Generates episode transcripts from rendered prompts.
pub struct TranscriptGenerator {
    config: GeneratorConfig,
}

impl TranscriptGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Generate a transcript from a rendered prompt.
    ///
    /// Responses that cannot be parsed into a valid transcript are retried
    /// a bounded number of times before the run fails.
    pub async fn generate(&self, prompt: &str) -> Result<Transcript, PodcastError> {
        let max_parse_retries = 3;
        let mut last_failure = String::new();

        for attempt in 0..max_parse_retries {
            if attempt > 0 {
                eprintln!(
                    "  [Retry {}/{}] Unusable transcript response, retrying...",
                    attempt,
                    max_parse_retries - 1
                );
                tokio::time::sleep(std::time::Duration::from_secs(2)).await;
            }

            let response = self.get_completion(prompt).await?;
            match parse_transcript(&sanitize_response(&response)) {
                Ok(transcript) => return Ok(transcript),
                Err(e) => last_failure = e.to_string(),
            }
        }

        Err(PodcastError::TranscriptError(format!(
            "no usable transcript after {} attempts: {}",
            max_parse_retries, last_failure
        )))
    }

    /// Get a completion from the API.
    /// Includes retry logic with exponential backoff for resilience.
    async fn get_completion(&self, prompt: &str) -> Result<String, PodcastError> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| {
                PodcastError::ConfigError(format!("Failed to create HTTP client: {}", e))
            })?;

        let config = OpenAIConfig::new()
            .with_api_key(&self.config.api_key)
            .with_api_base(&self.config.api_base);

        let client = Client::with_config(config).with_http_client(http_client);

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.model)
            .max_completion_tokens(MAX_COMPLETION_TOKENS)
            .messages(vec![
                ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                    content: SYSTEM_PROMPT.to_string().into(),
                    name: None,
                }),
                ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                    content: prompt.to_string().into(),
                    name: None,
                }),
            ])
            .build()?;

        // Retry logic with exponential backoff
        let max_retries = 3;
        let mut last_error = None;

        for attempt in 0..max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_secs(1 << attempt);
                tokio::time::sleep(delay).await;
            }

            match client.chat().create(request.clone()).await {
                Ok(response) => {
                    let content = response
                        .choices
                        .first()
                        .and_then(|c| c.message.content.clone())
                        .unwrap_or_default();
                    return Ok(content);
                }
                Err(e) => {
                    last_error = Some(e);
                    if attempt < max_retries - 1 {
                        continue;
                    }
                }
            }
        }

        Err(last_error.map(PodcastError::from).unwrap_or_else(|| {
            PodcastError::ConfigError("Unknown API error after retries".to_string())
        }))
    }
}

/// Strip reasoning tags some models wrap around their output.
fn sanitize_response(response: &str) -> String {
    let tags_to_strip = ["thinking", "think", "reasoning", "reflection", "analysis"];

    let mut result = response.to_string();
    for tag in &tags_to_strip {
        let pattern = format!(r"(?is)<{tag}[^>]*>.*?</{tag}>", tag = tag);
        if let Ok(re) = regex::Regex::new(&pattern) {
            result = re.replace_all(&result, "").to_string();
        }
    }

    result.trim().to_string()
}

/// Cut a response down to its outermost JSON object, tolerating prose or
/// markdown fences around it.
fn extract_json(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (start <= end).then(|| &response[start..=end])
}

fn parse_transcript(response: &str) -> Result<Transcript, PodcastError> {
    let json = extract_json(response).ok_or_else(|| {
        PodcastError::TranscriptError("response contains no JSON object".to_string())
    })?;

    let transcript: Transcript = serde_json::from_str(json)
        .map_err(|e| PodcastError::TranscriptError(format!("invalid transcript JSON: {}", e)))?;

    transcript.validate()?;
    Ok(transcript)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_JSON: &str = r#"{
        "title": "Test Episode",
        "hosts": [{"id": "jane", "name": "Jane Doe", "voice": "af_sky"}],
        "items": [
            {"type": "speech", "order": 0, "speaker_id": "jane", "content": "Hello."}
        ]
    }"#;

    #[test]
    fn test_sanitize_response_strips_thinking_tags() {
        let input = "<thinking>Planning the episode...</thinking>{\"a\": 1}";
        assert_eq!(sanitize_response(input), "{\"a\": 1}");
    }

    #[test]
    fn test_sanitize_response_leaves_plain_text() {
        let input = "{\"a\": 1}";
        assert_eq!(sanitize_response(input), input);
    }

    #[test]
    fn test_extract_json_tolerates_markdown_fences() {
        let input = "Here you go:\n```json\n{\"a\": 1}\n```\n";
        assert_eq!(extract_json(input), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_extract_json_without_object_is_none() {
        assert_eq!(extract_json("no json here"), None);
    }

    #[test]
    fn test_parse_transcript_accepts_valid_response() {
        let wrapped = format!("Sure! Here is the transcript:\n```json\n{}\n```", VALID_JSON);
        let transcript = parse_transcript(&wrapped).unwrap();
        assert_eq!(transcript.title, "Test Episode");
        assert_eq!(transcript.items.len(), 1);
    }

    #[test]
    fn test_parse_transcript_rejects_unknown_speaker() {
        let json = r#"{
            "title": "Test Episode",
            "hosts": [{"id": "jane", "name": "Jane Doe", "voice": "af_sky"}],
            "items": [
                {"type": "speech", "order": 0, "speaker_id": "bob", "content": "Hi."}
            ]
        }"#;
        assert!(matches!(
            parse_transcript(json),
            Err(PodcastError::UnknownHost(id)) if id == "bob"
        ));
    }

    #[test]
    fn test_parse_transcript_rejects_malformed_json() {
        assert!(matches!(
            parse_transcript("{not json"),
            Err(PodcastError::TranscriptError(_))
        ));
    }
}
