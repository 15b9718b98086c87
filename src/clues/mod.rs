mod builtin;
mod ollama;
mod openai;

use crate::types::ClueDraft;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

pub use builtin::BuiltinProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Topics offered on the admin screen
pub const PREBUILT_TOPICS: &[&str] = &[
    "Tech Company Taglines",
    "Programming Languages",
    "Cloud Computing Concepts",
    "Video Game Studios",
];

/// Result type for clue generation
pub type ClueResult<T> = Result<T, ClueError>;

/// Errors that can occur while generating a clue pool
#[derive(Debug, thiserror::Error)]
pub enum ClueError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Response parsing failed: {0}")]
    ParseError(String),

    #[error("Not enough unique clues generated: needed {required}, got {got}")]
    Insufficient { required: usize, got: usize },
}

/// Request for a pool of clues
#[derive(Debug, Clone)]
pub struct ClueRequest {
    pub topic: String,
    /// Number of unique clues the caller needs
    pub count: usize,
    pub timeout: Duration,
}

impl ClueRequest {
    /// Prompt shared by the model-backed providers
    pub fn prompt(&self) -> String {
        format!(
            "Generate {count} unique bingo clues for a trivia bingo game on the topic: '{topic}'.\n\
             Each clue is a short descriptive phrase hinting at a specific company, technology or term; \
             that name is the answer. Never repeat an answer.\n\
             Respond with JSON only, shaped as {{\"clues\": [{{\"answer\": \"...\", \"text\": \"...\"}}]}} \
             with exactly {count} entries.",
            count = self.count,
            topic = self.topic,
        )
    }
}

/// Trait that all clue sources must implement
#[async_trait]
pub trait ClueProvider: Send + Sync {
    /// Produce candidate clues for the request. The manager validates the result.
    async fn generate(&self, request: &ClueRequest) -> ClueResult<Vec<ClueDraft>>;

    /// Get the name of this provider
    fn name(&self) -> &str;
}

/// Tries configured providers in order until one yields a usable pool
pub struct ClueManager {
    pub providers: Vec<Box<dyn ClueProvider>>,
    pub timeout: Duration,
}

impl ClueManager {
    pub fn new(providers: Vec<Box<dyn ClueProvider>>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// Generate exactly `required` unique clues for `topic`.
    /// Returns the name of the provider that succeeded alongside the clues.
    pub async fn generate(
        &self,
        topic: &str,
        required: usize,
    ) -> ClueResult<(String, Vec<ClueDraft>)> {
        let request = ClueRequest {
            topic: topic.to_string(),
            count: required,
            timeout: self.timeout,
        };

        let mut last_error = ClueError::ConfigError("No clue providers configured".to_string());

        for provider in &self.providers {
            let drafts = match provider.generate(&request).await {
                Ok(drafts) => drafts,
                Err(e) => {
                    tracing::warn!("Clue provider {} failed: {}", provider.name(), e);
                    last_error = e;
                    continue;
                }
            };

            let mut clues = sanitize_clues(drafts);
            if clues.len() < required {
                tracing::warn!(
                    "Clue provider {} returned {} unique clues, need {}",
                    provider.name(),
                    clues.len(),
                    required
                );
                last_error = ClueError::Insufficient {
                    required,
                    got: clues.len(),
                };
                continue;
            }

            clues.truncate(required);
            tracing::info!(
                "Generated {} clues for topic '{}' via {}",
                clues.len(),
                topic,
                provider.name()
            );
            return Ok((provider.name().to_string(), clues));
        }

        Err(last_error)
    }
}

/// Trim entries, drop blanks, and drop repeated answers or texts (case-insensitive).
/// Keeps the first occurrence and the input order.
pub fn sanitize_clues(drafts: Vec<ClueDraft>) -> Vec<ClueDraft> {
    let mut answers = HashSet::new();
    let mut texts = HashSet::new();

    drafts
        .into_iter()
        .map(|d| ClueDraft::new(d.answer.trim(), d.text.trim()))
        .filter(|d| !d.answer.is_empty() && !d.text.is_empty())
        .filter(|d| {
            let fresh_answer = answers.insert(d.answer.to_lowercase());
            let fresh_text = texts.insert(d.text.to_lowercase());
            fresh_answer && fresh_text
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct RawClue {
    #[serde(alias = "companyName")]
    answer: String,
    #[serde(alias = "clueText", alias = "clue")]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawClueList {
    Wrapped { clues: Vec<RawClue> },
    Bare(Vec<RawClue>),
}

/// Parse a model response into clue drafts.
/// Accepts `{"clues": [...]}` or a bare array, optionally inside a markdown code fence.
pub fn parse_clue_response(text: &str) -> ClueResult<Vec<ClueDraft>> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.trim_end().trim_end_matches("```"))
        .unwrap_or(trimmed)
        .trim();

    let list: RawClueList =
        serde_json::from_str(body).map_err(|e| ClueError::ParseError(e.to_string()))?;

    let raw = match list {
        RawClueList::Wrapped { clues } => clues,
        RawClueList::Bare(clues) => clues,
    };

    Ok(raw
        .into_iter()
        .map(|c| ClueDraft::new(c.answer, c.text))
        .collect())
}

/// Configuration for clue providers
#[derive(Debug, Clone)]
pub struct ClueConfig {
    /// OpenAI API key
    pub openai_api_key: Option<String>,
    /// OpenAI model to use
    pub openai_model: String,
    /// Ollama base URL
    pub ollama_base_url: Option<String>,
    /// Ollama model to use
    pub ollama_model: String,
    /// Timeout per provider request
    pub timeout: Duration,
    /// Whether the offline demo pool serves requests when no model provider
    /// is configured. It never stands in for a configured provider that fails.
    pub builtin_fallback: bool,
}

impl Default for ClueConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
            ollama_base_url: None,
            ollama_model: "llama3.2".to_string(),
            timeout: Duration::from_secs(30),
            builtin_fallback: true,
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

impl ClueConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            openai_api_key: non_empty_env("OPENAI_API_KEY"),
            openai_model: non_empty_env("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            ollama_base_url: non_empty_env("OLLAMA_BASE_URL"),
            ollama_model: non_empty_env("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            timeout: non_empty_env("CLUE_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            builtin_fallback: non_empty_env("CLUE_BUILTIN_FALLBACK")
                .map(|v| v != "0" && v.to_lowercase() != "false")
                .unwrap_or(defaults.builtin_fallback),
        }
    }

    /// Build a ClueManager with all configured providers
    pub fn build_manager(&self) -> ClueResult<ClueManager> {
        let mut providers: Vec<Box<dyn ClueProvider>> = Vec::new();

        if let Some(api_key) = &self.openai_api_key {
            providers.push(Box::new(OpenAiProvider::new(
                api_key.clone(),
                self.openai_model.clone(),
            )));
        }

        if let Some(base_url) = &self.ollama_base_url {
            providers.push(Box::new(OllamaProvider::new(
                base_url.clone(),
                self.ollama_model.clone(),
            )?));
        }

        // A model failure must reach the admin, not turn into off-topic clues
        if providers.is_empty() && self.builtin_fallback {
            providers.push(Box::new(BuiltinProvider));
        }

        if providers.is_empty() {
            return Err(ClueError::ConfigError(
                "No clue providers configured. Set OPENAI_API_KEY or OLLAMA_BASE_URL, or enable CLUE_BUILTIN_FALLBACK"
                    .to_string(),
            ));
        }

        Ok(ClueManager::new(providers, self.timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    struct FixedProvider {
        name: &'static str,
        result: fn() -> ClueResult<Vec<ClueDraft>>,
    }

    #[async_trait]
    impl ClueProvider for FixedProvider {
        async fn generate(&self, _request: &ClueRequest) -> ClueResult<Vec<ClueDraft>> {
            (self.result)()
        }

        fn name(&self) -> &str {
            self.name
        }
    }

    fn drafts(n: usize) -> Vec<ClueDraft> {
        (0..n)
            .map(|i| ClueDraft::new(format!("A{}", i), format!("Clue {}", i)))
            .collect()
    }

    #[test]
    fn test_parse_wrapped_and_fenced() {
        let text = "```json\n{\"clues\": [{\"answer\": \"Rust\", \"text\": \"Fearless concurrency\"}]}\n```";
        let parsed = parse_clue_response(text).unwrap();
        assert_eq!(parsed, vec![ClueDraft::new("Rust", "Fearless concurrency")]);
    }

    #[test]
    fn test_parse_bare_array_with_camel_case_field_names() {
        let text = r#"[{"companyName": "Google", "clueText": "Search engine"}]"#;
        let parsed = parse_clue_response(text).unwrap();
        assert_eq!(parsed[0].answer, "Google");
        assert_eq!(parsed[0].text, "Search engine");
    }

    #[test]
    fn test_parse_garbage_fails() {
        let result = parse_clue_response("I cannot help with that.");
        assert!(matches!(result, Err(ClueError::ParseError(_))));
    }

    #[test]
    fn test_sanitize_drops_blanks_and_duplicates() {
        let input = vec![
            ClueDraft::new(" Apple ", " Makes the iPhone "),
            ClueDraft::new("apple", "Fruit company"),
            ClueDraft::new("Google", "makes the iphone"),
            ClueDraft::new("", "No answer"),
            ClueDraft::new("Tesla", "Electric cars"),
        ];

        let clean = sanitize_clues(input);
        assert_eq!(
            clean,
            vec![
                ClueDraft::new("Apple", "Makes the iPhone"),
                ClueDraft::new("Tesla", "Electric cars"),
            ]
        );
    }

    #[tokio::test]
    async fn test_manager_falls_through_to_next_provider() {
        let manager = ClueManager::new(
            vec![
                Box::new(FixedProvider {
                    name: "broken",
                    result: || Err(ClueError::ApiError("boom".to_string())),
                }),
                Box::new(FixedProvider {
                    name: "short",
                    result: || Ok(drafts(3)),
                }),
                Box::new(FixedProvider {
                    name: "good",
                    result: || Ok(drafts(12)),
                }),
            ],
            Duration::from_secs(1),
        );

        let (provider, clues) = manager.generate("Anything", 8).await.unwrap();
        assert_eq!(provider, "good");
        assert_eq!(clues.len(), 8);
        assert_eq!(clues[0], ClueDraft::new("A0", "Clue 0"));
    }

    #[tokio::test]
    async fn test_manager_rejects_small_pool() {
        let manager = ClueManager::new(
            vec![Box::new(FixedProvider {
                name: "short",
                result: || Ok(drafts(5)),
            })],
            Duration::from_secs(1),
        );

        let result = manager.generate("Anything", 8).await;
        assert!(matches!(
            result,
            Err(ClueError::Insufficient {
                required: 8,
                got: 5
            })
        ));
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        std::env::remove_var("OPENAI_API_KEY");
        std::env::set_var("OLLAMA_BASE_URL", " http://ollama:11434 ");
        std::env::set_var("CLUE_TIMEOUT", "12");
        std::env::set_var("CLUE_BUILTIN_FALLBACK", "false");

        let config = ClueConfig::from_env();
        assert!(config.openai_api_key.is_none());
        assert_eq!(config.ollama_base_url.as_deref(), Some("http://ollama:11434"));
        assert_eq!(config.timeout, Duration::from_secs(12));
        assert!(!config.builtin_fallback);

        let manager = config.build_manager().unwrap();
        assert_eq!(manager.provider_names(), vec!["ollama".to_string()]);

        std::env::remove_var("OLLAMA_BASE_URL");
        std::env::remove_var("CLUE_TIMEOUT");
        std::env::remove_var("CLUE_BUILTIN_FALLBACK");
    }

    #[test]
    fn test_builtin_pool_only_without_model_provider() {
        let offline = ClueConfig {
            openai_api_key: None,
            ollama_base_url: None,
            ..ClueConfig::default()
        };
        assert_eq!(
            offline.build_manager().unwrap().provider_names(),
            vec!["builtin".to_string()]
        );

        let with_model = ClueConfig {
            openai_api_key: None,
            ollama_base_url: Some("http://ollama:11434".to_string()),
            ..ClueConfig::default()
        };
        assert_eq!(
            with_model.build_manager().unwrap().provider_names(),
            vec!["ollama".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unreachable_model_provider_reports_failure() {
        let config = ClueConfig {
            openai_api_key: None,
            ollama_base_url: Some("http://127.0.0.1:9".to_string()),
            timeout: Duration::from_secs(2),
            ..ClueConfig::default()
        };
        let manager = config.build_manager().unwrap();

        let result = manager.generate("Video Game Studios", 8).await;
        assert!(matches!(
            result,
            Err(ClueError::ApiError(_)) | Err(ClueError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_manager_surfaces_last_provider_error() {
        let manager = ClueManager::new(
            vec![Box::new(FixedProvider {
                name: "broken",
                result: || Err(ClueError::ApiError("boom".to_string())),
            })],
            Duration::from_secs(1),
        );

        let result = manager.generate("Anything", 8).await;
        assert!(matches!(result, Err(ClueError::ApiError(msg)) if msg == "boom"));
    }

    #[test]
    #[serial]
    fn test_config_without_providers_fails() {
        let config = ClueConfig {
            builtin_fallback: false,
            ..ClueConfig::default()
        };
        assert!(matches!(
            config.build_manager(),
            Err(ClueError::ConfigError(_))
        ));
    }
}
