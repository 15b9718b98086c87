use super::*;
use serde::Serialize;
use std::time::Instant;

/// Ollama provider implementation
pub struct OllamaProvider {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a new Ollama provider with the given base URL and model
    pub fn new(base_url: String, model: String) -> ClueResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ClueError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            client,
        })
    }
}

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    /// Constrains the model to emit valid JSON
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

#[async_trait]
impl ClueProvider for OllamaProvider {
    async fn generate(&self, request: &ClueRequest) -> ClueResult<Vec<ClueDraft>> {
        let start = Instant::now();

        let ollama_request = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt: request.prompt(),
            stream: false,
            format: "json",
        };

        let url = format!("{}/api/generate", self.base_url);

        let response = tokio::time::timeout(
            request.timeout,
            self.client.post(&url).json(&ollama_request).send(),
        )
        .await
        .map_err(|_| ClueError::Timeout(request.timeout))?
        .map_err(|e| ClueError::ApiError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClueError::ApiError(format!(
                "Ollama API returned status: {}",
                response.status()
            )));
        }

        let ollama_response: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| ClueError::ParseError(e.to_string()))?;

        tracing::debug!(
            "Ollama ({}) answered in {}ms",
            self.model,
            start.elapsed().as_millis()
        );

        parse_clue_response(&ollama_response.response)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
