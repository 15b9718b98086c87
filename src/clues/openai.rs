use super::*;
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use std::time::Instant;

const SYSTEM_PROMPT: &str = "You write clues for a live trivia bingo game. \
    Clues are one short sentence, never contain the answer itself, and every answer is distinct. \
    You only ever reply with a JSON object.";

/// OpenAI provider implementation
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider with the given API key and model
    pub fn new(api_key: String, model: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        let client = Client::with_config(config);

        Self { client, model }
    }
}

#[async_trait]
impl ClueProvider for OpenAiProvider {
    async fn generate(&self, request: &ClueRequest) -> ClueResult<Vec<ClueDraft>> {
        let start = Instant::now();

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .response_format(ResponseFormat::JsonObject)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(SYSTEM_PROMPT)
                    .build()
                    .map_err(|e| ClueError::ApiError(e.to_string()))?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(request.prompt())
                    .build()
                    .map_err(|e| ClueError::ApiError(e.to_string()))?
                    .into(),
            ])
            .build()
            .map_err(|e| ClueError::ApiError(e.to_string()))?;

        let response =
            tokio::time::timeout(request.timeout, self.client.chat().create(chat_request))
                .await
                .map_err(|_| ClueError::Timeout(request.timeout))?
                .map_err(|e| ClueError::ApiError(e.to_string()))?;

        let text = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| ClueError::ParseError("No content in response".to_string()))?;

        tracing::debug!(
            "OpenAI ({}) answered in {}ms, tokens: {:?}",
            self.model,
            start.elapsed().as_millis(),
            response.usage.map(|u| u.total_tokens)
        );

        parse_clue_response(&text)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
