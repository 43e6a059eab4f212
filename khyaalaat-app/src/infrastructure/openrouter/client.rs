use super::prompt::{build_topic_prompt, SYSTEM_PROMPT};
use super::types::{ChatCompletionRequest, ChatCompletionResponse};
use crate::domain::TopicIdea;
use khyaalaat_errors::AppError;

const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const MODEL: &str = "deepseek/deepseek-chat";

#[derive(Clone)]
pub struct OpenRouterClient {
    http_client: reqwest::Client,
    api_key: String,
}

impl OpenRouterClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_key,
        }
    }

    /// Raw model answer for a topic suggestion prompt.
    pub async fn suggest_topics(&self, idea: &TopicIdea) -> Result<String, AppError> {
        let request = ChatCompletionRequest::new(MODEL, SYSTEM_PROMPT, build_topic_prompt(idea));

        let response = self
            .http_client
            .post(OPENROUTER_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("X-Title", "Khyaalaat")
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("OpenRouter error: {} - {}", status, body);
            return Err(AppError::Backend(format!("OpenRouter API error: {}", status)));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Backend(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::Backend("No response from the model".to_string()))
    }
}
