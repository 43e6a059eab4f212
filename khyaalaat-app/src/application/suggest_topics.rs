use crate::domain::TopicIdea;
use crate::infrastructure::openrouter::{parse_suggestions, OpenRouterClient};
use crate::infrastructure::security::RateLimiter;
use khyaalaat_errors::{AppError, FieldErrors};
use std::net::IpAddr;

const FAILED: &str = "Failed to generate suggestions. Please try again.";

/// Asks an LLM for poetry topics matching what a visitor has typed into the
/// request form so far.
pub struct SuggestTopics {
    client: Option<OpenRouterClient>,
    rate_limiter: RateLimiter,
}

impl SuggestTopics {
    pub fn new(openrouter_api_key: Option<String>) -> Self {
        Self {
            client: openrouter_api_key.map(OpenRouterClient::new),
            rate_limiter: RateLimiter::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    pub async fn execute(&self, idea: &TopicIdea, client: IpAddr) -> Result<Vec<String>, AppError> {
        let Some(llm) = &self.client else {
            return Err(AppError::Unavailable(
                "Topic suggestions are not available right now.".to_string(),
            ));
        };

        if idea.topic.trim().is_empty() && idea.description.trim().is_empty() {
            return Err(FieldErrors::single(
                "topic",
                "Enter a topic or a description to get suggestions.",
            )
            .into());
        }

        self.rate_limiter.check_rate_limit(client)?;

        let answer = llm.suggest_topics(idea).await.map_err(|e| {
            tracing::error!("Topic suggestion failed: {}", e);
            AppError::Unavailable(FAILED.to_string())
        })?;

        let suggestions = parse_suggestions(&answer);
        if suggestions.is_empty() {
            tracing::warn!("Model answer had no usable suggestions: {:?}", answer);
            return Err(AppError::Unavailable(FAILED.to_string()));
        }
        Ok(suggestions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[tokio::test]
    async fn without_a_key_suggestions_are_unavailable() {
        let suggest = SuggestTopics::new(None);
        assert!(!suggest.is_enabled());
        let result = suggest.execute(&TopicIdea::default(), CLIENT).await;
        assert!(matches!(result, Err(AppError::Unavailable(_))));
    }

    #[tokio::test]
    async fn empty_input_is_a_validation_error() {
        let suggest = SuggestTopics::new(Some("key".into()));
        let idea = TopicIdea {
            genre: "Nature".into(),
            ..TopicIdea::default()
        };
        assert!(matches!(
            suggest.execute(&idea, CLIENT).await,
            Err(AppError::Validation(_))
        ));
    }
}
