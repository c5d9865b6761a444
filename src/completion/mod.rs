pub mod dto;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::config::CompletionConfig;
use crate::error::AppError;

use dto::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Role};

/// What the caller wants answered; model, credential and temperature come from the client.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: Option<String>,
    pub user: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Prompt {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            system: None,
            user: content.into(),
            max_tokens: None,
            temperature: None,
        }
    }

    pub fn with_system(mut self, content: impl Into<String>) -> Self {
        self.system = Some(content.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the text of the first choice. Every failure is reported as `AppError::Upstream`.
    async fn complete(&self, prompt: &Prompt) -> Result<String, AppError>;
}

pub struct HttpCompletionClient {
    client: Client,
    config: CompletionConfig,
}

impl HttpCompletionClient {
    pub fn new(config: CompletionConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn build_request(&self, prompt: &Prompt) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &prompt.system {
            messages.push(ChatMessage {
                role: Role::System,
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: Role::User,
            content: prompt.user.clone(),
        });

        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: prompt.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: prompt.temperature,
        }
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String, AppError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Upstream("Completion API key is not configured".to_string()))?;

        let request_body = self.build_request(prompt);
        debug!(
            model = %request_body.model,
            max_tokens = request_body.max_tokens,
            "sending completion request"
        );

        let response = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Completion request failed: {}", e)))?;

        let status = response.status();
        info!("completion API responded with {}", status);
        let body_text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "Completion API error {}: {}",
                status, body_text
            )));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body_text).map_err(|e| {
            debug!("unparseable completion body: {}", body_text);
            AppError::Upstream(format!("Failed to parse completion response: {}", e))
        })?;

        parsed
            .first_content()
            .map(str::to_string)
            .ok_or_else(|| AppError::Upstream("Completion response had no content".to_string()))
    }
}

/// Never reaches the network; every call fails so the recommendation fallbacks answer.
pub struct OfflineCompletionClient;

#[async_trait]
impl CompletionClient for OfflineCompletionClient {
    async fn complete(&self, _prompt: &Prompt) -> Result<String, AppError> {
        Err(AppError::Upstream(
            "Completion API disabled (offline mode)".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpCompletionClient {
        HttpCompletionClient::new(CompletionConfig::default()).expect("client")
    }

    #[test]
    fn test_request_body_shape() {
        let prompt = Prompt::user("Which course?")
            .with_system("Only recommend listed courses.")
            .with_temperature(0.7);
        let body = serde_json::to_value(client().build_request(&prompt)).expect("serialize");

        assert_eq!(body["model"], "deepseek-chat");
        assert_eq!(body["max_tokens"], 1500);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Which course?");
        assert!(body["temperature"].as_f64().is_some());
    }

    #[test]
    fn test_probe_request_omits_system_and_temperature() {
        let prompt = Prompt::user("Hello").with_max_tokens(100);
        let body = serde_json::to_value(client().build_request(&prompt)).expect("serialize");

        assert_eq!(body["messages"].as_array().map(|m| m.len()), Some(1));
        assert_eq!(body["max_tokens"], 100);
        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_first_content_requires_text() {
        let ok: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"CS101: great intro"}}]}"#)
                .expect("parse");
        assert_eq!(ok.first_content(), Some("CS101: great intro"));

        let empty: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[]}"#).expect("parse");
        assert_eq!(empty.first_content(), None);

        let blank: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"  "}}]}"#).expect("parse");
        assert_eq!(blank.first_content(), None);
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_network() {
        let err = client()
            .complete(&Prompt::user("hi"))
            .await
            .expect_err("no key configured");
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_offline_client_always_fails() {
        let err = OfflineCompletionClient
            .complete(&Prompt::user("hi"))
            .await
            .expect_err("offline");
        assert!(matches!(err, AppError::Upstream(_)));
    }
}
