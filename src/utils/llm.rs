use crate::utils::{BridgeError, SettingsRecord};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// Constants
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const APP_NAME: &str = "simpleai";

// ============================================================================
// API Types - Request
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String, // "user", "assistant", "system"
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }
}

// ============================================================================
// API Types - Response
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ResponseMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub message: String,
}

impl ChatCompletionResponse {
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_deref())
    }
}

// ============================================================================
// Client
// ============================================================================

/// Client for any endpoint that speaks the OpenAI chat-completions protocol.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    model: String,
    base_url: String,
    api_key: Arc<String>,
}

impl LlmClient {
    pub fn new(model: String, base_url: String, api_key: String) -> Result<Self, BridgeError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .map_err(|e| BridgeError::Model(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = if base_url.trim().is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            base_url.trim().trim_end_matches('/').to_string()
        };

        Ok(Self {
            client,
            model,
            base_url,
            api_key: Arc::new(api_key),
        })
    }

    /// Build a client from stored settings; fails when no model is configured.
    pub fn from_settings(settings: &SettingsRecord) -> Result<Self, BridgeError> {
        if settings.model_name.trim().is_empty() {
            return Err(BridgeError::NotConfigured(
                "set a model name in Settings".to_string(),
            ));
        }
        Self::new(
            settings.model_name.trim().to_string(),
            settings.base_url.clone(),
            settings.api_key.clone(),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    pub async fn chat_completion(&self, messages: Vec<ChatMessage>) -> Result<String, BridgeError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            stream: Some(false),
        };

        let mut builder = self
            .client
            .post(self.completions_url())
            .header("X-Title", APP_NAME)
            .header("Content-Type", "application/json");
        if !self.api_key.is_empty() {
            builder = builder.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let response = builder
            .json(&request)
            .send()
            .await
            .map_err(|e| BridgeError::Model(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(BridgeError::Model(format!(
                "{} ({})",
                extract_error_message(&error_text),
                status
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| BridgeError::Model(format!("Failed to parse response: {}", e)))?;

        if let Some(error) = &completion.error {
            return Err(BridgeError::Model(format!("API error: {}", error.message)));
        }

        completion
            .first_content()
            .map(str::to_string)
            .ok_or_else(|| BridgeError::Model("Response contained no message".to_string()))
    }
}

/// Pull `error.message` out of a JSON error body, falling back to the raw text.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}
