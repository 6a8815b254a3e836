use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GenerateError;
use crate::state::ChatMessage;

pub const MISTRAL_API_URL: &str = "https://api.mistral.ai/v1/chat/completions";
pub const MISTRAL_MODEL: &str = "mistral-tiny";
const MAX_TOKENS: u32 = 300;
const TEMPERATURE: f64 = 0.7;

#[derive(Serialize)]
struct MistralRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Deserialize)]
struct MistralChoice {
    message: Option<MistralResponseMessage>,
}

#[derive(Deserialize)]
struct MistralResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct MistralResponse {
    #[serde(default)]
    choices: Vec<MistralChoice>,
}

#[derive(Clone)]
pub struct MistralClient {
    client: Client,
    endpoint: String,
}

impl Default for MistralClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MistralClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            endpoint: MISTRAL_API_URL.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_endpoint(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    /// One chat completion call. Returns the raw content of the first choice.
    pub async fn complete(&self, api_key: &str, messages: &[ChatMessage]) -> Result<String, GenerateError> {
        let request = MistralRequest {
            model: MISTRAL_MODEL,
            messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        debug!(model = MISTRAL_MODEL, messages = messages.len(), "sending chat completion request");

        let response = self.client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!(status = status.as_u16(), body = %text, "raw API response");

        if !status.is_success() {
            warn!(status = status.as_u16(), "Mistral API returned an error status");
            return Err(GenerateError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let mistral_response: MistralResponse = serde_json::from_str(&text)?;
        mistral_response.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|content| !content.is_empty())
            .ok_or(GenerateError::MissingContent)
    }
}
