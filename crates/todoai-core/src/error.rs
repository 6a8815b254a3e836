//! Error types for task generation

use thiserror::Error;

/// Text shown in place of tasks when the prompt is blank
pub const EMPTY_PROMPT_MESSAGE: &str = "Please enter a todo description";

/// Every way a generation request can fail
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("{}", EMPTY_PROMPT_MESSAGE)]
    EmptyPrompt,

    #[error("Mistral API key is not configured")]
    MissingCredential,

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API request failed: {status} {body}")]
    Status { status: u16, body: String },

    #[error("Malformed API response: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("Invalid API response format")]
    MissingContent,
}

impl GenerateError {
    /// The single string handed to the UI for this failure
    pub fn to_display_line(&self) -> String {
        match self {
            GenerateError::EmptyPrompt => EMPTY_PROMPT_MESSAGE.to_string(),
            other => format!("Error: {}", other),
        }
    }
}
