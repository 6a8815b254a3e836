//! Prompt → task list adapter
//!
//! `try_generate` does the work and reports failures as [`GenerateError`].
//! `generate_tasks` is what the UI calls: it always yields something
//! displayable, turning any failure into a single line.

use tracing::{debug, info, warn};

use super::mistral::MistralClient;
use super::steps::split_steps;
use crate::error::GenerateError;
use crate::state::ChatMessage;

pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant that generates practical and actionable todo items. \
If the user requests a task with multiple steps, provide them as a numbered list. \
Each step should be clear and actionable. If the task is simple, provide a single step. \
Keep all steps concise.";

#[derive(Clone, Default)]
pub struct TaskGenerator {
    client: MistralClient,
}

impl TaskGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: MistralClient) -> Self {
        Self { client }
    }

    /// System instruction followed by the user's prompt, untouched
    pub fn build_messages(prompt: &str) -> Vec<ChatMessage> {
        vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)]
    }

    pub async fn try_generate(&self, api_key: &str, prompt: &str) -> Result<Vec<String>, GenerateError> {
        if prompt.trim().is_empty() {
            return Err(GenerateError::EmptyPrompt);
        }
        if api_key.is_empty() {
            return Err(GenerateError::MissingCredential);
        }

        info!(prompt_len = prompt.len(), "generating tasks");
        let messages = Self::build_messages(prompt);
        let content = self.client.complete(api_key, &messages).await?;

        let steps = split_steps(&content);
        debug!(?steps, "parsed steps");
        Ok(steps)
    }

    /// Tasks for `prompt`, or exactly one diagnostic line on failure
    pub async fn generate_tasks(&self, api_key: &str, prompt: &str) -> Vec<String> {
        match self.try_generate(api_key, prompt).await {
            Ok(steps) => steps,
            Err(e) => {
                warn!(error = %e, "task generation failed");
                vec![e.to_display_line()]
            }
        }
    }
}
