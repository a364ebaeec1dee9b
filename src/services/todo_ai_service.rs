use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use std::sync::Arc;

use super::openai_client::{AiError, CompletionClient};

/// Activity description and target time to ask a suggestion for. Either may
/// be empty; the prompt still asks for a recommendation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoAiInput {
    #[serde(default)]
    pub todo: String,
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait TodoSuggester: Send + Sync {
    async fn suggest(&self, input: TodoAiInput) -> Result<String, AiError>;
}

pub struct TodoAiService {
    client: Arc<dyn CompletionClient>,
}

impl TodoAiService {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }
}

pub fn build_prompt(input: &TodoAiInput) -> String {
    let time = input
        .time
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default();
    format!(
        "The following data comes from a filled-in JSON form. Recommend activities that \
         match the given criteria and time. If one of the inputs is empty, still give a \
         recommendation based on the inputs that are present. Give the best answer you can. \
         `{{'activity': {}, 'time': {} }}`",
        input.todo, time
    )
}

#[async_trait]
impl TodoSuggester for TodoAiService {
    async fn suggest(&self, input: TodoAiInput) -> Result<String, AiError> {
        let prompt = build_prompt(&input);
        self.client.complete(&prompt).await
    }
}
