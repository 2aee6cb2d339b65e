use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::NarrativeConfig;
use crate::error::{AppError, Result};
use crate::model::biomarkers::BiomarkerSet;
use crate::model::scores::CognitiveScores;
use crate::model::stage::StageLabel;
use crate::report::text::{SYSTEM_PROMPT, render_fallback, render_prompt};

const ERROR_BODY_CHARS: usize = 300;

#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("language-model service unreachable: {0}")]
    Connection(String),
    #[error("language-model rate limit exceeded")]
    RateLimited,
    #[error("language-model service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("malformed language-model response: {0}")]
    Malformed(String),
}

impl NarrativeError {
    /// Failures that select the local fallback instead of failing the request.
    pub fn is_transient(&self) -> bool {
        matches!(self, NarrativeError::Connection(_) | NarrativeError::RateLimited)
    }
}

pub trait NarrativeClient {
    fn complete(&self, system: &str, prompt: &str) -> std::result::Result<String, NarrativeError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeSource {
    Remote,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct Narrative {
    pub text: String,
    pub source: NarrativeSource,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Blocking client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionClient {
    agent: ureq::Agent,
    url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatCompletionClient {
    /// `None` when the service is disabled or no API key is configured.
    pub fn from_config(config: &NarrativeConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let api_key = config.api_key.clone()?;
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Some(Self {
            agent,
            url: format!("{}/chat/completions", config.endpoint.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

impl NarrativeClient for ChatCompletionClient {
    fn complete(&self, system: &str, prompt: &str) -> std::result::Result<String, NarrativeError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .agent
            .post(&self.url)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(&request);

        match response {
            Ok(response) => {
                let parsed: ChatResponse = response
                    .into_json()
                    .map_err(|e| NarrativeError::Malformed(e.to_string()))?;
                parsed
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.message.content)
                    .ok_or_else(|| NarrativeError::Malformed("no message content".to_string()))
            }
            Err(ureq::Error::Status(429, _)) => Err(NarrativeError::RateLimited),
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                Err(NarrativeError::Http {
                    status,
                    body: body.chars().take(ERROR_BODY_CHARS).collect(),
                })
            }
            Err(ureq::Error::Transport(transport)) => {
                Err(NarrativeError::Connection(transport.to_string()))
            }
        }
    }
}

pub fn run_stage5(
    client: Option<&dyn NarrativeClient>,
    biomarkers: &BiomarkerSet,
    scores: &CognitiveScores,
    stage: StageLabel,
) -> Result<Narrative> {
    let Some(client) = client else {
        warn!("language-model service not configured; using local report");
        return Ok(fallback(biomarkers, stage));
    };

    let prompt = render_prompt(biomarkers, scores);
    match client.complete(SYSTEM_PROMPT, &prompt) {
        Ok(text) => {
            info!(chars = text.len(), "narrative generated remotely");
            Ok(Narrative {
                text,
                source: NarrativeSource::Remote,
            })
        }
        Err(err) if err.is_transient() => {
            warn!(error = %err, "language-model request failed; using local report");
            Ok(fallback(biomarkers, stage))
        }
        Err(err) => Err(AppError::ReportGeneration(err.to_string())),
    }
}

fn fallback(biomarkers: &BiomarkerSet, stage: StageLabel) -> Narrative {
    Narrative {
        text: render_fallback(biomarkers, stage),
        source: NarrativeSource::Fallback,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_narrative.rs"]
mod tests;
