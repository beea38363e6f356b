//! Client for the Gemini `generateContent` REST API.
//!
//! The model is instructed to answer with a `{"response": ..., "quit": ...}`
//! envelope; replies are validated against that shape and anything else is
//! reported as [`MediBotError::MalformedReply`].

use crate::domain::model::{AssistantReply, ChatSession, Role};
use crate::domain::ports::{Assistant, AssistantSettings};
use crate::utils::error::{MediBotError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const API_KEY_HEADER: &str = "x-goog-api-key";

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
Your role is to be a chatbot responding to the messages from a user. \
Your response must be a JSON object with two keys: a \"response\" key and a \"quit\" key. \
The value of \"response\" is your answer to the user's prompt as a string, and the value \
of \"quit\" is the boolean false unless the user wants to end the conversation. \
Keep your responses concise and avoid unnecessary repetition or recitation of large \
amounts of text. If you are unsure or the query is too broad, ask for clarification. \
Example: {\"response\": \"Good morning in Spanish is 'buenos días'\", \"quit\": false}";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: RequestContent<'a>,
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

pub struct GeminiAssistant {
    client: Client,
    url: String,
    api_key: String,
    system_prompt: String,
}

impl GeminiAssistant {
    pub fn from_settings(settings: &dyn AssistantSettings) -> Result<Self> {
        let api_key = settings
            .api_key()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| MediBotError::MissingConfigError {
                field: "assistant.api_key".to_string(),
            })?
            .to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds()))
            .build()?;

        Ok(Self {
            client,
            url: format!(
                "{}/v1beta/models/{}:generateContent",
                settings.endpoint().trim_end_matches('/'),
                settings.model()
            ),
            api_key,
            system_prompt: settings
                .system_prompt()
                .unwrap_or(DEFAULT_SYSTEM_PROMPT)
                .to_string(),
        })
    }

    fn build_request<'a>(&'a self, session: &'a ChatSession, prompt: &'a str) -> GenerateContentRequest<'a> {
        let mut contents: Vec<RequestContent<'a>> = session
            .history()
            .iter()
            .map(|turn| RequestContent {
                role: Some(match turn.role {
                    Role::User => "user",
                    Role::Model => "model",
                }),
                parts: vec![RequestPart { text: &turn.text }],
            })
            .collect();
        contents.push(RequestContent {
            role: Some("user"),
            parts: vec![RequestPart { text: prompt }],
        });

        GenerateContentRequest {
            system_instruction: RequestContent {
                role: None,
                parts: vec![RequestPart {
                    text: &self.system_prompt,
                }],
            },
            contents,
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        }
    }
}

#[async_trait]
impl Assistant for GeminiAssistant {
    async fn send(&self, session: &ChatSession, prompt: &str) -> Result<(String, AssistantReply)> {
        tracing::debug!(
            "Sending prompt to assistant ({} prior turns)",
            session.history().len()
        );

        let response = self
            .client
            .post(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&self.build_request(session, prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("Assistant response status: {}", status);

        if !status.is_success() {
            return Err(MediBotError::AssistantStatus {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        let text = extract_text(&body)?;
        let reply = parse_reply(&text)?;
        Ok((text, reply))
    }
}

/// Pulls the candidate text out of a `generateContent` response body.
fn extract_text(body: &str) -> Result<String> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| MediBotError::MalformedReply {
            reason: format!("unexpected response body: {}", e),
        })?;

    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(MediBotError::AssistantRefused {
            reason: format!("prompt blocked ({})", reason),
        });
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| MediBotError::AssistantRefused {
            reason: "no candidates returned".to_string(),
        })?;

    match candidate.finish_reason.as_deref() {
        None | Some("STOP") | Some("MAX_TOKENS") => {}
        Some(other) => {
            return Err(MediBotError::AssistantRefused {
                reason: format!("generation stopped ({})", other),
            })
        }
    }

    let text: String = candidate
        .content
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(MediBotError::AssistantRefused {
            reason: "empty candidate".to_string(),
        });
    }
    Ok(text)
}

/// Parses the reply envelope, tolerating a surrounding Markdown code fence.
pub fn parse_reply(raw: &str) -> Result<AssistantReply> {
    serde_json::from_str(strip_code_fence(raw.trim())).map_err(|e| MediBotError::MalformedReply {
        reason: e.to_string(),
    })
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // opening fence line may carry a language tag
    let rest = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
