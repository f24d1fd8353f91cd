//! Language-model clients that turn prompts into curl commands and
//! failures into troubleshooting hints.
//!
//! Both providers speak JSON over the same `HttpClient` transport used for
//! regular requests.

use crate::application::builders::request_builder::RequestBuilder;
use crate::application::prompt::{
    ContextSnapshot, PromptError, PromptGenerator, CREDENTIAL_PLACEHOLDER,
};
use crate::application::services::HttpClient;
use crate::domain::entities::{Method, Response};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const OPENAI_MODEL: &str = "gpt-4o-mini";
pub const GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-exp:generateContent";

/// Upper bound on one provider call.
pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(100);

fn command_instructions() -> String {
    format!(
        "You write a single curl command for the user's request, using their configuration.\n\
         Rules:\n\
         - Reply with the command only: one line, no markdown, no commentary.\n\
         - Whatever the user asks for explicitly (method, path, headers, query, data) \
           overrides configuration.\n\
         - A path from the user is appended to the configured baseUrl.\n\
         - Include configured default headers unless they conflict with the request.\n\
         - Include -d only when the user mentions data to send.\n\
         - Add -L, -i and --show-error according to the configuration flags.\n\
         - Write {p} wherever a token or password belongs, \
           e.g. -H \"Authorization: Bearer {p}\" or -u {p}.\n\
         Example with baseUrl https://api.example.com: \"delete /products/9\" -> \
         curl -X DELETE \"https://api.example.com/products/9\"",
        p = CREDENTIAL_PLACEHOLDER
    )
}

const DEBUG_INSTRUCTIONS: &str = "You are an HTTP troubleshooting assistant. \
    Give three to five short bullet points: the most likely cause, one or two concrete fixes, \
    and any curl flag or configuration change that helps.";

fn command_request_text(prompt: &str, context: &ContextSnapshot) -> String {
    format!(
        "User Configuration:\n{}\n\nUser Request: {}",
        context.to_pretty_json(),
        prompt
    )
}

fn debug_request_text(error_summary: &str, request_details: Option<&str>) -> String {
    match request_details {
        Some(details) if !details.trim().is_empty() => {
            format!("Error: {}\n\nRequest Details:\n{}", error_summary, details)
        }
        _ => format!("Error: {}", error_summary),
    }
}

/// Maps a provider's HTTP status to a prompt error.
fn check_status(provider: &'static str, response: &Response) -> Result<(), PromptError> {
    match response.status.as_u16() {
        200..=299 => Ok(()),
        401 => Err(PromptError::Unauthorized { provider }),
        403 => Err(PromptError::Forbidden { provider }),
        429 => Err(PromptError::RateLimited { provider }),
        status => Err(PromptError::Api { provider, status, body: response.body.clone() }),
    }
}

async fn post_json(
    http_client: &dyn HttpClient,
    provider: &'static str,
    url: &str,
    auth_header: (&str, String),
    payload: serde_json::Value,
) -> Result<Response, PromptError> {
    let body = payload.to_string();
    let request = RequestBuilder::new()
        .method(Method::Post)
        .url(url)
        .and_then(|b| b.body(Some(&body)))
        .and_then(|b| {
            b.header(auth_header.0, &auth_header.1)
                .header("Accept", "application/json")
                .build()
        })
        .map_err(|e| PromptError::Transport { provider, message: e.to_string() })?;

    info!(provider, "calling language model");
    let response = tokio::time::timeout(PROVIDER_TIMEOUT, http_client.send(request))
        .await
        .map_err(|_| PromptError::Transport {
            provider,
            message: format!("no response within {} seconds", PROVIDER_TIMEOUT.as_secs()),
        })?
        .map_err(|e| PromptError::Transport { provider, message: e.to_string() })?;
    check_status(provider, &response)?;
    Ok(response)
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: Option<OpenAiMessage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

/// Chat-completions client.
pub struct OpenAiClient {
    http_client: Box<dyn HttpClient>,
    api_key: String,
}

impl OpenAiClient {
    const PROVIDER: &'static str = "OpenAI";

    pub fn new(http_client: Box<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self { http_client, api_key: api_key.into() }
    }

    async fn complete(&self, system: &str, user: &str) -> Result<Option<String>, PromptError> {
        if self.api_key.trim().is_empty() {
            return Err(PromptError::MissingKey { provider: Self::PROVIDER });
        }
        let payload = json!({
            "model": OPENAI_MODEL,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "temperature": 0.7
        });
        let response = post_json(
            self.http_client.as_ref(),
            Self::PROVIDER,
            OPENAI_API_URL,
            ("Authorization", format!("Bearer {}", self.api_key)),
            payload,
        )
        .await?;

        let parsed: OpenAiResponse = serde_json::from_str(&response.body)
            .map_err(|e| PromptError::Parse { provider: Self::PROVIDER, message: e.to_string() })?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content);
        debug!(found = text.is_some(), "OpenAI completion parsed");
        Ok(text)
    }
}

#[async_trait]
impl PromptGenerator for OpenAiClient {
    async fn generate_command(
        &self,
        prompt: &str,
        context: &ContextSnapshot,
    ) -> Result<Option<String>, PromptError> {
        self.complete(&command_instructions(), &command_request_text(prompt, context)).await
    }

    async fn explain(
        &self,
        error_summary: &str,
        request_details: Option<String>,
    ) -> Result<Option<String>, PromptError> {
        self.complete(
            DEBUG_INSTRUCTIONS,
            &debug_request_text(error_summary, request_details.as_deref()),
        )
        .await
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

/// `generateContent` client.
pub struct GeminiClient {
    http_client: Box<dyn HttpClient>,
    api_key: String,
}

impl GeminiClient {
    const PROVIDER: &'static str = "Gemini";

    pub fn new(http_client: Box<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self { http_client, api_key: api_key.into() }
    }

    async fn generate(&self, text: String) -> Result<Option<String>, PromptError> {
        if self.api_key.trim().is_empty() {
            return Err(PromptError::MissingKey { provider: Self::PROVIDER });
        }
        let payload = json!({ "contents": [ { "parts": [ { "text": text } ] } ] });
        let response = post_json(
            self.http_client.as_ref(),
            Self::PROVIDER,
            GEMINI_API_URL,
            ("x-goog-api-key", self.api_key.clone()),
            payload,
        )
        .await?;

        let parsed: GeminiResponse = serde_json::from_str(&response.body)
            .map_err(|e| PromptError::Parse { provider: Self::PROVIDER, message: e.to_string() })?;
        Ok(parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text))
    }
}

#[async_trait]
impl PromptGenerator for GeminiClient {
    async fn generate_command(
        &self,
        prompt: &str,
        context: &ContextSnapshot,
    ) -> Result<Option<String>, PromptError> {
        let text = format!(
            "{}\n\n{}",
            command_instructions(),
            command_request_text(prompt, context)
        );
        self.generate(text).await
    }

    async fn explain(
        &self,
        error_summary: &str,
        request_details: Option<String>,
    ) -> Result<Option<String>, PromptError> {
        let text = format!(
            "{}\n\n{}",
            DEBUG_INSTRUCTIONS,
            debug_request_text(error_summary, request_details.as_deref())
        );
        self.generate(text).await
    }
}
