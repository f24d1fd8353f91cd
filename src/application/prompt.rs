//! Seam between the request pipeline and language-model collaborators.
//!
//! Generators never see credentials. They receive a [`ContextSnapshot`] with
//! secrets masked and emit [`CREDENTIAL_PLACEHOLDER`] wherever a credential
//! belongs; [`substitute_credentials`] puts the real value back.

use crate::application::url_composer::UrlComposer;
use crate::domain::entities::Response;
use crate::domain::errors::ExecutionError;
use crate::domain::settings::{non_blank, AuthType, Settings};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Token a generator emits in place of a credential it cannot know.
pub const CREDENTIAL_PLACEHOLDER: &str = "REPLACEME";

const SENSITIVE_HEADERS: [&str; 5] =
    ["Authorization", "X-API-Key", "X-Auth-Token", "Cookie", "X-CSRF-Token"];

pub fn is_sensitive_header(name: &str) -> bool {
    SENSITIVE_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(name))
}

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("{provider} API key is not configured")]
    MissingKey { provider: &'static str },
    #[error("{provider} API authentication failed. Check your API key.")]
    Unauthorized { provider: &'static str },
    #[error("{provider} API permission denied. Check that the key may use this model.")]
    Forbidden { provider: &'static str },
    #[error("{provider} API rate limit exceeded. Wait a moment and try again.")]
    RateLimited { provider: &'static str },
    #[error("{provider} API error ({status}): {body}")]
    Api { provider: &'static str, status: u16, body: String },
    #[error("Failed to communicate with {provider} API: {message}")]
    Transport { provider: &'static str, message: String },
    #[error("Failed to parse {provider} API response: {message}")]
    Parse { provider: &'static str, message: String },
}

/// Settings as shown to a generator: shape and flags, never secrets.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSnapshot {
    pub base_url: String,
    pub default_method: String,
    pub auth_type: String,
    pub has_auth_token: bool,
    pub has_basic_auth_username: bool,
    pub has_basic_auth_password: bool,
    pub follow_redirects: bool,
    pub show_progress: bool,
    pub show_error: bool,
    pub show_headers: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_time_seconds: Option<i64>,
    pub default_headers: IndexMap<String, String>,
    pub query_parameters: IndexMap<String, String>,
    pub recent_paths: Vec<String>,
}

impl ContextSnapshot {
    pub fn from_settings(settings: &Settings) -> Self {
        let default_headers = settings
            .default_headers
            .iter()
            .map(|(name, value)| {
                let shown = if is_sensitive_header(name) {
                    CREDENTIAL_PLACEHOLDER.to_string()
                } else {
                    value.clone()
                };
                (name.clone(), shown)
            })
            .collect();

        Self {
            base_url: non_blank(&settings.base_url).unwrap_or("NOT_SET").to_string(),
            default_method: settings.method().to_string(),
            auth_type: settings.auth_type.to_string(),
            has_auth_token: non_blank(&settings.auth_token).is_some(),
            has_basic_auth_username: non_blank(&settings.basic_auth_username).is_some(),
            has_basic_auth_password: non_blank(&settings.basic_auth_password).is_some(),
            follow_redirects: settings.follow_redirects,
            show_progress: settings.show_progress,
            show_error: settings.show_error,
            show_headers: settings.show_headers,
            max_time_seconds: settings.max_time_seconds,
            default_headers,
            query_parameters: settings.query_parameters.clone(),
            recent_paths: settings.recent_paths.clone(),
        }
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Replaces the placeholder with the configured credential, if any.
pub fn substitute_credentials(text: &str, settings: &Settings) -> String {
    let credential = match settings.auth_type {
        AuthType::BearerToken | AuthType::JwtBearer => {
            non_blank(&settings.auth_token).map(str::to_string)
        }
        AuthType::BasicAuth => non_blank(&settings.basic_auth_username).map(|user| {
            match non_blank(&settings.basic_auth_password) {
                Some(password) => format!("{}:{}", user, password),
                None => user.to_string(),
            }
        }),
        AuthType::None => None,
    };

    match credential {
        Some(value) => text.replace(CREDENTIAL_PLACEHOLDER, &value),
        None => text.to_string(),
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PromptGenerator: Send + Sync {
    async fn generate_command(
        &self,
        prompt: &str,
        context: &ContextSnapshot,
    ) -> Result<Option<String>, PromptError>;

    async fn explain(
        &self,
        error_summary: &str,
        request_details: Option<String>,
    ) -> Result<Option<String>, PromptError>;
}

/// Drives a generator on behalf of the CLI.
pub struct AiAssistant {
    generator: Box<dyn PromptGenerator>,
}

impl AiAssistant {
    pub fn new(generator: Box<dyn PromptGenerator>) -> Self {
        Self { generator }
    }

    /// Asks for a command; blank output counts as none.
    pub async fn generate_command(
        &self,
        prompt: &str,
        settings: &Settings,
    ) -> Result<Option<String>, PromptError> {
        let context = ContextSnapshot::from_settings(settings);
        let generated = self.generator.generate_command(prompt, &context).await?;
        Ok(generated
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .map(|text| substitute_credentials(&text, settings)))
    }

    /// Best-effort troubleshooting suggestions for a failed request.
    ///
    /// Returns `None` when debugging is disabled, no key is configured, or
    /// the generator fails.
    pub async fn explain_failure(
        &self,
        error_summary: &str,
        settings: &Settings,
        path_override: Option<&str>,
    ) -> Option<String> {
        if !settings.allow_ai_debugging || !settings.has_ai_key() {
            return None;
        }
        let details = request_details(settings, path_override);
        match self.generator.explain(error_summary, Some(details)).await {
            Ok(text) => text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
            Err(err) => {
                warn!(error = %err, "debug suggestions unavailable");
                None
            }
        }
    }
}

/// Summary of what was attempted, with header names but no values.
pub fn request_details(settings: &Settings, path_override: Option<&str>) -> String {
    let mut details = vec![
        format!("URL: {}", UrlComposer::compose(settings, path_override)),
        format!("Method: {}", settings.method()),
        format!("Auth Type: {}", settings.auth_type),
    ];
    if let Some(secs) = settings.max_time_seconds {
        details.push(format!("Timeout: {} seconds", secs));
    }
    if !settings.default_headers.is_empty() {
        let names: Vec<&str> = settings.default_headers.keys().map(String::as_str).collect();
        details.push(format!("Headers: {}", names.join(", ")));
    }
    debug!(lines = details.len(), "built request details");
    details.join("\n")
}

/// Error summary for a failed execution or an error-status response.
pub fn failure_summary(result: &Result<Response, ExecutionError>) -> Option<String> {
    match result {
        Err(err) => Some(err.to_string()),
        Ok(response) if response.status.as_u16() >= 400 => Some(format!(
            "HTTP {} {}",
            response.status.as_u16(),
            response.reason
        )),
        Ok(_) => None,
    }
}
