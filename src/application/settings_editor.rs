use crate::application::builders::request_builder::parse_header;
use crate::domain::entities::Method;
use crate::domain::errors::ConfigError;
use crate::domain::settings::{AuthType, Settings};

/// A single field change requested from the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsEdit {
    BaseUrl(String),
    Method(String),
    AuthType(String),
    AuthToken(String),
    Username(String),
    Password(String),
    FollowRedirects(bool),
    ShowProgress(bool),
    ShowError(bool),
    ShowHeaders(bool),
    MaxTime(i64),
    AddHeader(String),
    RemoveHeader(String),
    AddQuery(String),
    RemoveQuery(String),
    GeminiKey(String),
    OpenAiKey(String),
    AiDebugging(bool),
}

fn required(value: &str, field: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::InvalidEdit(format!("{} cannot be empty", field)));
    }
    Ok(trimmed.to_string())
}

/// Blank input clears an optional field.
fn optional(value: &str) -> Option<String> {
    Some(value.trim().to_string()).filter(|v| !v.is_empty())
}

impl SettingsEdit {
    /// One-line confirmation shown after the edit is saved.
    pub fn describe(&self) -> String {
        match self {
            SettingsEdit::BaseUrl(v) => format!("Base URL set to {}", v.trim()),
            SettingsEdit::Method(v) => format!("Default method set to {}", v.trim().to_uppercase()),
            SettingsEdit::AuthType(v) => format!("Auth type set to {}", v.trim()),
            SettingsEdit::AuthToken(_) => "Auth token updated".to_string(),
            SettingsEdit::Username(v) => format!("Username set to {}", v.trim()),
            SettingsEdit::Password(_) => "Password updated".to_string(),
            SettingsEdit::FollowRedirects(v) => format!("Follow redirects set to {}", v),
            SettingsEdit::ShowProgress(v) => format!("Show progress set to {}", v),
            SettingsEdit::ShowError(v) => format!("Show error set to {}", v),
            SettingsEdit::ShowHeaders(v) => format!("Show headers set to {}", v),
            SettingsEdit::MaxTime(0) => "Max time cleared".to_string(),
            SettingsEdit::MaxTime(v) => format!("Max time set to {} seconds", v),
            SettingsEdit::AddHeader(v) => format!("Default header '{}' saved", v.trim()),
            SettingsEdit::RemoveHeader(v) => format!("Default header '{}' removed", v.trim()),
            SettingsEdit::AddQuery(v) => format!("Query parameter '{}' saved", v.trim()),
            SettingsEdit::RemoveQuery(v) => format!("Query parameter '{}' removed", v.trim()),
            SettingsEdit::GeminiKey(_) => "Gemini API key updated".to_string(),
            SettingsEdit::OpenAiKey(_) => "OpenAI API key updated".to_string(),
            SettingsEdit::AiDebugging(v) => format!("AI debugging set to {}", v),
        }
    }

    pub fn apply(&self, settings: &mut Settings) -> Result<(), ConfigError> {
        match self {
            SettingsEdit::BaseUrl(v) => settings.base_url = Some(required(v, "Base URL")?),
            SettingsEdit::Method(v) => {
                settings.default_method = v.parse::<Method>()?.to_string();
            }
            SettingsEdit::AuthType(v) => settings.auth_type = v.parse::<AuthType>()?,
            SettingsEdit::AuthToken(v) => settings.auth_token = optional(v),
            SettingsEdit::Username(v) => settings.basic_auth_username = optional(v),
            SettingsEdit::Password(v) => settings.basic_auth_password = optional(v),
            SettingsEdit::FollowRedirects(v) => settings.follow_redirects = *v,
            SettingsEdit::ShowProgress(v) => settings.show_progress = *v,
            SettingsEdit::ShowError(v) => settings.show_error = *v,
            SettingsEdit::ShowHeaders(v) => settings.show_headers = *v,
            SettingsEdit::MaxTime(0) => settings.max_time_seconds = None,
            SettingsEdit::MaxTime(v) if *v < 0 => return Err(ConfigError::InvalidMaxTime(*v)),
            SettingsEdit::MaxTime(v) => settings.max_time_seconds = Some(*v),
            SettingsEdit::AddHeader(raw) => {
                let (name, value) =
                    parse_header(raw).map_err(|e| ConfigError::InvalidEdit(e.to_string()))?;
                settings.default_headers.insert(name, value);
            }
            SettingsEdit::RemoveHeader(name) => {
                let name = name.trim();
                let key = settings
                    .default_headers
                    .keys()
                    .find(|k| k.eq_ignore_ascii_case(name))
                    .cloned()
                    .ok_or_else(|| {
                        ConfigError::InvalidEdit(format!("No default header named '{}'", name))
                    })?;
                settings.default_headers.shift_remove(&key);
            }
            SettingsEdit::AddQuery(raw) => {
                let (key, value) = raw
                    .split_once('=')
                    .filter(|(k, _)| !k.trim().is_empty())
                    .ok_or_else(|| {
                        ConfigError::InvalidEdit(format!(
                            "Invalid query parameter: '{}'. Use 'key=value'",
                            raw
                        ))
                    })?;
                settings
                    .query_parameters
                    .insert(key.trim().to_string(), value.trim().to_string());
            }
            SettingsEdit::RemoveQuery(key) => {
                settings.query_parameters.shift_remove(key.trim()).ok_or_else(|| {
                    ConfigError::InvalidEdit(format!("No query parameter named '{}'", key.trim()))
                })?;
            }
            SettingsEdit::GeminiKey(v) => settings.gemini_api_key = optional(v),
            SettingsEdit::OpenAiKey(v) => settings.open_ai_api_key = optional(v),
            SettingsEdit::AiDebugging(v) => settings.allow_ai_debugging = *v,
        }
        Ok(())
    }
}

/// Applies every edit to a copy; the original is untouched if any fails.
pub fn apply_all(settings: &Settings, edits: &[SettingsEdit]) -> Result<Settings, ConfigError> {
    let mut updated = settings.clone();
    for edit in edits {
        edit.apply(&mut updated)?;
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_is_validated_and_normalized() {
        let mut settings = Settings::default();
        SettingsEdit::Method("patch".into()).apply(&mut settings).unwrap();
        assert_eq!(settings.default_method, "PATCH");
        assert!(SettingsEdit::Method("BREW".into()).apply(&mut settings).is_err());
        assert_eq!(settings.default_method, "PATCH");
    }

    #[test]
    fn headers_are_added_and_removed_case_insensitively() {
        let mut settings = Settings::default();
        SettingsEdit::AddHeader("X-Api-Key: abc".into()).apply(&mut settings).unwrap();
        assert_eq!(settings.default_headers["X-Api-Key"], "abc");
        SettingsEdit::RemoveHeader("user-agent".into()).apply(&mut settings).unwrap();
        assert!(!settings.default_headers.contains_key("User-Agent"));
        assert!(SettingsEdit::AddHeader("broken".into()).apply(&mut settings).is_err());
        assert!(SettingsEdit::RemoveHeader("nope".into()).apply(&mut settings).is_err());
    }

    #[test]
    fn query_parameters_use_key_value_syntax() {
        let mut settings = Settings::default();
        SettingsEdit::AddQuery("page=2".into()).apply(&mut settings).unwrap();
        SettingsEdit::AddQuery("filter=a=b".into()).apply(&mut settings).unwrap();
        assert_eq!(settings.query_parameters["filter"], "a=b");
        SettingsEdit::RemoveQuery("page".into()).apply(&mut settings).unwrap();
        assert_eq!(settings.query_parameters.len(), 1);
        assert!(SettingsEdit::AddQuery("=x".into()).apply(&mut settings).is_err());
    }

    #[test]
    fn max_time_zero_clears_and_negative_fails() {
        let mut settings = Settings::default();
        SettingsEdit::MaxTime(15).apply(&mut settings).unwrap();
        assert_eq!(settings.max_time_seconds, Some(15));
        SettingsEdit::MaxTime(0).apply(&mut settings).unwrap();
        assert_eq!(settings.max_time_seconds, None);
        assert_eq!(
            SettingsEdit::MaxTime(-1).apply(&mut settings),
            Err(ConfigError::InvalidMaxTime(-1))
        );
    }

    #[test]
    fn apply_all_is_all_or_nothing() {
        let settings = Settings::default();
        let edits = vec![
            SettingsEdit::BaseUrl("http://h".into()),
            SettingsEdit::AuthType("kerberos".into()),
        ];
        assert!(apply_all(&settings, &edits).is_err());
        assert_eq!(settings.base_url, None);

        let edits = vec![
            SettingsEdit::BaseUrl(" http://h ".into()),
            SettingsEdit::AuthType("basic".into()),
            SettingsEdit::Username("alice".into()),
            SettingsEdit::Password("".into()),
        ];
        let updated = apply_all(&settings, &edits).unwrap();
        assert_eq!(updated.base_url.as_deref(), Some("http://h"));
        assert_eq!(updated.auth_type, AuthType::BasicAuth);
        assert_eq!(updated.basic_auth_password, None);
    }

    #[test]
    fn blank_base_url_is_rejected() {
        let mut settings = Settings::default();
        assert!(SettingsEdit::BaseUrl("  ".into()).apply(&mut settings).is_err());
    }
}
