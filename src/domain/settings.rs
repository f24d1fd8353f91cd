use crate::domain::entities::Method;
use crate::domain::errors::ConfigError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How outbound requests authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AuthType {
    #[default]
    None,
    BearerToken,
    BasicAuth,
    JwtBearer,
}

impl FromStr for AuthType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(AuthType::None),
            "bearer" | "bearertoken" | "bearer-token" => Ok(AuthType::BearerToken),
            "basic" | "basicauth" | "basic-auth" => Ok(AuthType::BasicAuth),
            "jwt" | "jwtbearer" | "jwt-bearer" => Ok(AuthType::JwtBearer),
            other => Err(ConfigError::InvalidEdit(format!(
                "Unknown auth type '{}'. Expected one of: none, bearer, basic, jwt",
                other
            ))),
        }
    }
}

impl fmt::Display for AuthType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AuthType::None => "None",
            AuthType::BearerToken => "BearerToken",
            AuthType::BasicAuth => "BasicAuth",
            AuthType::JwtBearer => "JwtBearer",
        };
        f.write_str(label)
    }
}

/// The persisted configuration record.
///
/// Loaded once per invocation and treated as an immutable value while a
/// command is rendered or a request is executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub base_url: Option<String>,
    pub default_method: String,
    pub recent_paths: Vec<String>,
    pub auth_type: AuthType,
    pub auth_token: Option<String>,
    pub basic_auth_username: Option<String>,
    pub basic_auth_password: Option<String>,
    pub follow_redirects: bool,
    pub show_progress: bool,
    pub show_error: bool,
    pub show_headers: bool,
    pub max_time_seconds: Option<i64>,
    pub default_headers: IndexMap<String, String>,
    pub query_parameters: IndexMap<String, String>,
    pub gemini_api_key: Option<String>,
    pub open_ai_api_key: Option<String>,
    pub allow_ai_debugging: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let mut default_headers = IndexMap::new();
        default_headers.insert("Accept".to_string(), "application/json".to_string());
        default_headers.insert("Content-Type".to_string(), "application/json".to_string());
        default_headers.insert(
            "User-Agent".to_string(),
            format!("reqsmith/{}", env!("CARGO_PKG_VERSION")),
        );

        Self {
            base_url: None,
            default_method: Method::Get.to_string(),
            recent_paths: Vec::new(),
            auth_type: AuthType::None,
            auth_token: None,
            basic_auth_username: None,
            basic_auth_password: None,
            follow_redirects: true,
            show_progress: false,
            show_error: true,
            show_headers: true,
            max_time_seconds: None,
            default_headers,
            query_parameters: IndexMap::new(),
            gemini_api_key: None,
            open_ai_api_key: None,
            allow_ai_debugging: false,
        }
    }
}

/// Returns the value when it holds anything besides whitespace.
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl Settings {
    /// Checks that a request can be composed from these settings.
    ///
    /// `path_override` satisfies the path requirement when no recent path
    /// has been stored yet.
    pub fn validate(&self, path_override: Option<&str>) -> Result<(), ConfigError> {
        let base_url = non_blank(&self.base_url).ok_or(ConfigError::MissingBaseUrl)?;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidBaseUrl(base_url.to_string()));
        }

        let has_override = path_override.is_some_and(|p| !p.trim().is_empty());
        if !has_override && self.recent_paths.is_empty() {
            return Err(ConfigError::MissingPath);
        }

        Method::from_str(&self.default_method)?;

        match self.auth_type {
            AuthType::None => {}
            AuthType::BasicAuth => {
                non_blank(&self.basic_auth_username).ok_or(ConfigError::MissingUsername)?;
            }
            AuthType::BearerToken | AuthType::JwtBearer => {
                non_blank(&self.auth_token)
                    .ok_or_else(|| ConfigError::MissingToken(self.auth_type.to_string()))?;
            }
        }

        match self.max_time_seconds {
            Some(secs) if secs <= 0 => Err(ConfigError::InvalidMaxTime(secs)),
            _ => Ok(()),
        }
    }

    /// Moves `path` to the front of the recent list, inserting it if new.
    pub fn add_recent_path(&mut self, path: &str) {
        if path.trim().is_empty() {
            return;
        }
        self.recent_paths.retain(|existing| existing != path);
        self.recent_paths.insert(0, path.to_string());
    }

    pub fn method(&self) -> Method {
        Method::parse_lenient(&self.default_method)
    }

    pub fn has_ai_key(&self) -> bool {
        non_blank(&self.gemini_api_key).is_some() || non_blank(&self.open_ai_api_key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Settings {
        Settings {
            base_url: Some("http://localhost:5000".into()),
            recent_paths: vec!["/api/users".into()],
            ..Settings::default()
        }
    }

    #[test]
    fn defaults_seed_headers_and_flags() {
        let settings = Settings::default();
        assert_eq!(settings.default_method, "GET");
        assert!(settings.follow_redirects);
        assert!(!settings.show_progress);
        assert!(settings.show_error);
        assert!(settings.show_headers);
        let names: Vec<_> = settings.default_headers.keys().cloned().collect();
        assert_eq!(names, vec!["Accept", "Content-Type", "User-Agent"]);
    }

    #[test]
    fn recent_paths_move_to_front_without_duplicates() {
        let mut settings = Settings::default();
        settings.add_recent_path("/a");
        settings.add_recent_path("/b");
        settings.add_recent_path("/a");
        assert_eq!(settings.recent_paths, vec!["/a", "/b"]);

        settings.add_recent_path("   ");
        assert_eq!(settings.recent_paths.len(), 2);
    }

    #[test]
    fn validation_requires_base_url() {
        let settings = Settings { base_url: None, ..valid() };
        let err = settings.validate(None).unwrap_err();
        assert!(err.to_string().contains("Base URL"));

        let settings = Settings { base_url: Some("  ".into()), ..valid() };
        assert_eq!(settings.validate(None), Err(ConfigError::MissingBaseUrl));

        let settings = Settings { base_url: Some("ftp://h".into()), ..valid() };
        assert!(settings.validate(None).unwrap_err().to_string().contains("Base URL"));
    }

    #[test]
    fn validation_requires_a_path_unless_overridden() {
        let settings = Settings { recent_paths: vec![], ..valid() };
        assert_eq!(settings.validate(None), Err(ConfigError::MissingPath));
        assert_eq!(settings.validate(Some(" ")), Err(ConfigError::MissingPath));
        assert!(settings.validate(Some("/x")).is_ok());
    }

    #[test]
    fn validation_checks_auth_fields() {
        let settings = Settings { auth_type: AuthType::BasicAuth, ..valid() };
        let err = settings.validate(None).unwrap_err();
        assert!(err.to_string().contains("username"));

        let settings = Settings {
            auth_type: AuthType::BasicAuth,
            basic_auth_username: Some("u".into()),
            ..valid()
        };
        assert!(settings.validate(None).is_ok());

        let settings = Settings { auth_type: AuthType::JwtBearer, ..valid() };
        assert!(settings.validate(None).unwrap_err().to_string().contains("token"));
    }

    #[test]
    fn validation_rejects_bad_method_and_timeout() {
        let settings = Settings { default_method: "FETCH".into(), ..valid() };
        assert_eq!(
            settings.validate(None),
            Err(ConfigError::InvalidMethod("FETCH".into()))
        );

        let settings = Settings { max_time_seconds: Some(0), ..valid() };
        assert_eq!(settings.validate(None), Err(ConfigError::InvalidMaxTime(0)));
    }

    #[test]
    fn round_trips_through_json_with_camel_case() {
        let mut settings = valid();
        settings.query_parameters.insert("z".into(), "1".into());
        settings.query_parameters.insert("a".into(), "2".into());
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"baseUrl\""));
        assert!(json.contains("\"openAiApiKey\""));
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"baseUrl":"http://h"}"#).unwrap();
        assert_eq!(settings.base_url.as_deref(), Some("http://h"));
        assert!(settings.follow_redirects);
        assert_eq!(settings.default_headers.len(), 3);
    }

    #[test]
    fn auth_type_parses_aliases() {
        assert_eq!("bearer".parse::<AuthType>().unwrap(), AuthType::BearerToken);
        assert_eq!("BasicAuth".parse::<AuthType>().unwrap(), AuthType::BasicAuth);
        assert_eq!("jwt".parse::<AuthType>().unwrap(), AuthType::JwtBearer);
        assert!("oauth".parse::<AuthType>().is_err());
    }
}
