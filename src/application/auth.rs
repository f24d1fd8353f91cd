use crate::domain::settings::{non_blank, AuthType, Settings};
use crate::domain::value_objects::AuthArtifact;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Derives the auth artifact from the configured auth type.
///
/// Incomplete credentials yield `AuthArtifact::None`; `Settings::validate`
/// is the gate that reports them.
pub struct AuthApplier;

impl AuthApplier {
    pub fn apply(settings: &Settings) -> AuthArtifact {
        match settings.auth_type {
            AuthType::None => AuthArtifact::None,
            AuthType::BearerToken | AuthType::JwtBearer => match non_blank(&settings.auth_token) {
                Some(token) => AuthArtifact::HeaderAuth {
                    name: "Authorization".to_string(),
                    value: format!("Bearer {}", token),
                },
                None => AuthArtifact::None,
            },
            AuthType::BasicAuth => match non_blank(&settings.basic_auth_username) {
                Some(username) => AuthArtifact::BasicCredential {
                    username: username.to_string(),
                    password: settings.basic_auth_password.clone().unwrap_or_default(),
                },
                None => AuthArtifact::None,
            },
        }
    }
}

impl AuthArtifact {
    /// `user:password`, or just `user` when no password is set.
    pub fn credential_string(username: &str, password: &str) -> String {
        if password.trim().is_empty() {
            username.to_string()
        } else {
            format!("{}:{}", username, password)
        }
    }

    /// Command-line flag form: `-H "Name: value"` or `-u "user:pass"`.
    pub fn command_flag(&self) -> Option<String> {
        match self {
            AuthArtifact::None => None,
            AuthArtifact::HeaderAuth { name, value } => Some(format!("-H \"{}: {}\"", name, value)),
            AuthArtifact::BasicCredential { username, password } => Some(format!(
                "-u \"{}\"",
                Self::credential_string(username, password)
            )),
        }
    }

    /// Request header form, base64-encoding basic credentials.
    pub fn header(&self) -> Option<(String, String)> {
        match self {
            AuthArtifact::None => None,
            AuthArtifact::HeaderAuth { name, value } => Some((name.clone(), value.clone())),
            AuthArtifact::BasicCredential { username, password } => {
                let encoded = STANDARD.encode(Self::credential_string(username, password));
                Some(("Authorization".to_string(), format!("Basic {}", encoded)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_auth(auth_type: AuthType) -> Settings {
        Settings { auth_type, ..Settings::default() }
    }

    #[test]
    fn none_ignores_stored_credentials() {
        let settings = Settings {
            auth_token: Some("t".into()),
            basic_auth_username: Some("u".into()),
            ..with_auth(AuthType::None)
        };
        assert_eq!(AuthApplier::apply(&settings), AuthArtifact::None);
    }

    #[test]
    fn bearer_and_jwt_produce_authorization_header() {
        for auth_type in [AuthType::BearerToken, AuthType::JwtBearer] {
            let settings = Settings { auth_token: Some("abc".into()), ..with_auth(auth_type) };
            let artifact = AuthApplier::apply(&settings);
            assert_eq!(
                artifact.header(),
                Some(("Authorization".to_string(), "Bearer abc".to_string()))
            );
            assert_eq!(
                artifact.command_flag().as_deref(),
                Some("-H \"Authorization: Bearer abc\"")
            );
        }
    }

    #[test]
    fn missing_token_is_silently_omitted() {
        assert_eq!(AuthApplier::apply(&with_auth(AuthType::BearerToken)), AuthArtifact::None);
        let blank = Settings { auth_token: Some(" ".into()), ..with_auth(AuthType::JwtBearer) };
        assert_eq!(AuthApplier::apply(&blank), AuthArtifact::None);
    }

    #[test]
    fn basic_credential_renders_both_ways() {
        let settings = Settings {
            basic_auth_username: Some("u".into()),
            basic_auth_password: Some("p".into()),
            ..with_auth(AuthType::BasicAuth)
        };
        let artifact = AuthApplier::apply(&settings);
        assert_eq!(artifact.command_flag().as_deref(), Some("-u \"u:p\""));
        assert_eq!(
            artifact.header(),
            Some(("Authorization".to_string(), format!("Basic {}", STANDARD.encode("u:p"))))
        );
    }

    #[test]
    fn username_only_credential_is_valid() {
        let settings = Settings {
            basic_auth_username: Some("u".into()),
            ..with_auth(AuthType::BasicAuth)
        };
        let artifact = AuthApplier::apply(&settings);
        assert_eq!(
            artifact,
            AuthArtifact::BasicCredential { username: "u".into(), password: String::new() }
        );
        assert_eq!(artifact.command_flag().as_deref(), Some("-u \"u\""));
    }

    #[test]
    fn basic_without_username_yields_none() {
        assert_eq!(AuthApplier::apply(&with_auth(AuthType::BasicAuth)), AuthArtifact::None);
    }
}
