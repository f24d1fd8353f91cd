use crate::application::auth::AuthApplier;
use crate::application::url_composer::UrlComposer;
use crate::domain::entities::Method;
use crate::domain::settings::Settings;

const PROGRAM: &str = "curl";

/// Renders the settings as a single-line curl invocation.
///
/// Header and credential values are wrapped in double quotes without
/// escaping, so a value containing `"` yields a command the shell will
/// split differently.
pub struct CommandRenderer;

impl CommandRenderer {
    pub fn render(settings: &Settings, path_override: Option<&str>) -> String {
        let mut parts = vec![PROGRAM.to_string()];

        let method = settings.method();
        if method != Method::Get {
            parts.push(format!("-X {}", method));
        }

        if let Some(flag) = AuthApplier::apply(settings).command_flag() {
            parts.push(flag);
        }

        parts.extend(
            settings
                .default_headers
                .iter()
                .map(|(name, value)| format!("-H \"{}: {}\"", name, value)),
        );

        if settings.follow_redirects {
            parts.push("-L".to_string());
        }
        if settings.show_progress {
            parts.push("--progress-bar".to_string());
        }
        if settings.show_error {
            parts.push("--show-error".to_string());
        }
        if settings.show_headers {
            parts.push("-i".to_string());
        }
        if let Some(secs) = settings.max_time_seconds {
            parts.push(format!("--max-time {}", secs));
        }

        parts.push(format!("\"{}\"", UrlComposer::compose(settings, path_override)));
        parts.join(" ")
    }
}
