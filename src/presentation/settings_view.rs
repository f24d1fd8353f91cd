use crate::domain::settings::{AuthType, Settings};
use crate::infrastructure::output::OutputSink;
use indexmap::IndexMap;

const LABEL_WIDTH: usize = 25;

/// Shows a secret's first four characters at most.
pub fn mask(value: Option<&str>) -> String {
    match value.filter(|v| !v.trim().is_empty()) {
        None => "(not set)".to_string(),
        Some(v) if v.chars().count() <= 4 => "****".to_string(),
        Some(v) => {
            let head: String = v.chars().take(4).collect();
            format!("{}{}", head, "*".repeat(v.chars().count() - 4))
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

fn row(label: &str, value: &str) -> String {
    format!("{:<width$}: {}", label, value, width = LABEL_WIDTH)
}

fn map_block(sink: &dyn OutputSink, title: &str, map: &IndexMap<String, String>, sep: &str) {
    sink.heading(title);
    if map.is_empty() {
        sink.plain("  (none)");
    }
    for (key, value) in map {
        sink.plain(&format!("  {}{}{}", key, sep, value));
    }
    sink.plain("");
}

pub fn display_settings(settings: &Settings, location: &str, sink: &dyn OutputSink) {
    sink.info("=== Settings ===");
    sink.plain(&row("Config File", location));
    sink.plain(&row("Base URL", settings.base_url.as_deref().unwrap_or("(not set)")));
    sink.plain(&row("Default Method", &settings.default_method));
    sink.plain(&row("Auth Type", &settings.auth_type.to_string()));

    match settings.auth_type {
        AuthType::BasicAuth => {
            sink.plain(&row(
                "Username",
                settings.basic_auth_username.as_deref().unwrap_or("(not set)"),
            ));
            sink.plain(&row("Password", &mask(settings.basic_auth_password.as_deref())));
        }
        AuthType::BearerToken | AuthType::JwtBearer => {
            sink.plain(&row("Auth Token", &mask(settings.auth_token.as_deref())));
        }
        AuthType::None => {}
    }

    sink.plain(&row("Follow Redirects", yes_no(settings.follow_redirects)));
    sink.plain(&row("Show Progress", yes_no(settings.show_progress)));
    sink.plain(&row("Show Error", yes_no(settings.show_error)));
    sink.plain(&row("Show Headers", yes_no(settings.show_headers)));
    let max_time = settings
        .max_time_seconds
        .map_or_else(|| "(not set)".to_string(), |secs| secs.to_string());
    sink.plain(&row("Max Time (seconds)", &max_time));
    sink.plain(&row("Gemini API Key", &mask(settings.gemini_api_key.as_deref())));
    sink.plain(&row("OpenAI API Key", &mask(settings.open_ai_api_key.as_deref())));
    sink.plain(&row("AI Debugging", yes_no(settings.allow_ai_debugging)));
    sink.plain("");

    map_block(sink, "Default Headers:", &settings.default_headers, ": ");
    map_block(sink, "Query Parameters:", &settings.query_parameters, "=");

    sink.heading("Recent Paths:");
    if settings.recent_paths.is_empty() {
        sink.plain("  (none)");
    }
    for (i, path) in settings.recent_paths.iter().enumerate() {
        sink.plain(&format!("  {}. {}", i + 1, path));
    }
    sink.plain("");
}
