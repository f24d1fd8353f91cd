use crate::domain::settings::Settings;

/// Derives the outbound URL from the settings.
///
/// Both the rendered command and the executed request go through here, so
/// they always target the same URL.
pub struct UrlComposer;

impl UrlComposer {
    pub fn compose(settings: &Settings, path_override: Option<&str>) -> String {
        let base = settings.base_url.as_deref().unwrap_or_default();
        let base = base.strip_suffix('/').unwrap_or(base);

        let mut url = format!("{}{}", base, Self::resolve_path(settings, path_override));

        if !settings.query_parameters.is_empty() {
            let query = settings
                .query_parameters
                .iter()
                .map(|(key, value)| {
                    format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
                })
                .collect::<Vec<_>>()
                .join("&");
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query);
        }

        url
    }

    fn resolve_path(settings: &Settings, path_override: Option<&str>) -> String {
        let path = path_override
            .filter(|p| !p.trim().is_empty())
            .or_else(|| settings.recent_paths.first().map(String::as_str))
            .unwrap_or_default();

        if path.is_empty() {
            return String::new();
        }
        if path.starts_with('/') {
            encode_path(path)
        } else {
            encode_path(&format!("/{}", path))
        }
    }
}

/// Percent-encodes characters a request target cannot carry, leaving
/// existing escapes and any `?query` suffix in place.
fn encode_path(path: &str) -> String {
    let Ok(mut scratch) = url::Url::parse("http://localhost/") else {
        return path.to_string();
    };
    let (path_part, query) = match path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path, None),
    };
    scratch.set_path(path_part);
    scratch.set_query(query);

    let mut encoded = scratch.path().to_string();
    if let Some(query) = scratch.query() {
        encoded.push('?');
        encoded.push_str(query);
    }
    encoded
}
