use crate::domain::entities::{HeaderEntry, Response};
use crate::domain::errors::{ErrorKind, ExecutionError};
use crate::domain::settings::Settings;
use crate::infrastructure::output::OutputSink;
use serde_json::Value;

/// A response laid out for display and for saving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedOutput {
    pub status: String,
    pub success: bool,
    pub headers: Option<Vec<String>>,
    pub body: String,
}

impl RenderedOutput {
    pub fn emit(&self, sink: &dyn OutputSink) {
        if self.success {
            sink.success(&self.status);
        } else {
            sink.error(&self.status);
        }
        sink.plain("");

        if let Some(headers) = &self.headers {
            sink.heading("Response Headers:");
            for line in headers {
                sink.plain(line);
            }
            sink.plain("");
        }

        sink.heading("Response Body:");
        sink.plain(&self.body);
        sink.plain("");
    }

    /// Plain-text form written to a response artifact.
    pub fn to_plain_text(&self) -> String {
        let mut out = vec![self.status.clone(), String::new()];
        if let Some(headers) = &self.headers {
            out.push("Response Headers:".to_string());
            out.extend(headers.iter().cloned());
            out.push(String::new());
        }
        out.push("Response Body:".to_string());
        out.push(self.body.clone());
        out.push(String::new());
        out.join("\n")
    }
}

pub struct ResultPresenter;

impl ResultPresenter {
    pub fn present(response: &Response, settings: &Settings) -> RenderedOutput {
        let status = format!("Status: {} {}", response.status.as_u16(), response.reason)
            .trim_end()
            .to_string();

        let headers = settings.show_headers.then(|| {
            response
                .headers
                .iter()
                .chain(response.content_headers.iter())
                .map(format_header)
                .collect()
        });

        RenderedOutput {
            status,
            success: response.is_success(),
            headers,
            body: format_body(response),
        }
    }

    /// Single error line, or `None` when errors are hidden.
    pub fn present_error(error: &ExecutionError, settings: &Settings) -> Option<String> {
        if !settings.show_error {
            return None;
        }
        let label = match error.kind {
            ErrorKind::Transport => "HTTP Request Error",
            ErrorKind::Timeout => "Request Timeout",
            ErrorKind::Unexpected => "Error",
        };
        Some(format!("{}: {}", label, error.message))
    }
}

fn format_header((name, values): &HeaderEntry) -> String {
    format!("  {}: {}", display_name(name), values.join(", "))
}

/// `x-request-id` -> `X-Request-Id`. The transport lowercases header names,
/// so the server's own casing is not available.
fn display_name(name: &str) -> String {
    name.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("-")
}

/// Pretty-prints JSON bodies; anything else, including JSON that fails to
/// parse, is shown verbatim.
fn format_body(response: &Response) -> String {
    let is_json = response
        .content_type()
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"));
    if !is_json || response.body.trim().is_empty() {
        return response.body.clone();
    }
    serde_json::from_str::<Value>(&response.body)
        .ok()
        .and_then(|json| serde_json::to_string_pretty(&json).ok())
        .unwrap_or_else(|| response.body.clone())
}
