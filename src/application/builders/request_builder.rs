use crate::application::auth::AuthApplier;
use crate::application::url_composer::UrlComposer;
use crate::domain::entities::{Method, Request};
use crate::domain::settings::Settings;
use crate::domain::value_objects::{AuthArtifact, JsonBody, Url};
use anyhow::{anyhow, Result};

/// Splits a raw `Key: Value` header into trimmed parts.
pub fn parse_header(raw: &str) -> Result<(String, String)> {
    match raw.split_once(':') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(anyhow!("Invalid header format: '{}'. Use 'Key: Value'", raw)),
    }
}

#[derive(Default)]
pub struct RequestBuilder {
    method: Option<Method>,
    url: Option<Url>,
    headers: Vec<(String, String)>,
    body: Option<JsonBody>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the request described by the settings: composed URL, stored
    /// method, default headers, then the auth header.
    pub fn from_settings(settings: &Settings, path_override: Option<&str>) -> Result<Request> {
        RequestBuilder::new()
            .method(settings.method())
            .url(&UrlComposer::compose(settings, path_override))?
            .headers(settings.default_headers.iter())
            .auth(&AuthApplier::apply(settings))
            .build()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn url(mut self, raw_url: &str) -> Result<Self> {
        self.url = Some(Url::new(raw_url)?);
        Ok(self)
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn headers<'a>(
        mut self,
        headers: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> Self {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Applies the auth artifact, replacing any `Authorization` default header.
    pub fn auth(mut self, artifact: &AuthArtifact) -> Self {
        if let Some((name, value)) = artifact.header() {
            self.headers.retain(|(key, _)| !key.eq_ignore_ascii_case(&name));
            self.headers.push((name, value));
        }
        self
    }

    pub fn body(mut self, json: Option<&str>) -> Result<Self> {
        if let Some(data) = json {
            self.body = Some(JsonBody::new(data)?);
        }
        Ok(self)
    }

    pub fn build(self) -> Result<Request> {
        Ok(Request {
            method: self.method.unwrap_or_default(),
            url: self.url.ok_or_else(|| anyhow!("URL is required"))?,
            headers: self.headers,
            body: self.body,
        })
    }
}
