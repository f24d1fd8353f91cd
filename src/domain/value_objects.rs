use anyhow::{anyhow, Result};
use hyper::http::Uri;
use serde_json::Value;

/// Represents a validated URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url(pub Uri);

impl Url {
    /// Creates a new Url with validation
    ///
    /// # Arguments
    /// * `url` - The URL string to parse
    ///
    /// # Returns
    /// * `Ok(Url)` - Validated absolute URL
    /// * `Err(anyhow::Error)` - If the URL is invalid or lacks a scheme or host
    pub fn new(url: &str) -> Result<Self> {
        let uri = url.parse::<Uri>().map_err(|e| anyhow!("Invalid URL '{}': {}", url, e))?;
        if uri.scheme().is_none() || uri.host().is_none() {
            return Err(anyhow!("Invalid URL '{}': expected scheme and host", url));
        }
        Ok(Url(uri))
    }

    /// Returns the URL as a string
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }

    /// Resolves a `Location` header value against this URL.
    pub fn join(&self, location: &str) -> Result<Self> {
        let joined = self
            .parsed()?
            .join(location)
            .map_err(|e| anyhow!("Invalid redirect location '{}': {}", location, e))?;
        Url::new(joined.as_str())
    }

    /// Same scheme, host and effective port.
    pub fn same_origin(&self, other: &Url) -> bool {
        match (self.parsed(), other.parsed()) {
            (Ok(a), Ok(b)) => a.origin() == b.origin(),
            _ => false,
        }
    }

    fn parsed(&self) -> Result<url::Url> {
        let raw = self.as_str();
        url::Url::parse(&raw).map_err(|e| anyhow!("Invalid URL '{}': {}", raw, e))
    }
}

/// Represents a validated JSON body
#[derive(Debug, Clone)]
pub struct JsonBody(pub String);

impl JsonBody {
    /// Creates a new JsonBody with validation
    ///
    /// # Arguments
    /// * `json` - The JSON string to validate
    ///
    /// # Returns
    /// * `Ok(JsonBody)` - Validated JSON
    /// * `Err(anyhow::Error)` - If the JSON is invalid
    pub fn new(json: &str) -> Result<Self> {
        serde_json::from_str::<Value>(json)
            .map_err(|e| anyhow!("Invalid JSON: {}", e))?;
        Ok(JsonBody(json.to_string()))
    }
}

/// Transport-agnostic description of how a request authenticates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthArtifact {
    None,
    HeaderAuth { name: String, value: String },
    BasicCredential { username: String, password: String },
}
