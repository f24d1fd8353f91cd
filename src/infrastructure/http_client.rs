use crate::application::prompt::is_sensitive_header;
use crate::application::services::HttpClient;
use crate::domain::entities::{HeaderEntry, Method as DomainMethod, Request, Response};
use crate::domain::errors::TransportError;
use crate::domain::value_objects::JsonBody;

use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::{Method, Request as HyperRequest};
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::error::Error as StdError;
use tracing::{debug, trace};

/// Header names the transport manages itself.
const RESERVED_HEADERS: [&str; 4] = ["host", "content-length", "transfer-encoding", "connection"];

/// Response headers that describe the body rather than the exchange.
const CONTENT_HEADERS: [&str; 4] = ["expires", "last-modified", "allow", "content-md5"];

type HttpsClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Infrastructure implementation of HttpClient using Hyper
/// This is a low-level HTTP transport that the application service uses
pub struct HyperHttpClient {
    client: HttpsClient,
}

impl HyperHttpClient {
    pub fn new() -> Self {
        let connector = HttpsConnector::new();
        let client = Client::builder(TokioExecutor::new())
            .build::<HttpsConnector<HttpConnector>, Full<Bytes>>(connector);
        Self { client }
    }
}

impl Default for HyperHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for HyperHttpClient {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        let hyper_request = RequestAdapter::to_hyper_request(request)?;
        let hyper_response = self.execute_http_request(hyper_request).await?;
        ResponseAdapter::to_domain_response(hyper_response).await
    }
}

impl HyperHttpClient {
    async fn execute_http_request(
        &self,
        request: HyperRequest<Full<Bytes>>,
    ) -> Result<hyper::Response<Incoming>, TransportError> {
        self.client.request(request).await.map_err(|e| {
            let message = error_chain(&e);
            debug!(connect = e.is_connect(), error = %message, "request failed");
            if e.is_connect() {
                TransportError::Connect(message)
            } else {
                TransportError::Protocol(message)
            }
        })
    }
}

/// Joins an error with its sources; the client's own message is only a category.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}

/// Adapter for converting domain requests to Hyper requests
struct RequestAdapter;

impl RequestAdapter {
    fn to_hyper_request(
        domain_request: Request,
    ) -> Result<HyperRequest<Full<Bytes>>, TransportError> {
        let method = MethodAdapter::to_hyper_method(domain_request.method);
        let body = BodyAdapter::to_hyper_body(&domain_request.body);

        let mut builder = HyperRequest::builder()
            .method(method)
            .uri(domain_request.url.0.clone());

        if let Some(headers) = builder.headers_mut() {
            HeaderAdapter::apply(headers, &domain_request.headers);
            HeaderAdapter::add_json_content_type(headers, &domain_request.body);
        }

        builder
            .body(body)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))
    }
}

/// Adapter for converting domain responses from Hyper responses
struct ResponseAdapter;

impl ResponseAdapter {
    async fn to_domain_response(
        hyper_response: hyper::Response<Incoming>,
    ) -> Result<Response, TransportError> {
        let status = hyper_response.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let (headers, content_headers) = Self::split_headers(hyper_response.headers());
        let body = Self::extract_response_body(hyper_response).await?;
        trace!(status = status.as_u16(), bytes = body.len(), "response received");

        Ok(Response { status, reason, headers, content_headers, body })
    }

    fn split_headers(map: &HeaderMap) -> (Vec<HeaderEntry>, Vec<HeaderEntry>) {
        let mut headers = Vec::new();
        let mut content_headers = Vec::new();
        for name in map.keys() {
            let values = map
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).to_string())
                .collect();
            let key = name.as_str();
            if key.starts_with("content-") || CONTENT_HEADERS.contains(&key) {
                content_headers.push((key.to_string(), values));
            } else {
                headers.push((key.to_string(), values));
            }
        }
        (headers, content_headers)
    }

    async fn extract_response_body(
        response: hyper::Response<Incoming>,
    ) -> Result<String, TransportError> {
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| TransportError::Protocol(format!("Failed to read response body: {}", e)))?
            .to_bytes();

        Ok(String::from_utf8_lossy(&body_bytes).into_owned())
    }
}

/// Adapter for converting domain HTTP methods to Hyper methods
struct MethodAdapter;

impl MethodAdapter {
    fn to_hyper_method(domain_method: DomainMethod) -> Method {
        match domain_method {
            DomainMethod::Get => Method::GET,
            DomainMethod::Post => Method::POST,
            DomainMethod::Put => Method::PUT,
            DomainMethod::Delete => Method::DELETE,
            DomainMethod::Patch => Method::PATCH,
            DomainMethod::Head => Method::HEAD,
            DomainMethod::Options => Method::OPTIONS,
        }
    }
}

/// Adapter for converting domain request bodies to Hyper bodies
struct BodyAdapter;

impl BodyAdapter {
    fn to_hyper_body(domain_body: &Option<JsonBody>) -> Full<Bytes> {
        match domain_body {
            Some(json_body) => Full::new(Bytes::from(json_body.0.clone())),
            None => Full::new(Bytes::new()),
        }
    }
}

/// Adapter for handling HTTP headers
struct HeaderAdapter;

impl HeaderAdapter {
    /// Copies domain headers, skipping any the transport cannot accept.
    fn apply(headers: &mut HeaderMap, domain_headers: &[(String, String)]) {
        for (name, value) in domain_headers {
            let parsed = HeaderName::from_bytes(name.as_bytes())
                .ok()
                .filter(|n| !RESERVED_HEADERS.contains(&n.as_str()))
                .zip(HeaderValue::from_str(value).ok());
            match parsed {
                Some((header_name, header_value)) => {
                    let shown = if is_sensitive_header(name) {
                        "[REDACTED]"
                    } else {
                        value.as_str()
                    };
                    trace!(header = %header_name, value = shown, "request header");
                    headers.append(header_name, header_value);
                }
                None => debug!(header = %name, "skipping header the transport rejects"),
            }
        }
    }

    fn add_json_content_type(headers: &mut HeaderMap, body: &Option<JsonBody>) {
        if body.is_some() && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
    }
}
