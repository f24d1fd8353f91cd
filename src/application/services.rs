use crate::application::builders::request_builder::RequestBuilder;
use crate::domain::entities::{Method, Request, Response};
use crate::domain::errors::{ExecutionError, TransportError};
use crate::domain::settings::Settings;
use async_trait::async_trait;
use hyper::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Hops followed before a redirect chain is treated as a loop.
pub const MAX_REDIRECTS: usize = 10;

/// Trait for HTTP clients to enable mocking and dependency inversion
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response, TransportError>;
}

#[async_trait]
impl<T: HttpClient + ?Sized> HttpClient for Arc<T> {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        (**self).send(request).await
    }
}

/// Application service that turns settings into one executed request.
///
/// Any status code is a `Response`; only a request that never completed is an
/// `ExecutionError`.
pub struct HttpRequestService {
    http_client: Box<dyn HttpClient>,
}

impl HttpRequestService {
    pub fn new(http_client: Box<dyn HttpClient>) -> Self {
        Self { http_client }
    }

    pub async fn execute(
        &self,
        settings: &Settings,
        path_override: Option<&str>,
    ) -> Result<Response, ExecutionError> {
        let request = RequestBuilder::from_settings(settings, path_override)
            .map_err(|e| ExecutionError::unexpected(e.to_string()))?;

        info!(method = %request.method, url = %request.url.as_str(), "dispatching request");

        let exchange = self.dispatch(request, settings.follow_redirects);
        match settings.max_time_seconds.filter(|secs| *secs > 0) {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs as u64), exchange)
                .await
                .map_err(|_| {
                    ExecutionError::timeout(format!("no response within {} seconds", secs))
                })?,
            None => exchange.await,
        }
    }

    /// Sends the request, following redirects when allowed.
    async fn dispatch(
        &self,
        mut request: Request,
        follow_redirects: bool,
    ) -> Result<Response, ExecutionError> {
        let mut hops = 0;
        loop {
            let response = self.http_client.send(request.clone()).await?;
            if !follow_redirects || !is_redirect(response.status) {
                return Ok(response);
            }
            let Some(location) = response.header("location") else {
                return Ok(response);
            };
            if hops == MAX_REDIRECTS {
                return Err(ExecutionError::unexpected(format!(
                    "stopped after {} redirects",
                    MAX_REDIRECTS
                )));
            }
            hops += 1;

            let next = request
                .url
                .join(location)
                .map_err(|e| ExecutionError::unexpected(e.to_string()))?;
            debug!(
                status = response.status.as_u16(),
                location = %next.as_str(),
                "following redirect"
            );

            if !next.same_origin(&request.url) {
                request.remove_header("authorization");
            }
            if rewrites_to_get(response.status, request.method) {
                request.method = Method::Get;
                request.body = None;
            }
            request.url = next;
        }
    }
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308)
}

fn rewrites_to_get(status: StatusCode, method: Method) -> bool {
    match status.as_u16() {
        303 => method != Method::Head,
        301 | 302 => !matches!(method, Method::Get | Method::Head),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ErrorKind;
    use crate::domain::settings::AuthType;
    use base64::Engine;
    use mockall::Sequence;

    fn settings() -> Settings {
        Settings {
            base_url: Some("http://api.test".into()),
            recent_paths: vec!["/users".into()],
            ..Settings::default()
        }
    }

    fn response(status: u16, location: Option<&str>) -> Response {
        Response {
            status: StatusCode::from_u16(status).unwrap(),
            reason: String::new(),
            headers: location
                .map(|l| vec![("location".to_string(), vec![l.to_string()])])
                .unwrap_or_default(),
            content_headers: vec![],
            body: String::new(),
        }
    }

    #[tokio::test]
    async fn non_success_status_is_a_response() {
        let mut client = MockHttpClient::new();
        client.expect_send().times(1).returning(|_| Ok(response(500, None)));

        let service = HttpRequestService::new(Box::new(client));
        let result = service.execute(&settings(), None).await.unwrap();
        assert_eq!(result.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn sends_composed_request_with_basic_auth() {
        let mut client = MockHttpClient::new();
        client
            .expect_send()
            .withf(|req| {
                let expected = format!(
                    "Basic {}",
                    base64::engine::general_purpose::STANDARD.encode("u:p")
                );
                req.url.as_str() == "http://api.test/override"
                    && req.method == Method::Post
                    && req.header("Authorization") == Some(expected.as_str())
                    && req.header("User-Agent").is_some()
            })
            .times(1)
            .returning(|_| Ok(response(201, None)));

        let settings = Settings {
            default_method: "POST".into(),
            auth_type: AuthType::BasicAuth,
            basic_auth_username: Some("u".into()),
            basic_auth_password: Some("p".into()),
            ..settings()
        };
        let service = HttpRequestService::new(Box::new(client));
        let result = service.execute(&settings, Some("override")).await.unwrap();
        assert_eq!(result.status.as_u16(), 201);
    }

    #[tokio::test]
    async fn transport_failure_is_classified() {
        let mut client = MockHttpClient::new();
        client
            .expect_send()
            .returning(|_| Err(TransportError::Connect("connection refused".into())));

        let service = HttpRequestService::new(Box::new(client));
        let err = service.execute(&settings(), None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Transport);
        assert!(err.message.contains("connection refused"));
    }

    #[tokio::test]
    async fn follows_redirects_when_enabled() {
        let mut seq = Sequence::new();
        let mut client = MockHttpClient::new();
        client
            .expect_send()
            .withf(|req| req.url.as_str() == "http://api.test/users")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(302, Some("/people"))));
        client
            .expect_send()
            .withf(|req| req.url.as_str() == "http://api.test/people")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(200, None)));

        let service = HttpRequestService::new(Box::new(client));
        let result = service.execute(&settings(), None).await.unwrap();
        assert_eq!(result.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn login_redirect_carrying_a_url_is_followed() {
        let mut seq = Sequence::new();
        let mut client = MockHttpClient::new();
        client
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(302, Some("/login?next=http://api.test/users"))));
        client
            .expect_send()
            .withf(|req| req.url.as_str() == "http://api.test/login?next=http://api.test/users")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(200, None)));

        let service = HttpRequestService::new(Box::new(client));
        let result = service.execute(&settings(), None).await.unwrap();
        assert_eq!(result.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn returns_redirect_when_following_is_disabled() {
        let mut client = MockHttpClient::new();
        client
            .expect_send()
            .times(1)
            .returning(|_| Ok(response(301, Some("/elsewhere"))));

        let settings = Settings { follow_redirects: false, ..settings() };
        let service = HttpRequestService::new(Box::new(client));
        let result = service.execute(&settings, None).await.unwrap();
        assert_eq!(result.status, StatusCode::MOVED_PERMANENTLY);
    }

    #[tokio::test]
    async fn drops_authorization_on_cross_origin_redirect() {
        let mut seq = Sequence::new();
        let mut client = MockHttpClient::new();
        client
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(307, Some("http://other.test/x"))));
        client
            .expect_send()
            .withf(|req| req.header("authorization").is_none() && req.method == Method::Post)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(200, None)));

        let settings = Settings {
            default_method: "POST".into(),
            auth_type: AuthType::BearerToken,
            auth_token: Some("secret".into()),
            ..settings()
        };
        let service = HttpRequestService::new(Box::new(client));
        assert!(service.execute(&settings, None).await.is_ok());
    }

    #[tokio::test]
    async fn redirect_loop_is_unexpected() {
        let mut client = MockHttpClient::new();
        client
            .expect_send()
            .times(MAX_REDIRECTS + 1)
            .returning(|_| Ok(response(302, Some("/users"))));

        let service = HttpRequestService::new(Box::new(client));
        let err = service.execute(&settings(), None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unexpected);
    }

    struct SlowClient;

    #[async_trait]
    impl HttpClient for SlowClient {
        async fn send(&self, _request: Request) -> Result<Response, TransportError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(response(200, None))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_produces_timeout() {
        let settings = Settings { max_time_seconds: Some(2), ..settings() };
        let service = HttpRequestService::new(Box::new(SlowClient));
        let err = service.execute(&settings, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Timeout);
    }

    #[test]
    fn see_other_rewrites_to_get() {
        assert!(rewrites_to_get(StatusCode::SEE_OTHER, Method::Post));
        assert!(rewrites_to_get(StatusCode::FOUND, Method::Put));
        assert!(!rewrites_to_get(StatusCode::FOUND, Method::Get));
        assert!(!rewrites_to_get(StatusCode::PERMANENT_REDIRECT, Method::Post));
    }
}
