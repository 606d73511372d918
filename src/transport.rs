use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::error::{AgentError, Result};

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Form(Vec<(String, String)>),
}

/// A single upstream API call. Everything the adapters send goes through this shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            ..Self::get(url)
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn query(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query.push((name.to_string(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn form(mut self, fields: &[(&str, &str)]) -> Self {
        self.body = Some(RequestBody::Form(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ));
        self
    }

    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, req: ApiRequest) -> Result<Value>;
}

/// reqwest-backed transport. One attempt per call, bounded by the client timeout.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("marketing-agent/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, req: ApiRequest) -> Result<Value> {
        let mut builder = match req.method {
            Method::Get => self.client.get(&req.url),
            Method::Post => self.client.post(&req.url),
        };

        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        builder = match &req.body {
            Some(RequestBody::Json(body)) => builder.json(body),
            Some(RequestBody::Form(fields)) => builder.form(fields),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AgentError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder_collects_parts() {
        let req = ApiRequest::post("https://example.test/token")
            .header("developer-token", "dev")
            .query("alt", "json")
            .form(&[("grant_type", "refresh_token")]);

        assert_eq!(req.method, Method::Post);
        assert_eq!(req.headers, vec![("developer-token".into(), "dev".into())]);
        assert_eq!(req.query_value("alt"), Some("json"));
        assert_eq!(req.query_value("missing"), None);
        assert_eq!(
            req.body,
            Some(RequestBody::Form(vec![(
                "grant_type".into(),
                "refresh_token".into()
            )]))
        );
    }

    #[tokio::test]
    async fn test_mock_transport_stands_in_for_http() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.url.ends_with("/health"))
            .times(1)
            .returning(|_| Ok(json!({"ok": true})));

        let value = transport
            .send(ApiRequest::get("https://example.test/health"))
            .await
            .expect("mocked call succeeds");
        assert_eq!(value, json!({"ok": true}));
    }

    #[test]
    fn test_http_transport_builds_with_timeout() {
        assert!(HttpTransport::new(Duration::from_secs(10)).is_ok());
    }
}
