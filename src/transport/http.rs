use futures::future::BoxFuture;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::{ApiRequest, ApiResponse, Transport};
use crate::error::ApiError;

/// reqwest-backed transport. Non-2xx responses become [`ApiError::Status`];
/// nothing is substituted here.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, request: &ApiRequest) -> Result<Url, ApiError> {
        let raw = format!("{}{}", self.base_url, request.path);
        let mut url =
            Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }

    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url_for(&request)?;

        let mut outgoing = self.client.request(request.method, url);
        if let Some(timeout) = request.timeout {
            outgoing = outgoing.timeout(timeout);
        }
        if let Some(body) = &request.body {
            outgoing = outgoing.json(body);
        }

        let resp = outgoing.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))?
        };

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
            substituted: false,
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: ApiRequest) -> BoxFuture<'_, Result<ApiResponse, ApiError>> {
        Box::pin(self.execute(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base: &str) -> HttpTransport {
        HttpTransport::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let t = transport("http://localhost:8000/");
        assert_eq!(t.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_url_for_joins_path() {
        let t = transport("http://localhost:8000");
        let url = t.url_for(&ApiRequest::get("/test/status/run-1")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/test/status/run-1");
    }

    #[test]
    fn test_url_for_appends_query() {
        let t = transport("http://localhost:8000");
        let req = ApiRequest::get("/results/analytics/trends").query("days", 7);
        let url = t.url_for(&req).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/results/analytics/trends?days=7");
    }

    #[test]
    fn test_url_for_rejects_garbage_base() {
        let t = transport("not a url");
        let err = t.url_for(&ApiRequest::get("/health")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }
}
