use std::time::Duration;

use super::ApiClient;
use crate::config::EXTRACTION_TIMEOUT_MS;
use crate::error::ApiError;
use crate::models::{ExtractGithubRequest, ExtractUrlRequest, ExtractionResponse};
use crate::transport::ApiRequest;

fn extraction_timeout() -> Duration {
    Duration::from_millis(EXTRACTION_TIMEOUT_MS)
}

impl ApiClient {
    pub async fn extract_url(&self, url: &str) -> Result<ExtractionResponse, ApiError> {
        let body = serde_json::to_value(ExtractUrlRequest {
            url: url.to_string(),
        })?;
        self.send(
            ApiRequest::post("/extract/url")
                .json(body)
                .timeout(extraction_timeout()),
        )
        .await
    }

    pub async fn extract_github(
        &self,
        request: &ExtractGithubRequest,
    ) -> Result<ExtractionResponse, ApiError> {
        let body = serde_json::to_value(request)?;
        self.send(
            ApiRequest::post("/extract/github")
                .json(body)
                .timeout(extraction_timeout()),
        )
        .await
    }
}
