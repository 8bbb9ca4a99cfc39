use serde_json::Value;

use super::ApiClient;
use crate::error::ApiError;
use crate::models::{ResultList, ResultSummary, ScreenshotList, TestResult};
use crate::transport::ApiRequest;

impl ApiClient {
    pub async fn list_results(&self) -> Result<ResultList, ApiError> {
        self.send(ApiRequest::get("/results")).await
    }

    pub async fn get_result(&self, id: &str) -> Result<TestResult, ApiError> {
        self.send(ApiRequest::get(format!("/results/{}", id))).await
    }

    pub async fn result_screenshots(&self, id: &str) -> Result<ScreenshotList, ApiError> {
        self.send(ApiRequest::get(format!("/results/{}/screenshots", id)))
            .await
    }

    pub async fn result_summary(&self, id: &str) -> Result<ResultSummary, ApiError> {
        self.send(ApiRequest::get(format!("/results/{}/summary", id)))
            .await
    }

    /// The backend's own JSON export, passed through untouched.
    pub async fn export_result(&self, id: &str) -> Result<Value, ApiError> {
        self.send_raw(ApiRequest::get(format!("/results/{}/export", id)).query("format", "json"))
            .await
    }
}
