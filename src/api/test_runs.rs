use futures::future::join_all;
use tracing::warn;

use super::ApiClient;
use crate::error::ApiError;
use crate::models::{
    MessageResponse, StartTestRequest, StartTestResponse, TestRun, TestRunList, TestStatus,
};
use crate::transport::ApiRequest;

impl ApiClient {
    pub async fn start_test(
        &self,
        metadata_id: &str,
        request: &StartTestRequest,
    ) -> Result<StartTestResponse, ApiError> {
        let body = serde_json::to_value(request)?;
        self.send(ApiRequest::post(format!("/test/{}", metadata_id)).json(body))
            .await
    }

    pub async fn test_status(&self, test_run_id: &str) -> Result<TestRun, ApiError> {
        self.send(ApiRequest::get(format!("/test/status/{}", test_run_id)))
            .await
    }

    pub async fn stop_test(&self, test_run_id: &str) -> Result<MessageResponse, ApiError> {
        self.send(ApiRequest::post(format!("/test/stop/{}", test_run_id)))
            .await
    }

    pub async fn delete_test(&self, test_run_id: &str) -> Result<MessageResponse, ApiError> {
        self.send(ApiRequest::delete(format!("/test/{}", test_run_id)))
            .await
    }

    pub async fn metadata_test_runs(&self, metadata_id: &str) -> Result<TestRunList, ApiError> {
        self.send(ApiRequest::get(format!("/test/{}/runs", metadata_id)))
            .await
    }

    /// Recent runs across every metadata record.
    ///
    /// Runs are fetched concurrently, one request per record. A record whose
    /// runs cannot be fetched is logged and skipped; only a failure to list
    /// the metadata itself is returned.
    pub async fn get_test_runs(
        &self,
        limit: usize,
        status: Option<TestStatus>,
    ) -> Result<TestRunList, ApiError> {
        let metadata = self.list_metadata().await?;

        let fetches = metadata.iter().map(|record| async move {
            (record.id.as_str(), self.metadata_test_runs(&record.id).await)
        });

        let mut runs = Vec::new();
        for (metadata_id, result) in join_all(fetches).await {
            match result {
                Ok(list) => runs.extend(list.test_runs),
                Err(e) => warn!("Skipping test runs for metadata {}: {}", metadata_id, e),
            }
        }

        Ok(collect_recent_runs(runs, limit, status))
    }
}

/// Newest first, optionally filtered by status, cut to `limit`. `total` counts
/// the filtered runs before the cut.
pub fn collect_recent_runs(
    mut runs: Vec<TestRun>,
    limit: usize,
    status: Option<TestStatus>,
) -> TestRunList {
    runs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    if let Some(status) = status {
        runs.retain(|r| r.status == status);
    }
    let total = runs.len();
    runs.truncate(limit);
    TestRunList {
        test_runs: runs,
        total,
    }
}
