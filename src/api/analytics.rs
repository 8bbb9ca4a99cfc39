use super::ApiClient;
use crate::error::ApiError;
use crate::models::{
    DashboardData, GlobalAnalytics, HealthStatus, MetadataAnalytics, SummaryReport, TrendReport,
};
use crate::transport::ApiRequest;

impl ApiClient {
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.send(ApiRequest::get("/health")).await
    }

    pub async fn global_analytics(&self) -> Result<GlobalAnalytics, ApiError> {
        self.send(ApiRequest::get("/results/analytics/global")).await
    }

    pub async fn trend_analytics(&self, days: u32) -> Result<TrendReport, ApiError> {
        self.send(ApiRequest::get("/results/analytics/trends").query("days", days))
            .await
    }

    pub async fn metadata_analytics(
        &self,
        metadata_id: &str,
    ) -> Result<MetadataAnalytics, ApiError> {
        self.send(ApiRequest::get(format!(
            "/results/analytics/metadata/{}",
            metadata_id
        )))
        .await
    }

    pub async fn dashboard_report(&self) -> Result<DashboardData, ApiError> {
        self.send(ApiRequest::get("/results/reports/dashboard")).await
    }

    pub async fn summary_report(&self) -> Result<SummaryReport, ApiError> {
        self.send(ApiRequest::get("/results/reports/summary")).await
    }
}
