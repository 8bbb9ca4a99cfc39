use super::ApiClient;
use crate::error::ApiError;
use crate::models::{
    BulkGenerateRequest, BulkGeneratedData, FieldGenerateRequest, FieldValues, GenerateRequest,
    GeneratedData, MetadataGenerateRequest, ScenarioList,
};
use crate::transport::ApiRequest;

impl ApiClient {
    pub async fn generate_data(
        &self,
        metadata_id: &str,
        request: &GenerateRequest,
    ) -> Result<GeneratedData, ApiError> {
        let body = serde_json::to_value(request)?;
        self.send(ApiRequest::post(format!("/generate/{}", metadata_id)).json(body))
            .await
    }

    pub async fn generate_bulk(
        &self,
        request: &BulkGenerateRequest,
    ) -> Result<BulkGeneratedData, ApiError> {
        let body = serde_json::to_value(request)?;
        self.send(ApiRequest::post("/generate/bulk").json(body)).await
    }

    pub async fn generate_field(
        &self,
        request: &FieldGenerateRequest,
    ) -> Result<FieldValues, ApiError> {
        let body = serde_json::to_value(request)?;
        self.send(ApiRequest::post("/generate/field").json(body)).await
    }

    pub async fn generate_from_metadata(
        &self,
        request: &MetadataGenerateRequest,
    ) -> Result<GeneratedData, ApiError> {
        let body = serde_json::to_value(request)?;
        self.send(ApiRequest::post("/generate/metadata").json(body)).await
    }

    pub async fn generation_scenarios(&self) -> Result<ScenarioList, ApiError> {
        self.send(ApiRequest::get("/generate/scenarios")).await
    }
}
