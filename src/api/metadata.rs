use super::ApiClient;
use crate::error::ApiError;
use crate::models::{MessageResponse, MetadataRecord};
use crate::transport::ApiRequest;

impl ApiClient {
    pub async fn list_metadata(&self) -> Result<Vec<MetadataRecord>, ApiError> {
        self.send(ApiRequest::get("/metadata")).await
    }

    pub async fn get_metadata(&self, id: &str) -> Result<MetadataRecord, ApiError> {
        self.send(ApiRequest::get(format!("/metadata/{}", id))).await
    }

    pub async fn delete_metadata(&self, id: &str) -> Result<MessageResponse, ApiError> {
        self.send(ApiRequest::delete(format!("/metadata/{}", id))).await
    }

    /// Delete every stored record.
    pub async fn clear_metadata(&self) -> Result<MessageResponse, ApiError> {
        self.send(ApiRequest::delete("/metadata")).await
    }
}
