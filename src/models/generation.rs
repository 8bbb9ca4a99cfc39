use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkGenerateRequest {
    pub metadata_ids: Vec<String>,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldGenerateRequest {
    pub field_name: String,
    pub field_type: String,
    pub count: u32,
}

/// Generate against metadata supplied inline rather than stored on the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataGenerateRequest {
    pub metadata: super::MetadataRecord,
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratedData {
    pub metadata_id: Option<String>,
    pub scenario: Option<String>,
    pub count: usize,
    pub records: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldValues {
    pub field_name: String,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioList {
    pub scenarios: Vec<Scenario>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkGeneratedData {
    pub results: Vec<GeneratedData>,
    pub total_records: usize,
}
