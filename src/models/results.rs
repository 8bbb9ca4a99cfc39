use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::test_run::TestStatus;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultSummary {
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub success_rate: f64,
    pub duration_seconds: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestCaseResult {
    pub id: String,
    pub name: String,
    pub status: TestStatus,
    pub field_name: Option<String>,
    pub input_data: Option<serde_json::Value>,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub error_message: Option<String>,
    pub duration_ms: u64,
    pub screenshot_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestResult {
    pub id: String,
    pub metadata_id: String,
    pub status: TestStatus,
    pub url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub summary: ResultSummary,
    pub test_cases: Vec<TestCaseResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultList {
    pub results: Vec<TestResult>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Screenshot {
    pub id: String,
    pub test_run_id: String,
    pub test_case_id: Option<String>,
    pub filename: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub captured_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenshotList {
    pub test_run_id: String,
    pub screenshots: Vec<Screenshot>,
}
