use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::test_run::TestRun;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalAnalytics {
    pub total_test_runs: u64,
    pub total_tests: u64,
    pub passed_tests: u64,
    pub failed_tests: u64,
    pub success_rate: f64,
    pub average_duration: f64,
    pub total_metadata: u64,
    pub last_run_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendPoint {
    pub date: String,
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendReport {
    pub days: u32,
    pub trends: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataAnalytics {
    pub metadata_id: String,
    pub total_runs: u64,
    pub success_rate: f64,
    pub average_duration: f64,
    pub most_failed_fields: Vec<FailureSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailureSummary {
    pub name: String,
    pub failures: u64,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSummary {
    pub total_test_runs: u64,
    pub running: u64,
    pub completed: u64,
    pub failed: u64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardData {
    pub summary: DashboardSummary,
    pub recent_runs: Vec<TestRun>,
    pub trends: Vec<TrendPoint>,
    pub top_failures: Vec<FailureSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryReport {
    pub period: String,
    pub total_test_runs: u64,
    pub success_rate: f64,
    pub highlights: Vec<String>,
}
