//! Canned payloads served when the backend is absent.
//!
//! Matching is on the request path (and, for `/metadata`, the method). Bodies
//! are built from the typed models so they always decode on the way back.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::models::{
    DashboardData, DashboardSummary, FailureSummary, FormDefinition, FormField, GlobalAnalytics,
    HealthStatus, MetadataRecord, TestRun, TestRunList, TestStatus, TrendPoint,
};
use crate::transport::{ApiResponse, Method};

const DEMO_METADATA_ID: &str = "demo-metadata-1";

pub fn canned_response(method: &Method, path: &str) -> ApiResponse {
    ApiResponse {
        status: 200,
        body: canned_body(method, path),
        substituted: true,
    }
}

pub fn canned_body(method: &Method, path: &str) -> Value {
    let path = path.split('?').next().unwrap_or(path).trim_end_matches('/');

    if path.ends_with("/runs") {
        to_body(&demo_test_runs(runs_owner(path)))
    } else if path.starts_with("/results/analytics/global") {
        to_body(&demo_global_analytics())
    } else if path.starts_with("/results/reports/dashboard") {
        to_body(&demo_dashboard())
    } else if path == "/metadata" && *method == Method::GET {
        to_body(&demo_metadata())
    } else if path == "/health" {
        to_body(&HealthStatus {
            status: "healthy".to_string(),
            message: Some("Demo mode - backend simulated".to_string()),
            version: Some("demo".to_string()),
            timestamp: None,
        })
    } else {
        json!({
            "message": "Demo mode - backend not available",
            "status": "demo",
        })
    }
}

/// `/test/{metadataId}/runs` -> `metadataId`.
fn runs_owner(path: &str) -> &str {
    path.strip_prefix("/test/")
        .and_then(|rest| rest.strip_suffix("/runs"))
        .filter(|id| !id.is_empty() && !id.contains('/'))
        .unwrap_or(DEMO_METADATA_ID)
}

fn to_body<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_default()
}

fn at(timestamp: &str) -> Option<DateTime<Utc>> {
    timestamp.parse().ok()
}

pub fn demo_test_runs(metadata_id: &str) -> TestRunList {
    let run = |n: u32, status: TestStatus, created: &str, passed: u32, failed: u32| TestRun {
        id: format!("{}-run-{}", metadata_id, n),
        metadata_id: metadata_id.to_string(),
        status,
        url: Some("https://example.com/signup".to_string()),
        created_at: at(created),
        started_at: at(created),
        completed_at: if status.is_finished() { at(created) } else { None },
        total_tests: passed + failed,
        passed_tests: passed,
        failed_tests: failed,
        progress: if status.is_finished() { 100.0 } else { 45.0 },
        error_message: if status == TestStatus::Failed {
            Some("Submit button not found".to_string())
        } else {
            None
        },
    };

    let test_runs = vec![
        run(1, TestStatus::Completed, "2024-01-15T10:30:00Z", 12, 0),
        run(2, TestStatus::Running, "2024-01-15T09:15:00Z", 4, 1),
        run(3, TestStatus::Failed, "2024-01-14T16:45:00Z", 7, 3),
    ];
    TestRunList {
        total: test_runs.len(),
        test_runs,
    }
}

pub fn demo_global_analytics() -> GlobalAnalytics {
    GlobalAnalytics {
        total_test_runs: 156,
        total_tests: 1_842,
        passed_tests: 1_598,
        failed_tests: 244,
        success_rate: 86.8,
        average_duration: 42.5,
        total_metadata: 12,
        last_run_at: at("2024-01-15T10:30:00Z"),
    }
}

pub fn demo_dashboard() -> DashboardData {
    let trend = |date: &str, total: u64, failed: u64| TrendPoint {
        date: date.to_string(),
        total,
        passed: total - failed,
        failed,
        success_rate: ((total - failed) as f64 / total as f64 * 1000.0).round() / 10.0,
    };

    DashboardData {
        summary: DashboardSummary {
            total_test_runs: 156,
            running: 1,
            completed: 142,
            failed: 13,
            success_rate: 86.8,
        },
        recent_runs: demo_test_runs(DEMO_METADATA_ID).test_runs,
        trends: vec![
            trend("2024-01-13", 20, 3),
            trend("2024-01-14", 24, 4),
            trend("2024-01-15", 18, 1),
        ],
        top_failures: vec![
            FailureSummary {
                name: "email".to_string(),
                failures: 18,
                last_error: Some("Validation message not shown".to_string()),
            },
            FailureSummary {
                name: "password".to_string(),
                failures: 9,
                last_error: Some("Strength meter did not update".to_string()),
            },
        ],
    }
}

pub fn demo_metadata() -> Vec<MetadataRecord> {
    let field = |name: &str, field_type: &str, required: bool| FormField {
        name: name.to_string(),
        field_type: field_type.to_string(),
        label: Some(name.replace('_', " ")),
        required,
        ..FormField::default()
    };

    vec![
        MetadataRecord {
            id: DEMO_METADATA_ID.to_string(),
            source_type: "url".to_string(),
            source: "https://example.com/signup".to_string(),
            title: Some("Signup form".to_string()),
            forms: vec![FormDefinition {
                form_id: Some("signup".to_string()),
                action: Some("/signup".to_string()),
                method: Some("post".to_string()),
                fields: vec![
                    field("email", "email", true),
                    field("password", "password", true),
                    field("full_name", "text", false),
                ],
            }],
            created_at: at("2024-01-14T08:00:00Z"),
            updated_at: at("2024-01-14T08:00:00Z"),
        },
        MetadataRecord {
            id: "demo-metadata-2".to_string(),
            source_type: "github".to_string(),
            source: "https://github.com/example/contact-app".to_string(),
            title: Some("Contact form".to_string()),
            forms: vec![FormDefinition {
                form_id: Some("contact".to_string()),
                action: Some("/contact".to_string()),
                method: Some("post".to_string()),
                fields: vec![
                    field("name", "text", true),
                    field("email", "email", true),
                    field("message", "textarea", true),
                ],
            }],
            created_at: at("2024-01-12T14:20:00Z"),
            updated_at: at("2024-01-13T09:00:00Z"),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_listing_has_three_runs() {
        let body = canned_body(&Method::GET, "/test/abc/runs");
        let list: TestRunList = serde_json::from_value(body).unwrap();
        assert_eq!(list.total, 3);
        assert_eq!(list.test_runs.len(), 3);
        assert!(list.test_runs.iter().all(|r| r.metadata_id == "abc"));
    }

    #[test]
    fn test_runs_owner_falls_back_for_odd_paths() {
        assert_eq!(runs_owner("/results/runs"), DEMO_METADATA_ID);
        assert_eq!(runs_owner("/test//runs"), DEMO_METADATA_ID);
        assert_eq!(runs_owner("/test/m-1/runs"), "m-1");
    }

    #[test]
    fn test_query_string_is_ignored() {
        let body = canned_body(&Method::GET, "/results/analytics/global?days=7");
        let analytics: GlobalAnalytics = serde_json::from_value(body).unwrap();
        assert_eq!(analytics.total_test_runs, 156);
    }

    #[test]
    fn test_metadata_listing_depends_on_method() {
        let listed = canned_body(&Method::GET, "/metadata");
        assert!(listed.is_array());
        let deleted = canned_body(&Method::DELETE, "/metadata");
        assert_eq!(deleted["status"], "demo");
    }

    #[test]
    fn test_health_is_healthy() {
        let health: HealthStatus =
            serde_json::from_value(canned_body(&Method::GET, "/health")).unwrap();
        assert!(health.is_healthy());
    }

    #[test]
    fn test_dashboard_shape() {
        let body = canned_body(&Method::GET, "/results/reports/dashboard");
        let dashboard: DashboardData = serde_json::from_value(body).unwrap();
        assert_eq!(dashboard.recent_runs.len(), 3);
        assert_eq!(dashboard.trends.len(), 3);
    }

    #[test]
    fn test_unmatched_path_gets_generic_body() {
        let body = canned_body(&Method::POST, "/generate/bulk");
        assert_eq!(body["status"], "demo");
        assert!(body["message"].as_str().unwrap().contains("Demo mode"));
    }

    #[test]
    fn test_canned_response_is_flagged() {
        let resp = canned_response(&Method::GET, "/health");
        assert_eq!(resp.status, 200);
        assert!(resp.substituted);
    }
}
