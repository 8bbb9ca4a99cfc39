use serde_json::json;
use tempfile::TempDir;

use metatest_client::export::{
    export_file_name, export_result_json, parse_result_export, write_result_export,
};
use metatest_client::models::{ResultSummary, TestCaseResult, TestResult, TestStatus};

fn sample_result() -> TestResult {
    TestResult {
        id: "run-7".to_string(),
        metadata_id: "meta-3".to_string(),
        status: TestStatus::Completed,
        url: Some("https://example.com/signup".to_string()),
        created_at: "2024-03-02T08:15:00Z".parse().ok(),
        completed_at: "2024-03-02T08:16:30Z".parse().ok(),
        summary: ResultSummary {
            total: 2,
            passed: 1,
            failed: 1,
            skipped: 0,
            success_rate: 50.0,
            duration_seconds: 90.5,
        },
        test_cases: vec![
            TestCaseResult {
                id: "tc-1".to_string(),
                name: "valid email accepted".to_string(),
                status: TestStatus::Completed,
                field_name: Some("email".to_string()),
                input_data: Some(json!({"email": "ada@example.com"})),
                duration_ms: 1200,
                ..TestCaseResult::default()
            },
            TestCaseResult {
                id: "tc-2".to_string(),
                name: "short password rejected".to_string(),
                status: TestStatus::Failed,
                field_name: Some("password".to_string()),
                expected: Some("error shown".to_string()),
                actual: Some("form submitted".to_string()),
                error_message: Some("No validation message".to_string()),
                screenshot_id: Some("shot-2".to_string()),
                duration_ms: 3400,
                ..TestCaseResult::default()
            },
        ],
    }
}

#[test]
fn test_export_round_trip() {
    let result = sample_result();
    let json = export_result_json(&result).unwrap();
    let parsed = parse_result_export(&json).unwrap();
    assert_eq!(parsed, result);
}

#[test]
fn test_file_name_uses_result_id() {
    assert_eq!(export_file_name(&sample_result()), "test-result-run-7.json");
    assert_eq!(
        export_file_name(&TestResult::default()),
        "test-result-unknown.json"
    );
}

#[test]
fn test_write_and_read_back() {
    let dir = TempDir::new().unwrap();
    let result = sample_result();

    let path = write_result_export(&result, dir.path()).unwrap();
    assert_eq!(path, dir.path().join("test-result-run-7.json"));

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(parse_result_export(&content).unwrap(), result);
}

#[test]
fn test_file_name_neutralizes_path_characters() {
    let mut result = sample_result();
    result.id = "../../etc/passwd".to_string();
    assert_eq!(export_file_name(&result), "test-result-______etc_passwd.json");

    result.id = "run 1/2".to_string();
    assert_eq!(export_file_name(&result), "test-result-run_1_2.json");
}

#[test]
fn test_write_stays_inside_target_dir() {
    let dir = TempDir::new().unwrap();
    let mut result = sample_result();
    result.id = "../escape".to_string();

    let path = write_result_export(&result, dir.path()).unwrap();
    assert_eq!(path.parent(), Some(dir.path()));
    assert!(path.exists());
}

#[test]
fn test_write_into_missing_dir_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");
    assert!(write_result_export(&sample_result(), &missing).is_err());
}
