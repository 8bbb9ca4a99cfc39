//! Local JSON export of test results.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::ApiError;
use crate::models::TestResult;

pub fn export_result_json(result: &TestResult) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(result)?)
}

pub fn parse_result_export(json: &str) -> Result<TestResult, ApiError> {
    Ok(serde_json::from_str(json)?)
}

/// `test-result-{id}.json`, with anything outside `[A-Za-z0-9_-]` in the id
/// replaced by `_` so the name never leaves the target directory.
pub fn export_file_name(result: &TestResult) -> String {
    if result.id.is_empty() {
        return "test-result-unknown.json".to_string();
    }
    let id: String = result
        .id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("test-result-{}.json", id)
}

/// Write `test-result-{id}.json` into `dir`, replacing any earlier export.
pub fn write_result_export(result: &TestResult, dir: &Path) -> Result<PathBuf, ApiError> {
    let path = dir.join(export_file_name(result));
    std::fs::write(&path, export_result_json(result)?)?;
    info!("Exported test result {} to {:?}", result.id, path);
    Ok(path)
}
