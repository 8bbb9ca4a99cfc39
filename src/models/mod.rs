//! Typed mirrors of the backend's JSON payloads.
//!
//! Every struct defaults field-by-field so partial bodies (including the
//! generic demo fallback) still decode.

pub mod analytics;
pub mod generation;
pub mod metadata;
pub mod results;
pub mod test_run;

pub use analytics::*;
pub use generation::*;
pub use metadata::*;
pub use results::*;
pub use test_run::*;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthStatus {
    pub status: String,
    pub message: Option<String>,
    pub version: Option<String>,
    pub timestamp: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self.status.as_str(), "healthy" | "ok")
    }
}

/// Acknowledgement returned by delete/stop style endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageResponse {
    pub message: String,
    pub status: Option<String>,
    pub success: Option<bool>,
}
