use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::models::TestStatus;

/// metatest — drive the metadata-driven UI testing backend from the terminal.
#[derive(Parser, Debug, Clone)]
#[command(name = "metatest")]
pub struct CliArgs {
    /// Backend origin
    #[arg(long = "api-base-url", env = API_BASE_URL_ENV, default_value = DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// Serve canned responses whenever the backend fails ("true" enables)
    #[arg(long = "demo-mode", env = DEMO_MODE_ENV, default_value = "false")]
    pub demo_mode: String,

    /// Also write logs to this file
    #[arg(short = 'l', long = "log-file")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Check backend health and record connectivity
    Health,
    /// Browse and delete extracted metadata
    #[command(subcommand)]
    Metadata(MetadataCommand),
    /// Extract form metadata from a page or repository
    #[command(subcommand)]
    Extract(ExtractCommand),
    /// Launch and monitor test runs
    #[command(subcommand)]
    Test(TestCommand),
    /// Browse test results
    #[command(subcommand)]
    Results(ResultsCommand),
    /// Analytics and reports
    #[command(subcommand)]
    Analytics(AnalyticsCommand),
    /// Generate synthetic test data
    #[command(subcommand)]
    Generate(GenerateCommand),
    /// Print real-time updates from the backend until the channel closes
    Watch,
}

#[derive(Subcommand, Debug, Clone)]
pub enum MetadataCommand {
    List,
    Show { id: String },
    Delete { id: String },
    /// Delete every metadata record
    Clear,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ExtractCommand {
    Url {
        url: String,
    },
    Github {
        repo_url: String,
        #[arg(long)]
        branch: Option<String>,
        #[arg(long)]
        path: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum TestCommand {
    Start {
        metadata_id: String,
        #[arg(long)]
        scenario: Option<String>,
        #[arg(long)]
        browser: Option<String>,
        /// Show the browser window while tests run
        #[arg(long)]
        headed: bool,
    },
    Status { id: String },
    Stop { id: String },
    Delete { id: String },
    /// Runs for one metadata record
    Runs { metadata_id: String },
    /// Recent runs across every metadata record
    Recent {
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        status: Option<TestStatus>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ResultsCommand {
    List,
    Show { id: String },
    Screenshots { id: String },
    Summary { id: String },
    /// Ask the backend for its export of a result
    Export { id: String },
    /// Save a result locally as test-result-{id}.json
    Save {
        id: String,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum AnalyticsCommand {
    Global,
    Trends {
        #[arg(long, default_value_t = 30)]
        days: u32,
    },
    Metadata { id: String },
    Dashboard,
    Summary,
}

#[derive(Subcommand, Debug, Clone)]
pub enum GenerateCommand {
    /// Generate records for one metadata record
    Data {
        metadata_id: String,
        #[arg(long, default_value_t = 5)]
        count: u32,
        #[arg(long)]
        scenario: Option<String>,
    },
    /// Generate records for several metadata records
    Bulk {
        metadata_ids: Vec<String>,
        #[arg(long, default_value_t = 5)]
        count: u32,
    },
    /// Generate values for a single field
    Field {
        field_name: String,
        #[arg(long = "type", default_value = "text")]
        field_type: String,
        #[arg(long, default_value_t = 5)]
        count: u32,
    },
    Scenarios,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub demo_mode: bool,
    pub log_file: Option<PathBuf>,
}

// Environment
pub const API_BASE_URL_ENV: &str = "VITE_API_BASE_URL";
pub const DEMO_MODE_ENV: &str = "VITE_DEMO_MODE";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

// Request timeouts
pub const DEMO_TIMEOUT_MS: u64 = 1_000;
pub const LIVE_TIMEOUT_MS: u64 = 30_000;
pub const EXTRACTION_TIMEOUT_MS: u64 = 60_000;

// Notifications
pub const SUCCESS_DISMISS_MS: u64 = 5_000;

// Real-time channel
pub const WS_PATH: &str = "/ws";

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, demo_mode: bool) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            demo_mode,
            log_file: None,
        }
    }

    pub fn from_args(args: &CliArgs) -> Self {
        let mut config = Self::new(&args.api_base_url, parse_demo_flag(&args.demo_mode));
        config.log_file = args.log_file.clone();
        config
    }

    /// Resolve from `VITE_API_BASE_URL` / `VITE_DEMO_MODE`, falling back to defaults.
    pub fn from_env() -> Self {
        let base_url = std::env::var(API_BASE_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let demo_mode = std::env::var(DEMO_MODE_ENV)
            .map(|v| parse_demo_flag(&v))
            .unwrap_or(false);
        Self::new(base_url, demo_mode)
    }

    /// Default per-request timeout for the current mode.
    pub fn request_timeout(&self) -> Duration {
        if self.demo_mode {
            Duration::from_millis(DEMO_TIMEOUT_MS)
        } else {
            Duration::from_millis(LIVE_TIMEOUT_MS)
        }
    }

    pub fn mode_label(&self) -> &'static str {
        if self.demo_mode {
            "demo"
        } else {
            "live"
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL, false)
    }
}

/// Only the literal string "true" turns demo mode on.
pub fn parse_demo_flag(value: &str) -> bool {
    value == "true"
}
