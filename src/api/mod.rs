//! Typed gateway to the backend.
//!
//! Every endpoint method builds an [`ApiRequest`], logs it, hands it to the
//! configured [`Transport`] and decodes the body into the endpoint's model.

pub mod analytics;
pub mod extraction;
pub mod generation;
pub mod metadata;
pub mod results;
pub mod test_runs;

pub use test_runs::collect_recent_runs;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::transport::{ApiRequest, DemoTransport, HttpTransport, LiveTransport, Transport};

pub struct ApiClient {
    config: ClientConfig,
    transport: Box<dyn Transport>,
    substituted: AtomicUsize,
}

impl ApiClient {
    /// Build the reqwest transport and wrap it for the configured mode.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let http = HttpTransport::new(&config.base_url, config.request_timeout())?;
        let transport: Box<dyn Transport> = if config.demo_mode {
            Box::new(DemoTransport::new(http))
        } else {
            Box::new(LiveTransport::new(http))
        };
        Ok(Self {
            config,
            transport,
            substituted: AtomicUsize::new(0),
        })
    }

    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config,
            transport: Box::new(transport),
            substituted: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_demo(&self) -> bool {
        self.config.demo_mode
    }

    /// Number of responses so far that were canned rather than served by the
    /// backend. Compare before and after a call to tell whether it was reached.
    pub fn substituted_responses(&self) -> usize {
        self.substituted.load(Ordering::Relaxed)
    }

    pub async fn send_raw(&self, request: ApiRequest) -> Result<Value, ApiError> {
        info!(
            "[{}] {} {}{}",
            self.config.mode_label(),
            request.method,
            self.config.base_url,
            request.path
        );
        let path = request.path.clone();
        let response = self.transport.send(request).await?;
        if response.substituted {
            debug!("Served {} from canned data", path);
            self.substituted.fetch_add(1, Ordering::Relaxed);
        }
        Ok(response.body)
    }

    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let body = match self.send_raw(request).await? {
            // Empty 2xx bodies decode as an all-default model.
            Value::Null => Value::Object(Default::default()),
            body => body,
        };
        serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
