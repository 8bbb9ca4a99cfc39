use futures::future::BoxFuture;
use tracing::{debug, warn};

use super::{ApiRequest, ApiResponse, Transport};
use crate::error::ApiError;
use crate::mock;

/// Passes failures through unless the backend never answered (refused,
/// unreachable, timed out); those get a canned response.
pub struct LiveTransport<T> {
    inner: T,
}

impl<T: Transport> LiveTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

impl<T: Transport> Transport for LiveTransport<T> {
    fn send(&self, request: ApiRequest) -> BoxFuture<'_, Result<ApiResponse, ApiError>> {
        Box::pin(async move {
            let method = request.method.clone();
            let path = request.path.clone();
            match self.inner.send(request).await {
                Err(e) if e.is_offline() => {
                    warn!("Backend unreachable for {} {} ({}), using demo data", method, path, e);
                    Ok(mock::canned_response(&method, &path))
                }
                other => other,
            }
        })
    }
}

/// Every failure is replaced by a canned response.
pub struct DemoTransport<T> {
    inner: T,
}

impl<T: Transport> DemoTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

impl<T: Transport> Transport for DemoTransport<T> {
    fn send(&self, request: ApiRequest) -> BoxFuture<'_, Result<ApiResponse, ApiError>> {
        Box::pin(async move {
            let method = request.method.clone();
            let path = request.path.clone();
            match self.inner.send(request).await {
                Ok(resp) => Ok(resp),
                Err(e) => {
                    debug!("Demo fallback for {} {}: {}", method, path, e);
                    Ok(mock::canned_response(&method, &path))
                }
            }
        })
    }
}
