//! Server-push channel for live test updates.
//!
//! One connection per call. The reader runs on its own thread, hands every
//! decoded JSON message to the caller's handler and stops for good on error or
//! close; reconnecting is up to the caller.

use serde_json::Value;
use std::thread::JoinHandle;
use tracing::{info, warn};
use tungstenite::Message;
use url::Url;

use crate::config::{ClientConfig, WS_PATH};
use crate::error::ApiError;

pub struct UpdateChannel {
    url: Url,
    handle: JoinHandle<()>,
}

impl UpdateChannel {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the connection has closed.
    pub fn join(self) {
        if self.handle.join().is_err() {
            warn!("WebSocket reader for {} panicked", self.url);
        }
    }
}

/// `http://host:port/base` -> `ws://host:port/base/ws`
pub fn ws_url(base_url: &str) -> Result<Url, ApiError> {
    let mut url =
        Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(ApiError::InvalidUrl(format!(
                "unsupported scheme for WebSocket: {}",
                other
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| ApiError::InvalidUrl(format!("cannot switch {} to {}", base_url, scheme)))?;
    let path = format!("{}{}", url.path().trim_end_matches('/'), WS_PATH);
    url.set_path(&path);
    url.set_query(None);
    Ok(url)
}

pub fn subscribe_updates<F>(config: &ClientConfig, handler: F) -> Result<UpdateChannel, ApiError>
where
    F: FnMut(Value) + Send + 'static,
{
    let url = ws_url(&config.base_url)?;
    let target = url.to_string();
    let handle = std::thread::Builder::new()
        .name("metatest-updates".to_string())
        .spawn(move || read_updates(&target, handler))?;
    Ok(UpdateChannel { url, handle })
}

fn read_updates<F: FnMut(Value)>(url: &str, mut handler: F) {
    let (mut socket, _) = match tungstenite::connect(url) {
        Ok(conn) => conn,
        Err(e) => {
            warn!("WebSocket connection to {} failed: {}", url, e);
            return;
        }
    };
    info!("WebSocket connected to {}", url);

    loop {
        match socket.read() {
            Ok(Message::Text(text)) => match serde_json::from_str::<Value>(text.as_str()) {
                Ok(message) => handler(message),
                Err(e) => warn!("Failed to parse WebSocket message: {}", e),
            },
            Ok(Message::Close(_)) => {
                info!("WebSocket closed by server");
                break;
            }
            Ok(_) => {} // ping/pong/binary
            Err(tungstenite::Error::ConnectionClosed) | Err(tungstenite::Error::AlreadyClosed) => {
                info!("WebSocket closed");
                break;
            }
            Err(e) => {
                warn!("WebSocket error: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_url_from_http() {
        let url = ws_url("http://localhost:8000").unwrap();
        assert_eq!(url.as_str(), "ws://localhost:8000/ws");
    }

    #[test]
    fn test_ws_url_from_https_keeps_base_path() {
        let url = ws_url("https://api.example.com/backend/").unwrap();
        assert_eq!(url.as_str(), "wss://api.example.com/backend/ws");
    }

    #[test]
    fn test_ws_url_rejects_other_schemes() {
        assert!(matches!(
            ws_url("ftp://example.com"),
            Err(ApiError::InvalidUrl(_))
        ));
    }
}
