// Library crate for the CLI and integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod mock;
pub mod models;
pub mod notification;
pub mod realtime;
pub mod state;
pub mod transport;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::{ApiError, StoreError};
pub use notification::{Notification, NotificationDraft, NotificationType};
pub use state::{use_app_store, Action, AppState, AppStore};
