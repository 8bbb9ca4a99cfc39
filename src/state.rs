//! Application state store.
//!
//! One `AppState` per process, mutated only through [`Action`]s. Consumers hold
//! an [`AppStore`] handle (cheap to clone) and either read snapshots or
//! subscribe to changes.

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, warn};

use crate::config::SUCCESS_DISMISS_MS;
use crate::error::StoreError;
use crate::notification::{Notification, NotificationDraft, NotificationType};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppState {
    /// Newest first.
    pub notifications: Vec<Notification>,
    pub loading: bool,
    pub connected: bool,
}

/// Either a notification that was already stamped or a draft to stamp.
///
/// On the wire, any object carrying a non-empty `id` is a full notification;
/// anything else is a draft, and shapes that are not objects become an empty
/// draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NotificationPayload {
    Full(Notification),
    Draft(NotificationDraft),
}

impl Default for NotificationPayload {
    fn default() -> Self {
        NotificationPayload::Draft(NotificationDraft::default())
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct WireNotification {
    id: Option<String>,
    #[serde(rename = "type", deserialize_with = "lenient")]
    kind: NotificationType,
    title: String,
    message: String,
    #[serde(deserialize_with = "lenient")]
    timestamp: Option<DateTime<Utc>>,
    read: bool,
}

impl<'de> Deserialize<'de> for NotificationPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire: WireNotification = lenient(deserializer)?;
        let payload = match wire.id.filter(|id| !id.is_empty()) {
            Some(id) => NotificationPayload::Full(Notification {
                id,
                kind: wire.kind,
                title: wire.title,
                message: wire.message,
                timestamp: wire.timestamp.unwrap_or_else(Utc::now),
                read: wire.read,
            }),
            None => NotificationPayload::Draft(NotificationDraft {
                kind: wire.kind,
                title: wire.title,
                message: wire.message,
            }),
        };
        Ok(payload)
    }
}

/// Decode `T`, or fall back to `T::default()` when the value has the wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    AddNotification {
        #[serde(default)]
        payload: NotificationPayload,
    },
    RemoveNotification {
        #[serde(default, deserialize_with = "lenient")]
        payload: String,
    },
    MarkNotificationRead {
        #[serde(default, deserialize_with = "lenient")]
        payload: String,
    },
    SetLoading {
        #[serde(default, deserialize_with = "lenient")]
        payload: bool,
    },
    SetConnected {
        #[serde(default, deserialize_with = "lenient")]
        payload: bool,
    },
    #[serde(other)]
    Unknown,
}

impl AppState {
    /// Apply one action in place. Returns whether anything changed.
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::AddNotification { payload } => {
                let notification = match payload {
                    NotificationPayload::Full(n) => n,
                    NotificationPayload::Draft(draft) => Notification::from_draft(draft),
                };
                self.notifications.insert(0, notification);
                true
            }
            Action::RemoveNotification { payload: id } => {
                let before = self.notifications.len();
                self.notifications.retain(|n| n.id != id);
                self.notifications.len() != before
            }
            Action::MarkNotificationRead { payload: id } => {
                match self.notifications.iter_mut().find(|n| n.id == id) {
                    Some(n) if !n.read => {
                        n.read = true;
                        true
                    }
                    _ => false,
                }
            }
            Action::SetLoading { payload } => {
                let changed = self.loading != payload;
                self.loading = payload;
                changed
            }
            Action::SetConnected { payload } => {
                let changed = self.connected != payload;
                self.connected = payload;
                changed
            }
            Action::Unknown => false,
        }
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }
}

/// Pure form of [`AppState::apply`].
pub fn reduce(state: &AppState, action: Action) -> AppState {
    let mut next = state.clone();
    next.apply(action);
    next
}

tokio::task_local! {
    static APP_STORE: AppStore;
}

#[derive(Clone)]
pub struct AppStore {
    tx: Arc<watch::Sender<AppState>>,
}

impl AppStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(AppState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Apply an action; subscribers are only woken when the state changed.
    pub fn dispatch(&self, action: Action) {
        self.tx.send_if_modified(|state| state.apply(action));
    }

    pub fn snapshot(&self) -> AppState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.tx.subscribe()
    }

    /// Stream of states, starting with the current one.
    pub fn changes(&self) -> WatchStream<AppState> {
        WatchStream::new(self.tx.subscribe())
    }

    /// Stamp and prepend a notification. Success notifications remove
    /// themselves after [`SUCCESS_DISMISS_MS`]; the timer is never cancelled.
    pub fn add_notification(&self, draft: NotificationDraft) -> Notification {
        let notification = Notification::from_draft(draft);
        self.dispatch(Action::AddNotification {
            payload: NotificationPayload::Full(notification.clone()),
        });
        if notification.kind == NotificationType::Success {
            self.schedule_dismiss(notification.id.clone());
        }
        notification
    }

    pub fn remove_notification(&self, id: &str) {
        self.dispatch(Action::RemoveNotification {
            payload: id.to_string(),
        });
    }

    pub fn mark_notification_read(&self, id: &str) {
        self.dispatch(Action::MarkNotificationRead {
            payload: id.to_string(),
        });
    }

    pub fn set_loading(&self, loading: bool) {
        self.dispatch(Action::SetLoading { payload: loading });
    }

    pub fn set_connected(&self, connected: bool) {
        self.dispatch(Action::SetConnected { payload: connected });
    }

    pub fn unread_count(&self) -> usize {
        self.tx.borrow().unread_count()
    }

    /// Run `fut` with this store installed as the ambient store, so code
    /// inside it can reach the store through [`use_app_store`].
    pub async fn provide<F: Future>(&self, fut: F) -> F::Output {
        APP_STORE.scope(self.clone(), fut).await
    }

    fn schedule_dismiss(&self, id: String) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(h) => h,
            Err(_) => {
                warn!("No async runtime; notification {} will not auto-dismiss", id);
                return;
            }
        };
        let store = self.clone();
        handle.spawn(async move {
            tokio::time::sleep(Duration::from_millis(SUCCESS_DISMISS_MS)).await;
            debug!("Auto-dismissing notification {}", id);
            store.remove_notification(&id);
        });
    }
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new()
    }
}

/// The store installed by the enclosing [`AppStore::provide`] call.
pub fn use_app_store() -> Result<AppStore, StoreError> {
    APP_STORE
        .try_with(|store| store.clone())
        .map_err(|_| StoreError::OutsideProvider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(kind: NotificationType, message: &str) -> NotificationDraft {
        NotificationDraft::new(kind, "", message)
    }

    // --- Reducer tests ---

    #[test]
    fn test_initial_state() {
        let state = AppState::default();
        assert!(state.notifications.is_empty());
        assert!(!state.loading);
        assert!(!state.connected);
    }

    #[test]
    fn test_add_notification_prepends() {
        let mut state = AppState::default();
        for msg in ["first", "second", "third"] {
            state.apply(Action::AddNotification {
                payload: NotificationPayload::Draft(draft(NotificationType::Info, msg)),
            });
        }
        let messages: Vec<&str> = state.notifications.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["third", "second", "first"]);
    }

    #[test]
    fn test_add_full_notification_is_forwarded_unchanged() {
        let n = Notification::from_draft(draft(NotificationType::Error, "boom"));
        let state = reduce(
            &AppState::default(),
            Action::AddNotification {
                payload: NotificationPayload::Full(n.clone()),
            },
        );
        assert_eq!(state.notifications, vec![n]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let n = Notification::from_draft(draft(NotificationType::Info, "x"));
        let mut state = AppState::default();
        state.apply(Action::AddNotification {
            payload: NotificationPayload::Full(n.clone()),
        });
        let remove = Action::RemoveNotification { payload: n.id.clone() };
        let once = reduce(&state, remove.clone());
        let twice = reduce(&once, remove);
        assert_eq!(once, twice);
        assert!(once.notifications.is_empty());
    }

    #[test]
    fn test_remove_absent_id_reports_no_change() {
        let mut state = AppState::default();
        assert!(!state.apply(Action::RemoveNotification {
            payload: "missing".to_string()
        }));
    }

    #[test]
    fn test_mark_read_only_touches_target() {
        let a = Notification::from_draft(draft(NotificationType::Info, "a"));
        let b = Notification::from_draft(draft(NotificationType::Info, "b"));
        let mut state = AppState::default();
        for n in [a.clone(), b.clone()] {
            state.apply(Action::AddNotification {
                payload: NotificationPayload::Full(n),
            });
        }
        assert!(state.apply(Action::MarkNotificationRead { payload: a.id.clone() }));
        assert!(!state.apply(Action::MarkNotificationRead { payload: a.id.clone() }));
        let read: Vec<bool> = state.notifications.iter().map(|n| n.read).collect();
        assert_eq!(read, vec![false, true]);
        assert_eq!(state.unread_count(), 1);
    }

    #[test]
    fn test_set_flags() {
        let state = reduce(&AppState::default(), Action::SetLoading { payload: true });
        let state = reduce(&state, Action::SetConnected { payload: true });
        assert!(state.loading);
        assert!(state.connected);
    }

    #[test]
    fn test_unknown_action_leaves_state_unchanged() {
        let mut state = AppState::default();
        state.apply(Action::SetConnected { payload: true });
        let before = state.clone();
        assert!(!state.apply(Action::Unknown));
        assert_eq!(state, before);
    }

    // --- Wire form ---

    #[test]
    fn test_action_wire_form() {
        let action: Action =
            serde_json::from_value(json!({"type": "SET_LOADING", "payload": true})).unwrap();
        assert_eq!(action, Action::SetLoading { payload: true });
    }

    #[test]
    fn test_unrecognized_tag_decodes_to_unknown() {
        let action: Action =
            serde_json::from_value(json!({"type": "CLEAR_EVERYTHING", "payload": 1})).unwrap();
        assert_eq!(action, Action::Unknown);
    }

    #[test]
    fn test_add_notification_accepts_partial_payload() {
        let action: Action = serde_json::from_value(json!({
            "type": "ADD_NOTIFICATION",
            "payload": {"message": "Extraction finished", "type": "success"}
        }))
        .unwrap();
        let state = reduce(&AppState::default(), action);
        assert_eq!(state.notifications.len(), 1);
        assert_eq!(state.notifications[0].kind, NotificationType::Success);
        assert_eq!(state.notifications[0].title, "Success");
    }

    #[test]
    fn test_add_notification_with_id_keeps_it() {
        let action: Action = serde_json::from_value(json!({
            "type": "ADD_NOTIFICATION",
            "payload": {"id": "n-1", "message": "m", "type": "error"}
        }))
        .unwrap();
        let mut state = reduce(&AppState::default(), action);
        assert_eq!(state.notifications.len(), 1);
        assert_eq!(state.notifications[0].id, "n-1");
        assert_eq!(state.notifications[0].kind, NotificationType::Error);
        assert!(!state.notifications[0].read);

        assert!(state.apply(Action::RemoveNotification {
            payload: "n-1".to_string()
        }));
        assert!(state.notifications.is_empty());
    }

    #[test]
    fn test_add_notification_with_non_object_payload_uses_empty_draft() {
        for payload in [json!("oops"), json!(42), json!(null), json!([1, 2])] {
            let action: Action =
                serde_json::from_value(json!({"type": "ADD_NOTIFICATION", "payload": payload}))
                    .unwrap();
            let state = reduce(&AppState::default(), action);
            assert_eq!(state.notifications.len(), 1);
            assert_eq!(state.notifications[0].kind, NotificationType::Info);
            assert_eq!(state.notifications[0].title, "Info");
            assert!(state.notifications[0].message.is_empty());
        }
    }

    #[test]
    fn test_missing_or_mistyped_payloads_fall_back_to_defaults() {
        let action: Action = serde_json::from_value(json!({"type": "SET_LOADING"})).unwrap();
        assert_eq!(action, Action::SetLoading { payload: false });

        let action: Action =
            serde_json::from_value(json!({"type": "SET_CONNECTED", "payload": "yes"})).unwrap();
        assert_eq!(action, Action::SetConnected { payload: false });

        let action: Action =
            serde_json::from_value(json!({"type": "REMOVE_NOTIFICATION", "payload": 7})).unwrap();
        assert_eq!(
            action,
            Action::RemoveNotification {
                payload: String::new()
            }
        );

        let action: Action = serde_json::from_value(json!({"type": "ADD_NOTIFICATION"})).unwrap();
        assert_eq!(
            action,
            Action::AddNotification {
                payload: NotificationPayload::default()
            }
        );
    }

    // --- Store tests ---

    #[tokio::test]
    async fn test_dispatch_notifies_subscribers() {
        let store = AppStore::new();
        let mut rx = store.subscribe();
        store.set_loading(true);
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().loading);
    }

    #[tokio::test]
    async fn test_no_op_dispatch_does_not_notify() {
        let store = AppStore::new();
        let mut rx = store.subscribe();
        rx.borrow_and_update();
        store.dispatch(Action::Unknown);
        store.set_connected(false);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_use_app_store_outside_provider_fails() {
        assert!(matches!(use_app_store(), Err(StoreError::OutsideProvider)));
    }

    #[tokio::test]
    async fn test_use_app_store_inside_provider() {
        let store = AppStore::new();
        store
            .provide(async {
                let inner = use_app_store().unwrap();
                inner.set_connected(true);
            })
            .await;
        assert!(store.snapshot().connected);
    }
}
