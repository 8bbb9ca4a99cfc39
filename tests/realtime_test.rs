use axum::extract::ws::{Message, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde_json::Value;
use std::sync::mpsc;

use metatest_client::realtime::subscribe_updates;
use metatest_client::ClientConfig;

async fn updates(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(|mut socket| async move {
        let frames = [
            r#"{"type":"test_update","test_run_id":"r1","status":"running","progress":40}"#,
            "definitely not json",
            r#"{"type":"test_update","test_run_id":"r1","status":"completed","progress":100}"#,
        ];
        for frame in frames {
            if socket.send(Message::Text(frame.into())).await.is_err() {
                return;
            }
        }
        let _ = socket.send(Message::Close(None)).await;
    })
}

async fn spawn_backend() -> String {
    let router = Router::new().route("/ws", get(updates));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_messages_are_decoded_and_bad_frames_skipped() {
    let base = spawn_backend().await;
    let config = ClientConfig::new(base, false);

    let (tx, rx) = mpsc::channel::<Value>();
    let channel = subscribe_updates(&config, move |message| {
        let _ = tx.send(message);
    })
    .unwrap();
    assert_eq!(channel.url().scheme(), "ws");
    assert_eq!(channel.url().path(), "/ws");

    tokio::task::spawn_blocking(move || channel.join())
        .await
        .unwrap();

    let received: Vec<Value> = rx.try_iter().collect();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0]["status"], "running");
    assert_eq!(received[1]["status"], "completed");
    assert_eq!(received[1]["progress"], 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unreachable_backend_ends_quietly() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = ClientConfig::new(format!("http://127.0.0.1:{}", port), false);

    let (tx, rx) = mpsc::channel::<Value>();
    let channel = subscribe_updates(&config, move |message| {
        let _ = tx.send(message);
    })
    .unwrap();

    tokio::task::spawn_blocking(move || channel.join())
        .await
        .unwrap();
    assert_eq!(rx.try_iter().count(), 0);
}

#[test]
fn test_invalid_base_url_is_rejected_up_front() {
    let config = ClientConfig::new("not a url", false);
    assert!(subscribe_updates(&config, |_| {}).is_err());
}
