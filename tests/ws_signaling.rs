use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream};

use telequeue::{routes, state::AppState, ServerConfig};

type Ws = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

async fn spawn_server() -> SocketAddr {
    let app_state = AppState::new(ServerConfig {
        auth_required: false,
        ..ServerConfig::default()
    });

    let app = routes::ws::create_ws_router().with_state(app_state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

/// Connect and subscribe to the user's direct channel
async fn connect_as(addr: SocketAddr, user_id: &str) -> Ws {
    let url = format!("ws://{addr}/ws");
    let (mut ws, _) = connect_async(url).await.expect("Failed to connect");
    send(&mut ws, json!({"type": "joinRoom", "userId": user_id})).await;
    ws
}

async fn send(ws: &mut Ws, event: Value) {
    ws.send(Message::Text(event.to_string().into()))
        .await
        .unwrap();
}

async fn recv(ws: &mut Ws) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for server event")
            .expect("connection closed")
            .expect("websocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

#[tokio::test]
async fn test_call_lifecycle_between_two_clients() {
    let addr = spawn_server().await;

    let mut alice = connect_as(addr, "alice").await;
    let mut bob = connect_as(addr, "bob").await;

    // Give joinRoom a moment to land before sending through the relay
    tokio::time::sleep(Duration::from_millis(100)).await;

    send(
        &mut alice,
        json!({"type": "requestVideoCall", "from": "alice", "to": "bob"}),
    )
    .await;

    let request = recv(&mut bob).await;
    assert_eq!(request["type"], "videoCallRequest");
    assert_eq!(request["from"], "alice");
    assert_eq!(request["to"], "bob");

    send(
        &mut bob,
        json!({"type": "videoCallResponse", "from": "bob", "to": "alice", "accepted": true}),
    )
    .await;

    let response = recv(&mut alice).await;
    assert_eq!(response["type"], "videoCallResponse");
    assert_eq!(response["accepted"], true);

    send(
        &mut alice,
        json!({"type": "endVideoCall", "from": "alice", "to": "bob"}),
    )
    .await;

    let ended = recv(&mut bob).await;
    assert_eq!(ended["type"], "videoCallEnded");
    assert_eq!(ended["from"], "alice");
}

#[tokio::test]
async fn test_signal_payload_is_forwarded_opaquely() {
    let addr = spawn_server().await;

    let mut alice = connect_as(addr, "alice").await;
    let mut bob = connect_as(addr, "bob").await;

    tokio::time::sleep(Duration::from_millis(100)).await;

    // The relay must not inspect or normalize the payload
    let payload = json!({
        "sdp": {"type": "offer", "description": "v=0\r\no=- 46117 2 IN IP4 127.0.0.1"},
        "candidates": [{"sdpMid": "0", "candidate": "candidate:1 1 UDP 2122252543"}],
        "extra": null
    });

    send(
        &mut alice,
        json!({"type": "videoCallSignal", "from": "alice", "to": "bob", "signal": payload}),
    )
    .await;

    let event = recv(&mut bob).await;
    assert_eq!(event["type"], "videoCallSignal");
    assert_eq!(event["from"], "alice");
    assert_eq!(event["signal"], payload);
}

#[tokio::test]
async fn test_signal_to_unknown_destination_is_dropped_silently() {
    let addr = spawn_server().await;

    let mut alice = connect_as(addr, "alice").await;

    tokio::time::sleep(Duration::from_millis(100)).await;

    send(
        &mut alice,
        json!({"type": "videoCallSignal", "from": "alice", "to": "nobody", "signal": {"x": 1}}),
    )
    .await;

    // No error event comes back. A follow-up signal addressed to alice
    // herself must be the next thing she receives.
    send(
        &mut alice,
        json!({"type": "videoCallSignal", "from": "alice", "to": "alice", "signal": {"x": 2}}),
    )
    .await;

    let event = recv(&mut alice).await;
    assert_eq!(event["type"], "videoCallSignal");
    assert_eq!(event["signal"]["x"], 2);
}
