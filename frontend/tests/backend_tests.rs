//! Integration tests against an in-process fake switcher backend.

use std::net::SocketAddr;
use std::sync::mpsc::{channel, Receiver};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use fazantix_panel::api::{ApiClient, ApiError, SwitchGateway};
use fazantix_panel::app::PanelState;
use fazantix_panel::state::{AppMessage, ConnectionState};
use fazantix_panel::ws::{websocket_url, LiveSyncClient};
use fazantix_types::{ConfigResponse, SceneInfo, ServerMessage, StageInfo};

type Switches = Arc<Mutex<Vec<(String, String)>>>;

const PUSHED_FRAMES: [&str; 4] = [
    r#"{"fps": 59.94, "ws_clients": 3}"#,
    "not json at all",
    r#"{"Event": "set-scene", "Stage": "main", "Scene": "slides"}"#,
    r#"{"Event": "set-scene", "Stage": "main-preview", "Scene": "cam"}"#,
];

fn switcher_config() -> ConfigResponse {
    ConfigResponse {
        stages: vec![
            StageInfo::new("main", ""),
            StageInfo::new("main-preview", "main"),
            StageInfo::new("stream", ""),
        ],
        scenes: vec![
            SceneInfo::new("cam", "CAM", "Camera"),
            SceneInfo::new("slides", "SL", "Slides"),
        ],
    }
}

async fn config_handler() -> Json<ConfigResponse> {
    Json(switcher_config())
}

async fn scene_handler(
    State(switches): State<Switches>,
    Path((stage, scene)): Path<(String, String)>,
) -> StatusCode {
    switches.lock().unwrap().push((stage, scene));
    StatusCode::OK
}

async fn ws_handler(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(push_then_idle)
}

async fn push_then_idle(mut socket: WebSocket) {
    for frame in PUSHED_FRAMES {
        if socket.send(Message::Text(frame.into())).await.is_err() {
            return;
        }
    }
    // Keep the connection open until the client goes away
    while let Some(Ok(_)) = socket.recv().await {}
}

async fn closing_ws_handler(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(|mut socket| async move {
        let _ = socket
            .send(Message::Text(r#"{"ws_clients": 1}"#.into()))
            .await;
        let _ = socket.send(Message::Close(None)).await;
    })
}

/// Start the fake switcher and return its root URL and recorded switches.
async fn spawn_switcher() -> (String, Switches) {
    let switches = Switches::default();
    let app = Router::new()
        .route("/api/config", get(config_handler))
        .route("/api/scene/{stage}/{scene}", get(scene_handler))
        .route("/api/ws", get(ws_handler))
        .route("/closing/api/ws", get(closing_ws_handler))
        .route(
            "/broken/api/config",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "renderer not ready") }),
        )
        .with_state(switches.clone());

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), switches)
}

/// Wait for the next message from the sync client without blocking the runtime.
async fn next_message(rx: &Receiver<AppMessage>) -> AppMessage {
    for _ in 0..200 {
        if let Ok(message) = rx.try_recv() {
            return message;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no message from the live sync client within 2s");
}

#[tokio::test]
async fn test_get_config() {
    let (server, _) = spawn_switcher().await;
    let api = ApiClient::for_server(&server);

    let config = api.get_config().await.unwrap();

    assert_eq!(config, switcher_config());
}

#[tokio::test]
async fn test_get_config_http_error() {
    let (server, _) = spawn_switcher().await;
    let api = ApiClient::for_server(&format!("{}/broken", server));

    match api.get_config().await {
        Err(ApiError::Http(status, body)) => {
            assert_eq!(status, 500);
            assert_eq!(body, "renderer not ready");
        }
        other => panic!("expected HTTP error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_config_unreachable() {
    let api = ApiClient::for_server("http://127.0.0.1:1");
    assert!(matches!(api.get_config().await, Err(ApiError::Network(_))));
}

#[tokio::test]
async fn test_switch_scene_reaches_backend() {
    let (server, switches) = spawn_switcher().await;
    let api = ApiClient::for_server(&server);

    api.switch_scene("main", "slides");
    api.switch_scene("room/1", "cam 2");

    for _ in 0..200 {
        if switches.lock().unwrap().len() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let mut recorded = switches.lock().unwrap().clone();
    recorded.sort();
    assert_eq!(
        recorded,
        vec![
            ("main".to_string(), "slides".to_string()),
            ("room/1".to_string(), "cam 2".to_string()),
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_live_sync_delivers_pushed_state() {
    let (server, _) = spawn_switcher().await;
    let (tx, rx) = channel();
    let mut client = LiveSyncClient::new(websocket_url(&server), Duration::from_millis(50));
    client.start(tx, Arc::new(|| {}));

    assert!(matches!(
        next_message(&rx).await,
        AppMessage::ConnectionStateChanged(ConnectionState::Connecting { attempt: 1 })
    ));
    assert!(matches!(
        next_message(&rx).await,
        AppMessage::ConnectionStateChanged(ConnectionState::Open)
    ));

    let mut state = PanelState::default();
    state.install_config(&switcher_config());
    for _ in 0..3 {
        match next_message(&rx).await {
            AppMessage::Server(message) => state.handle_server(&message),
            other => panic!("unexpected message {:?}", other),
        }
    }
    client.stop();

    assert_eq!(state.telemetry.fps.as_deref(), Some("59.9"));
    assert_eq!(state.telemetry.ws_clients.as_deref(), Some("3"));
    assert!(state.selection.is_active("main", "slides"));
    assert!(state.selection.is_active("main-preview", "cam"));
    assert_eq!(state.selection.active("stream"), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_live_sync_reconnects_after_server_close() {
    let (server, _) = spawn_switcher().await;
    let (tx, rx) = channel();
    let mut client = LiveSyncClient::new(
        websocket_url(&format!("{}/closing", server)),
        Duration::from_millis(50),
    );
    client.start(tx, Arc::new(|| {}));

    let mut saw_telemetry = false;
    let mut saw_closed = false;
    loop {
        match next_message(&rx).await {
            AppMessage::Server(ServerMessage::Telemetry(stats)) => {
                assert_eq!(stats.ws_clients, Some(1));
                saw_telemetry = true;
            }
            AppMessage::ConnectionStateChanged(ConnectionState::Closed { retry_in }) => {
                assert_eq!(retry_in, Duration::from_millis(50));
                saw_closed = true;
            }
            AppMessage::ConnectionStateChanged(ConnectionState::Connecting { attempt: 2 }) => {
                break;
            }
            _ => {}
        }
    }
    client.stop();

    assert!(saw_telemetry);
    assert!(saw_closed);
    assert!(!client.is_running());
}
