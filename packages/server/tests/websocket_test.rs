//! Integration tests driving the real router over TCP.

use std::{net::SocketAddr, time::Duration};

use bounce_server::{app::App, config::Config};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::{net::TcpStream, task::JoinHandle};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Error as WsError, Message},
};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// In-process server bound to an ephemeral port
struct TestServer {
    addr: SocketAddr,
    app: Option<App>,
    serve_task: JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let config = Config {
            tick_ms: 10,
            ..Config::default()
        };
        let app = App::start(config);
        let router = app.router();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let serve_task = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        TestServer {
            addr,
            app: Some(app),
            serve_task,
        }
    }

    fn ws_url(&self, client_id: &str) -> String {
        format!("ws://{}/ws?client_id={}", self.addr, client_id)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn connect(&self, client_id: &str) -> Socket {
        let (socket, _) = connect_async(self.ws_url(client_id)).await.unwrap();
        socket
    }

    async fn get_json(&self, path: &str) -> (u16, Value) {
        let response = reqwest::get(self.http_url(path)).await.unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    async fn stop(mut self) {
        if let Some(app) = self.app.take() {
            app.shutdown().await;
        }
        self.serve_task.abort();
    }
}

async fn send_json(socket: &mut Socket, value: Value) {
    socket
        .send(Message::text(value.to_string()))
        .await
        .unwrap();
}

/// Read frames until one with the given `msg_type` arrives.
async fn next_of_type(socket: &mut Socket, msg_type: &str) -> Value {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match socket.next().await {
                Some(Ok(Message::Text(text))) => {
                    let value: Value = serde_json::from_str(&text).unwrap();
                    if value["msg_type"] == msg_type {
                        return value;
                    }
                }
                Some(Ok(_)) => continue,
                other => panic!("socket ended while waiting for {msg_type}: {other:?}"),
            }
        }
    })
    .await
    .unwrap()
}

async fn login(socket: &mut Socket, request_id: &str, name: &str) -> Value {
    let body = json!({ "name": name, "color": "#ff8800" }).to_string();
    send_json(
        socket,
        json!({
            "msg_type": "request",
            "request": {
                "request_id": request_id,
                "request_type": "login",
                "request_body": body,
            }
        }),
    )
    .await;
    next_of_type(socket, "response").await["response"].clone()
}

async fn rejected_status(url: String) -> u16 {
    match connect_async(url).await {
        Err(WsError::Http(response)) => response.status().as_u16(),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("connection should be rejected"),
    }
}

#[tokio::test]
async fn test_health_check() {
    // テスト項目: ヘルスチェックが ok と起動時刻を返す
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let (status, body) = server.get_json("/api/health").await;

    // then (期待する結果):
    assert_eq!(status, 200);
    assert_eq!(body["status"], "ok");
    assert!(body["started_at"].as_str().unwrap().ends_with('Z'));
    server.stop().await;
}

#[tokio::test]
async fn test_login_then_receive_world_updates() {
    // テスト項目: ログインに成功すると 202 が返り、以降ワールド更新が届く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut socket = server.connect("alice-1").await;

    // when (操作):
    let response = login(&mut socket, "req-1", "alice").await;

    // then (期待する結果):
    assert_eq!(response["request_id"], "req-1");
    assert_eq!(response["status"], 202);
    assert_eq!(response["status_text"], "Response Status: Accepted");
    assert_eq!(response["payload"]["players"][0]["name"], "alice");
    assert_eq!(response["payload"]["world_objects"][0]["obj_type"], "bunny");

    let update = next_of_type(&mut socket, "update").await;
    assert!(update["world_update"]["frame"].as_u64().unwrap() > 0);
    assert_eq!(update["world_update"]["players"][0]["name"], "alice");
    server.stop().await;
}

#[tokio::test]
async fn test_duplicate_name_is_unauthorized() {
    // テスト項目: 既に使われている名前でのログインは 401 になる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut first = server.connect("c1").await;
    let mut second = server.connect("c2").await;
    login(&mut first, "1", "alice").await;

    // when (操作):
    let response = login(&mut second, "2", "alice").await;

    // then (期待する結果):
    assert_eq!(response["status"], 401);
    assert_eq!(
        response["payload"],
        "Someone is already connected with the name alice"
    );
    let (_, world) = server.get_json("/api/world").await;
    assert_eq!(world["players"].as_array().unwrap().len(), 1);
    server.stop().await;
}

#[tokio::test]
async fn test_unknown_request_and_malformed_frame() {
    // テスト項目: 未知のリクエストとデコードできないリクエストに 400 が返る
    // given (前提条件):
    let server = TestServer::start().await;
    let mut socket = server.connect("c1").await;

    // when (操作):
    send_json(
        &mut socket,
        json!({
            "msg_type": "request",
            "request": { "request_id": "r1", "request_type": "dance" }
        }),
    )
    .await;
    let unknown = next_of_type(&mut socket, "response").await;
    socket
        .send(Message::text(r#"{"msg_type":"request","request":{"request_id":"r2"}}"#))
        .await
        .unwrap();
    let malformed = next_of_type(&mut socket, "response").await;

    // then (期待する結果):
    assert_eq!(unknown["response"]["status"], 400);
    assert_eq!(unknown["response"]["payload"], "Unknown request type dance");
    assert_eq!(malformed["response"]["request_id"], "r2");
    assert_eq!(malformed["response"]["status"], 400);
    server.stop().await;
}

#[tokio::test]
async fn test_chat_is_relayed_to_players() {
    // テスト項目: チャット通知がゲーム中の全クライアントに中継される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = server.connect("c1").await;
    let mut bob = server.connect("c2").await;
    login(&mut alice, "1", "alice").await;
    login(&mut bob, "2", "bob").await;

    // when (操作):
    send_json(
        &mut alice,
        json!({
            "msg_type": "notify",
            "notify": {
                "notify_type": "chat",
                "chat": { "channel": "all", "message": "hello" }
            }
        }),
    )
    .await;

    // then (期待する結果):
    let chat = next_of_type(&mut bob, "chat").await;
    assert_eq!(chat["chat"]["channel"], "all");
    assert_eq!(chat["chat"]["message"], "hello");
    server.stop().await;
}

#[tokio::test]
async fn test_rejects_missing_invalid_and_duplicate_client_id() {
    // テスト項目: client_id がない・不正・重複している接続は拒否される
    // given (前提条件):
    let server = TestServer::start().await;
    let _first = server.connect("c1").await;

    // when (操作):
    let missing = rejected_status(format!("ws://{}/ws", server.addr)).await;
    let blank = rejected_status(server.ws_url("%20")).await;
    let duplicate = rejected_status(server.ws_url("c1")).await;

    // then (期待する結果):
    assert_eq!(missing, 400);
    assert_eq!(blank, 400);
    assert_eq!(duplicate, 409);
    server.stop().await;
}

#[tokio::test]
async fn test_disconnect_removes_connection_and_player() {
    // テスト項目: 切断すると接続一覧とワールドから削除される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut socket = server.connect("c1").await;
    login(&mut socket, "1", "alice").await;
    let (_, connections) = server.get_json("/api/connections").await;
    assert_eq!(connections[0]["client_id"], "c1");
    assert_eq!(connections[0]["status"], "in_game");

    // when (操作):
    socket.close(None).await.unwrap();

    // then (期待する結果):
    let mut cleaned_up = false;
    for _ in 0..100 {
        let (_, connections) = server.get_json("/api/connections").await;
        let (_, world) = server.get_json("/api/world").await;
        if connections.as_array().unwrap().is_empty()
            && world["players"].as_array().unwrap().is_empty()
        {
            cleaned_up = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(cleaned_up);
    server.stop().await;
}

#[tokio::test]
async fn test_store_endpoints() {
    // テスト項目: ストアのツリーと値を HTTP で取得できる
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let (tree_status, tree) = server.get_json("/api/store").await;
    let (bucket_status, bucket) = server.get_json("/api/store/users").await;
    let (missing_status, missing) = server.get_json("/api/store/users.nobody").await;

    // then (期待する結果):
    assert_eq!(tree_status, 200);
    assert!(tree.get("matches").is_some());
    assert_eq!(bucket_status, 200);
    assert_eq!(bucket, json!({}));
    assert_eq!(missing_status, 404);
    assert!(missing["error"].as_str().is_some());
    server.stop().await;
}
