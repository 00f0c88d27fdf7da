//! End-to-end tests driving the reqwest transport against a local HTTP server

use std::io::Read;
use std::net::TcpListener;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use gqlz_connection::{
    ConnectionManager, HttpTransport, KeyValueStore, MemoryStore, SingleConnectionStore,
    StoreSettings,
};
use gqlz_core::{FaultSource, GraphQlVariables, SqlOptions};
use serde_json::json;
use tiny_http::{Header, Response, Server};

/// What the server saw of one request
#[derive(Debug)]
struct Captured {
    method: String,
    url: String,
    admin_secret: Option<String>,
    body: serde_json::Value,
}

/// Serve a single request with `status` and `body`, reporting what was received
fn one_shot_server(status: u16, body: &'static str) -> (String, mpsc::Receiver<Captured>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        if let Ok(mut request) = server.recv() {
            let mut raw = String::new();
            let _ = request.as_reader().read_to_string(&mut raw);
            let admin_secret = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("x-hasura-admin-secret"))
                .map(|h| h.value.as_str().to_string());
            let captured = Captured {
                method: request.method().to_string(),
                url: request.url().to_string(),
                admin_secret,
                body: serde_json::from_str(&raw).unwrap_or(serde_json::Value::Null),
            };
            let content_type =
                Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
            let response = Response::from_string(body)
                .with_status_code(status)
                .with_header(content_type);
            let _ = request.respond(response);
            let _ = tx.send(captured);
        }
    });

    (format!("http://{}", addr), rx)
}

fn transport() -> Arc<HttpTransport> {
    Arc::new(HttpTransport::new(Duration::from_secs(5)).unwrap())
}

fn received(rx: &mpsc::Receiver<Captured>) -> Captured {
    rx.recv_timeout(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn graphql_request_shape_and_payload() {
    let (url, rx) = one_shot_server(200, r#"{"data": {"users": [{"id": 1}]}}"#);
    let manager = ConnectionManager::new(transport());
    manager.add_connection("local", &format!("{}/", url), "s3cret");

    let mut variables = GraphQlVariables::new();
    variables.insert("limit".into(), json!(1));
    let result = manager
        .execute_graphql("query ($limit: Int) { users(limit: $limit) { id } }", &variables)
        .await;

    assert_eq!(result.payload(), Some(&json!({"users": [{"id": 1}]})));

    let captured = received(&rx);
    assert_eq!(captured.method, "POST");
    assert_eq!(captured.url, "/v1/graphql");
    assert_eq!(captured.admin_secret.as_deref(), Some("s3cret"));
    assert_eq!(
        captured.body,
        json!({
            "query": "query ($limit: Int) { users(limit: $limit) { id } }",
            "variables": {"limit": 1}
        })
    );
}

#[tokio::test]
async fn sql_rows_over_http() {
    let (url, rx) = one_shot_server(
        200,
        r#"{"result_type": "TuplesOk", "result": [["id", "name"], ["1", null]]}"#,
    );
    let store = SingleConnectionStore::new(transport());
    store.update_connection(&url, "s3cret");

    let result = store
        .execute_sql("SELECT id, name FROM users", SqlOptions::read_only())
        .await;

    let payload = result.payload().unwrap();
    assert_eq!(payload.row_count(), 2);
    assert_eq!(payload.rows()[1], vec![Some("1".to_string()), None]);

    let captured = received(&rx);
    assert_eq!(captured.url, "/v2/query");
    assert_eq!(
        captured.body,
        json!({
            "type": "run_sql",
            "args": {
                "source": "default",
                "sql": "SELECT id, name FROM users",
                "cascade": false,
                "read_only": true
            }
        })
    );
}

#[tokio::test]
async fn rejected_secret_marks_connection_unhealthy() {
    let (url, rx) = one_shot_server(
        403,
        r#"{"error": "invalid secret", "path": "$", "code": "access-denied"}"#,
    );
    let manager = ConnectionManager::new(transport());
    manager.add_connection("local", &url, "wrong");

    assert!(!manager.test_connection().await);

    let state = manager.state();
    let fault = state.fault().unwrap();
    assert_eq!(fault.message, "invalid secret");
    assert_eq!(fault.source, FaultSource::GatewaySql);
    assert_eq!(received(&rx).body["args"]["sql"], "SELECT 1");
}

#[tokio::test]
async fn unreachable_gateway_is_transport_fault() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = SingleConnectionStore::new(transport());
    store.update_connection(&format!("http://{}", addr), "s3cret");

    assert!(!store.test_connection().await);
    assert_eq!(
        store.state().fault().unwrap().source,
        FaultSource::Transport
    );
    assert_eq!(store.last_error().unwrap().source, FaultSource::Transport);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn restored_profiles_reach_the_same_gateway() {
    let (url, rx) = one_shot_server(200, r#"{"data": {"ok": true}}"#);
    let kv = Arc::new(MemoryStore::new());
    let settings = StoreSettings::default();

    let first = ConnectionManager::with_settings(transport(), kv.clone(), &settings);
    first.add_connection("local", &url, "s3cret");
    assert!(kv.get_item(&settings.storage_key).unwrap().is_some());

    let second = ConnectionManager::with_settings(transport(), kv, &settings);
    let result = second
        .execute_graphql("{ ok }", &GraphQlVariables::new())
        .await;

    assert!(result.is_success());
    assert_eq!(received(&rx).admin_secret.as_deref(), Some("s3cret"));
}
