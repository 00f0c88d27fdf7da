//! Test scaffolding shared by the store tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use gqlz_core::request::{GRAPHQL_PATH, SQL_PATH};
use gqlz_core::{GatewayResponse, GatewayTransport, GqlzError, Result};

/// A request the mock transport received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub admin_secret: String,
    pub body: serde_json::Value,
}

/// Canned reply for one endpoint
#[derive(Debug, Clone)]
pub enum MockReply {
    Respond(GatewayResponse),
    Unreachable(String),
}

/// Transport that answers from canned replies and records every request
pub struct MockTransport {
    graphql: Mutex<MockReply>,
    sql: Mutex<MockReply>,
    requests: Mutex<Vec<RecordedRequest>>,
    call_count: AtomicU32,
    latency: Mutex<Option<Duration>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            graphql: Mutex::new(MockReply::Respond(GatewayResponse::new(
                200,
                r#"{"data": {}}"#,
            ))),
            sql: Mutex::new(MockReply::Respond(GatewayResponse::new(
                200,
                r#"{"result_type": "TuplesOk", "result": [["?column?"], ["1"]]}"#,
            ))),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicU32::new(0),
            latency: Mutex::new(None),
        })
    }

    pub fn reply_graphql(&self, status: u16, body: &str) {
        *self.graphql.lock() = MockReply::Respond(GatewayResponse::new(status, body));
    }

    pub fn reply_sql(&self, status: u16, body: &str) {
        *self.sql.lock() = MockReply::Respond(GatewayResponse::new(status, body));
    }

    pub fn unreachable(&self, message: &str) {
        *self.graphql.lock() = MockReply::Unreachable(message.to_string());
        *self.sql.lock() = MockReply::Unreachable(message.to_string());
    }

    /// Hold every reply for `latency` before answering
    pub fn respond_after(&self, latency: Duration) {
        *self.latency.lock() = Some(latency);
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl GatewayTransport for MockTransport {
    async fn post_json(
        &self,
        url: &str,
        admin_secret: &str,
        body: &serde_json::Value,
    ) -> Result<GatewayResponse> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(RecordedRequest {
            url: url.to_string(),
            admin_secret: admin_secret.to_string(),
            body: body.clone(),
        });

        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let reply = if url.ends_with(GRAPHQL_PATH) {
            self.graphql.lock().clone()
        } else if url.ends_with(SQL_PATH) {
            self.sql.lock().clone()
        } else {
            MockReply::Respond(GatewayResponse::new(404, "not found"))
        };

        match reply {
            MockReply::Respond(response) => Ok(response),
            MockReply::Unreachable(message) => Err(GqlzError::Transport(message)),
        }
    }
}
