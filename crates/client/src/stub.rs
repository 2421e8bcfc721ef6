//! Scripted in-memory [`Transport`] for tests that must not touch the network.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::fetcher::{
    Fetcher, Method, Transport, TransportError, TransportRequest, TransportResponse,
};

#[derive(Debug, Clone)]
enum Reply {
    Response { status: u16, body: String },
    Unreachable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// Answers per `(method, path)`. Queued replies are consumed in order; the last one repeats.
#[derive(Debug, Default)]
pub struct StubTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl StubTransport {
    pub const BASE_URL: &'static str = "http://stub.planboard/api";

    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fetcher(self: &Arc<Self>) -> Fetcher {
        Fetcher::new(Self::BASE_URL, self.clone())
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.push(
            method,
            path,
            Reply::Response {
                status,
                body: body.to_string(),
            },
        );
    }

    pub fn respond_raw(&self, method: Method, path: &str, status: u16, body: &str) {
        self.push(
            method,
            path,
            Reply::Response {
                status,
                body: body.to_string(),
            },
        );
    }

    /// Make the route behave as if no response ever arrived.
    pub fn fail(&self, method: Method, path: &str) {
        self.push(method, path, Reply::Unreachable);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|request| request.method == method && request.path == path)
            .count()
    }

    fn push(&self, method: Method, path: &str, reply: Reply) {
        self.routes
            .lock()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    fn next_reply(&self, method: Method, path: &str) -> Option<Reply> {
        let mut routes = self.routes.lock();
        let queue = routes.get_mut(&(method, path.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let path = request
            .url
            .strip_prefix(Self::BASE_URL)
            .unwrap_or(&request.url)
            .to_string();
        self.requests.lock().push(RecordedRequest {
            method: request.method,
            path: path.clone(),
            body: request.body,
        });

        match self.next_reply(request.method, &path) {
            Some(Reply::Response { status, body }) => Ok(TransportResponse { status, body }),
            Some(Reply::Unreachable) => Err(TransportError("connection refused".into())),
            None => Ok(TransportResponse {
                status: 404,
                body: json!({"error": format!("no stub for {} {}", request.method, path)})
                    .to_string(),
            }),
        }
    }
}
