//! Transport seam: one request in, one status + body out. Status interpretation lives in the gateway.

use crate::error::TransportError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base, always starting with `/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ResponseBody {
    Empty,
    Text(String),
    Json(Value),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// reqwest-backed transport rooted at an API base URL (e.g. `http://localhost:8090/api`).
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let is_json = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("json"))
            .unwrap_or(false);
        let text = resp.text().await?;
        Ok(ApiResponse {
            status,
            body: decode_body(text, is_json),
        })
    }
}

fn decode_body(text: String, is_json: bool) -> ResponseBody {
    if text.trim().is_empty() {
        return ResponseBody::Empty;
    }
    if is_json {
        if let Ok(v) = serde_json::from_str(&text) {
            return ResponseBody::Json(v);
        }
    }
    ResponseBody::Text(text)
}

#[cfg(test)]
pub(crate) mod scripted {
    //! In-memory transport for tests: records requests, replays canned replies.

    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    #[derive(Clone, Debug)]
    pub enum Reply {
        Response(ApiResponse),
        Network,
    }

    impl Reply {
        pub fn json(status: u16, body: Value) -> Self {
            Reply::Response(ApiResponse {
                status,
                body: ResponseBody::Json(body),
            })
        }

        pub fn text(status: u16, body: &str) -> Self {
            Reply::Response(ApiResponse {
                status,
                body: ResponseBody::Text(body.to_string()),
            })
        }

        pub fn empty(status: u16) -> Self {
            Reply::Response(ApiResponse {
                status,
                body: ResponseBody::Empty,
            })
        }
    }

    /// Replies are queued per (method, path); the last queued reply repeats.
    #[derive(Default)]
    pub struct ScriptedTransport {
        replies: Mutex<HashMap<(Method, String), VecDeque<Reply>>>,
        sent: Mutex<Vec<ApiRequest>>,
        latency: Mutex<Duration>,
    }

    impl ScriptedTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn on(&self, method: Method, path: &str, reply: Reply) -> &Self {
            self.replies
                .lock()
                .unwrap()
                .entry((method, path.to_string()))
                .or_default()
                .push_back(reply);
            self
        }

        pub fn set_latency(&self, latency: Duration) {
            *self.latency.lock().unwrap() = latency;
        }

        pub fn sent(&self) -> Vec<ApiRequest> {
            self.sent.lock().unwrap().clone()
        }

        pub fn sent_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
            self.sent()
                .into_iter()
                .filter(|r| r.method == method && r.path == path)
                .collect()
        }

        pub fn reset_sent(&self) {
            self.sent.lock().unwrap().clear();
        }

        fn next_reply(&self, method: Method, path: &str) -> Reply {
            let mut replies = self.replies.lock().unwrap();
            match replies.get_mut(&(method, path.to_string())) {
                Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
                Some(queue) if !queue.is_empty() => queue[0].clone(),
                _ => Reply::empty(404),
            }
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
            let reply = self.next_reply(request.method, &request.path);
            self.sent.lock().unwrap().push(request);
            let latency = *self.latency.lock().unwrap();
            if latency.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(latency).await;
            }
            match reply {
                Reply::Response(r) => Ok(r),
                Reply::Network => Err(TransportError("connection refused".into())),
            }
        }
    }
}
