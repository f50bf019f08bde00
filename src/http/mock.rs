//! Scripted transport for tests.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Mutex;
use std::time::Duration;

use super::{HttpResponse, HttpTransport};
use crate::error::TransportError;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub query: BTreeMap<String, String>,
    pub timeout: Duration,
}

impl RecordedRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(|s| s.as_str())
    }
}

pub struct MockReply {
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl MockReply {
    pub fn json(value: serde_json::Value) -> Self {
        Self {
            content_type: Some("application/json; charset=utf-8".to_string()),
            body: value.to_string().into_bytes(),
        }
    }

    pub fn bytes(content_type: &str, body: Vec<u8>) -> Self {
        Self {
            content_type: Some(content_type.to_string()),
            body,
        }
    }
}

type Responder = dyn Fn(&RecordedRequest) -> Result<MockReply, TransportError> + Send + Sync;

pub struct MockTransport {
    responder: Box<Responder>,
    log: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&RecordedRequest) -> Result<MockReply, TransportError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Every request fails as if the host were down.
    pub fn unreachable() -> Self {
        Self::new(|_| Err(TransportError::Network("connection refused".to_string())))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.lock().unwrap().clone()
    }

    /// Requests that carried a `titles` parameter, as `(url, title)`.
    pub fn searches(&self) -> Vec<(String, String)> {
        self.requests()
            .into_iter()
            .filter_map(|r| r.param("titles").map(|t| (r.url.clone(), t.to_string())))
            .collect()
    }

    /// Requests without query parameters, i.e. downloads.
    pub fn downloads(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|r| r.query.is_empty())
            .map(|r| r.url)
            .collect()
    }
}

impl HttpTransport for MockTransport {
    fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let request = RecordedRequest {
            url: url.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            timeout,
        };
        self.log.lock().unwrap().push(request.clone());

        let reply = (self.responder)(&request)?;
        Ok(HttpResponse {
            status: 200,
            content_type: reply.content_type,
            body: Box::new(Cursor::new(reply.body)),
        })
    }
}

/// Search API payload for a page with a thumbnail.
pub fn page_with_thumbnail(source: &str) -> serde_json::Value {
    serde_json::json!({
        "batchcomplete": "",
        "query": {
            "pages": {
                "4242": {
                    "pageid": 4242,
                    "ns": 0,
                    "title": "Example",
                    "thumbnail": { "source": source, "width": 500, "height": 640 },
                    "pageimage": "Example.jpg"
                }
            }
        }
    })
}

/// Search API payload for a title that does not exist.
pub fn missing_page() -> serde_json::Value {
    serde_json::json!({
        "batchcomplete": "",
        "query": {
            "pages": {
                "-1": { "ns": 0, "title": "Nobody", "missing": "" }
            }
        }
    })
}
