//! Best-effort request/response logging into the `logs` table.
//!
//! Entries go through a bounded channel to a background writer, so a slow or
//! failing log store never delays or alters the response.

use axum::{
    body::{Body, Bytes, HttpBody},
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::{sync::mpsc, task::JoinHandle};

use std::sync::Arc;

use crate::{error::ApiError, models::LogEntry, repository::Store};

/// Largest body the logger buffers. Requests above it are refused; responses
/// above it, or of unknown length, are streamed through unlogged.
pub const MAX_BUFFERED_BODY: usize = 2 * 1024 * 1024;

/// Stored payloads and response bodies are cut to this many bytes.
pub const MAX_LOGGED_BODY: usize = 64 * 1024;

#[derive(Clone)]
pub struct RequestLog {
    tx: mpsc::Sender<LogEntry>,
}

impl RequestLog {
    /// Starts the writer task. It ends once every `RequestLog` clone is dropped.
    pub fn spawn(store: Arc<dyn Store>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<LogEntry>(capacity.max(1));

        let writer = tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                if let Err(e) = store.insert_log(entry).await {
                    tracing::warn!("failed to write request log: {}", e);
                }
            }
        });

        (Self { tx }, writer)
    }

    fn record(&self, entry: LogEntry) {
        if let Err(e) = self.tx.try_send(entry) {
            tracing::warn!("request log entry dropped: {}", e);
        }
    }
}

pub async fn log_requests(
    State(log): State<RequestLog>,
    request: Request,
    next: Next,
) -> Response {
    let mut entry = LogEntry {
        datetime: Utc::now(),
        method: request.method().to_string(),
        endpoint: request.uri().path().to_string(),
        request_headers: headers_to_json(request.headers()),
        payload: String::new(),
        response_body: String::new(),
        status_code: 0,
    };

    let (parts, body) = request.into_parts();
    let response = match axum::body::to_bytes(body, MAX_BUFFERED_BODY).await {
        Ok(payload) => {
            entry.payload = excerpt(&payload);
            next.run(Request::from_parts(parts, Body::from(payload)))
                .await
        }
        Err(e) => {
            tracing::warn!("request body refused: {}", e);
            ApiError::PayloadTooLarge.into_response()
        }
    };

    let response = capture_response(response, &mut entry).await;
    log.record(entry);
    response
}

/// Copies the status and, when it is small enough to buffer, the body of
/// `response` into `entry`.
async fn capture_response(response: Response, entry: &mut LogEntry) -> Response {
    let (parts, body) = response.into_parts();
    entry.status_code = i32::from(parts.status.as_u16());

    let bounded = body
        .size_hint()
        .upper()
        .and_then(|len| usize::try_from(len).ok())
        .is_some_and(|len| len <= MAX_BUFFERED_BODY);
    if !bounded {
        return Response::from_parts(parts, body);
    }

    match axum::body::to_bytes(body, MAX_BUFFERED_BODY).await {
        Ok(bytes) => {
            entry.response_body = excerpt(&bytes);
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(e) => {
            tracing::warn!("failed to read response body: {}", e);
            let failed = ApiError::Internal("Failed to read response body".to_string());
            entry.status_code = i32::from(failed.status_code().as_u16());
            entry.response_body = serde_json::json!({ "error": failed.to_string() }).to_string();
            failed.into_response()
        }
    }
}

fn excerpt(bytes: &Bytes) -> String {
    String::from_utf8_lossy(&bytes[..bytes.len().min(MAX_LOGGED_BODY)]).into_owned()
}

/// Header name to list of values. Credentials are not persisted.
fn headers_to_json(headers: &HeaderMap) -> Value {
    let mut map = Map::new();

    for name in headers.keys() {
        let values = headers
            .get_all(name)
            .iter()
            .map(|value| {
                if *name == header::AUTHORIZATION {
                    Value::from("[redacted]")
                } else {
                    Value::from(String::from_utf8_lossy(value.as_bytes()).into_owned())
                }
            })
            .collect();
        map.insert(name.as_str().to_string(), Value::Array(values));
    }

    Value::Object(map)
}
