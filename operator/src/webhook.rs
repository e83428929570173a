/*
Copyright 2025 The keip Authors.

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{post, MethodRouter};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error};

use crate::Context;

/// How a sync function can fail.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A field the function requires was absent from the request body.
    #[error("missing field from request: {0}")]
    MissingField(&'static str),
    /// Anything else. The detail is logged but never surfaces to the caller.
    #[error("{0}")]
    Other(String),
}

/// Computes a desired-state response from an observed-state request body.
///
/// Functions of this shape are pure: they never touch the cluster, they only
/// describe what should exist for the parent object they are shown.
pub trait SyncFn: Fn(&Value) -> Result<Value, SyncError> {}

impl<F> SyncFn for F where F: Fn(&Value) -> Result<Value, SyncError> {}

// Builds a POST route that serves the given sync function through the
// shared request plumbing.
pub fn webhook_route<F>(sync_fn: F) -> MethodRouter<Context>
where
    F: SyncFn + Clone + Send + Sync + 'static,
{
    post(move |body: Bytes| {
        let sync_fn = sync_fn.clone();
        async move { handle_sync(sync_fn, body).await }
    })
}

// Decodes the request body, hands it to the sync function and maps failures
// onto uniform responses: an undecodable body or a missing field answer 400
// with the detail, anything else answers 500 without leaking it.
pub async fn handle_sync<F: SyncFn>(sync_fn: F, body: Bytes) -> Response {
    let request: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(parse_error) => {
            let message = format!("Failed to parse request body: {parse_error}");
            debug!("rejecting sync request: {message}");
            return error_response(StatusCode::BAD_REQUEST, &message);
        }
    };

    debug!("sync request: {}", summarize_request(&request));

    match sync_fn(&request) {
        Ok(response) => Json(response).into_response(),
        Err(SyncError::MissingField(field)) => error_response(
            StatusCode::BAD_REQUEST,
            &format!("Missing field from request: {field}"),
        ),
        Err(SyncError::Other(detail)) => {
            error!("unexpected error while processing sync request: {detail}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"error": message}))).into_response()
}

// Short description of a sync request for the logs, without any of the
// payload contents.
fn summarize_request(request: &Value) -> String {
    let metadata = &request["parent"]["metadata"];
    let generation = metadata["generation"]
        .as_i64()
        .map_or_else(|| "<none>".to_string(), |generation| generation.to_string());
    format!(
        "name={}, namespace={}, generation={}",
        metadata["name"].as_str().unwrap_or("<none>"),
        metadata["namespace"].as_str().unwrap_or("<none>"),
        generation,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn echo(request: &Value) -> Result<Value, SyncError> {
        Ok(json!({"status": {}, "children": [], "seen": request["parent"]["metadata"]["name"]}))
    }

    #[tokio::test]
    async fn undecodable_body_answers_400() {
        let response = handle_sync(echo, Bytes::from_static(b"{not json")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with("Failed to parse request body:"), "{message}");
    }

    #[tokio::test]
    async fn empty_body_answers_400() {
        let response = handle_sync(echo, Bytes::new()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_field_answers_400_with_the_field() {
        let sync_fn =
            |_: &Value| -> Result<Value, SyncError> { Err(SyncError::MissingField("parent.spec.foo")) };
        let response = handle_sync(sync_fn, Bytes::from_static(b"{}")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Missing field from request: parent.spec.foo");
    }

    #[tokio::test]
    async fn other_failures_answer_500_without_detail() {
        let sync_fn = |_: &Value| -> Result<Value, SyncError> {
            Err(SyncError::Other("database exploded at 10.0.0.3".to_string()))
        };
        let response = handle_sync(sync_fn, Bytes::from_static(b"{}")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn successful_sync_passes_the_result_through() {
        let request = json!({"parent": {"metadata": {"name": "my-route"}}});
        let response = handle_sync(echo, Bytes::from(serde_json::to_vec(&request).unwrap())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["seen"], "my-route");
    }

    #[test]
    fn request_summary_reads_parent_metadata() {
        let request = json!({
            "parent": {"metadata": {"name": "my-route", "namespace": "default", "generation": 3}}
        });
        assert_eq!(
            summarize_request(&request),
            "name=my-route, namespace=default, generation=3"
        );
        assert_eq!(
            summarize_request(&json!({})),
            "name=<none>, namespace=<none>, generation=<none>"
        );
    }
}
