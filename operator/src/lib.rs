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

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

pub use app::build_app;
pub use config::Settings;
pub use gateway::ClusterGateway;

pub mod app;
pub mod config;
pub mod consts;
pub mod crd;
pub mod gateway;
pub mod pipeline;
pub mod reconciler;
pub mod sync;
pub mod validation;
pub mod webhook;

use validation::RouteViolation;

// Shared state handed to the HTTP handlers.
#[derive(Clone)]
pub struct Context {
    /// Cluster connection, configured lazily and shared by every handler.
    pub gateway: Arc<ClusterGateway>,
}

/// A single route definition submitted for deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteSpec {
    pub name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    pub xml: String,
}

fn default_namespace() -> String {
    consts::DEFAULT_NAMESPACE.to_string()
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("kubernetes API error: {0}")]
    ClusterApi(#[source] kube::Error),
    #[error("Kubernetes cluster not reachable. Verify the cluster is running")]
    ClusterUnreachable,
    #[error("validation failed")]
    Validation(Vec<RouteViolation>),
    #[error("malformed request: `{0}`")]
    MalformedRequest(String),
    #[error("reconciliation failed: `{0}`")]
    Reconciliation(String),
    #[error("invalid configuration: `{0}`")]
    InvalidConfig(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// What callers of the HTTP surface see. Validation problems come back in
// full, malformed requests echo the parse failure, and everything else
// collapses into a generic 500 whose detail stays in the logs.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation(violations) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "status": "error",
                    "message": "Validation failed",
                    "errors": violations,
                })),
            )
                .into_response(),
            Error::MalformedRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({"status": "error", "message": message})),
            )
                .into_response(),
            Error::ClusterApi(_)
            | Error::ClusterUnreachable
            | Error::Reconciliation(_)
            | Error::InvalidConfig(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"status": "error", "message": "Internal server error"})),
            )
                .into_response(),
        }
    }
}
