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

use axum::extract::State;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::{parse_origins, Settings};
use crate::pipeline::deploy_routes;
use crate::sync::{certificate_sync, integration_route_sync};
use crate::webhook::webhook_route;
use crate::Context;

// Assembles the HTTP application: the deployment endpoint, the health
// endpoints and the sync webhooks, with request tracing and optional CORS.
pub fn build_app(ctx: Context, settings: &Settings) -> Router {
    let image = settings.integration_image.clone();
    let webhooks: Router<Context> = Router::new()
        .route(
            "/sync",
            webhook_route(move |request: &Value| integration_route_sync(&image, request)),
        )
        .route("/addons/certmanager/sync", webhook_route(certificate_sync));

    let mut app = Router::new()
        .route("/route", put(deploy_routes))
        .route("/status", get(status))
        .route("/cluster-health", get(cluster_health))
        .nest("/webhook", webhooks)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    if !settings.cors_allowed_origins.is_empty() {
        if let Some(cors) = cors_layer(&settings.cors_allowed_origins) {
            app = app.layer(cors);
        }
    }

    app
}

// GET /status
//
// Process liveness only; answers whether the server itself is up.
async fn status() -> Json<Value> {
    Json(json!({"status": "UP"}))
}

// GET /cluster-health
//
// Probes the cluster through the gateway. DOWN covers both a client that
// never configured and a cluster that stopped answering.
async fn cluster_health(State(ctx): State<Context>) -> Json<Value> {
    let status = if ctx.gateway.is_reachable().await {
        "UP"
    } else {
        "DOWN"
    };
    Json(json!({"status": status}))
}

// Builds the CORS layer from the configured origin list, or disables CORS
// with a warning when the list yields nothing usable.
fn cors_layer(raw_origins: &str) -> Option<CorsLayer> {
    let origins = parse_origins(raw_origins);
    if origins.is_empty() {
        warn!("failed to parse 'CORS_ALLOWED_ORIGINS' env var, CORS headers are disabled");
        return None;
    }

    let mut allowed = Vec::with_capacity(origins.len());
    for origin in &origins {
        match origin.parse::<HeaderValue>() {
            Ok(value) => allowed.push(value),
            Err(_) => {
                warn!("invalid origin '{origin}' in 'CORS_ALLOWED_ORIGINS', CORS headers are disabled");
                return None;
            }
        }
    }

    info!("CORS enabled for origins: {origins:?}");
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods([Method::GET, Method::PUT]),
    )
}
