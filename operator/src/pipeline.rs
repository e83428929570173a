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

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::future::join_all;
use serde::Deserialize;
use tracing::{error, info};

use crate::reconciler::{self, ReconcileOutcome};
use crate::validation::{self, RouteViolation};
use crate::{Context, Error, Result, RouteSpec};

/// A batch of route definitions submitted for deployment.
#[derive(Debug, Deserialize)]
pub struct DeployRequest {
    pub routes: Vec<RouteSpec>,
}

// Checks every entry before anything is dispatched. A single violation
// anywhere rejects the whole batch, so an invalid request never results in a
// partially deployed batch or even a cluster round trip.
fn validate_batch(routes: &[RouteSpec]) -> Result<()> {
    let mut violations = Vec::new();
    for (index, route) in routes.iter().enumerate() {
        for violation in validation::validate(route) {
            violations.push(RouteViolation {
                index,
                name: route.name.clone(),
                violation,
            });
        }
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(violations))
    }
}

// Runs one reconciliation job per route, each on its own task, and joins
// them in submission order. Outcomes come back flattened, two per route:
// the ConfigMap first, then the IntegrationRoute.
//
// Any job failure fails the batch as a whole. Jobs that already finished
// keep their effects; there is no rollback.
pub async fn run_batch(ctx: &Context, routes: Vec<RouteSpec>) -> Result<Vec<ReconcileOutcome>> {
    validate_batch(&routes)?;

    let mut jobs = Vec::with_capacity(routes.len());
    for route in routes {
        let gateway = ctx.gateway.clone();
        jobs.push(tokio::spawn(async move {
            info!("creating resources for route '{}'", route.name);
            reconciler::reconcile_route(&gateway, &route).await
        }));
    }

    let mut outcomes = Vec::with_capacity(jobs.len() * 2);
    let mut failure: Option<Error> = None;
    for job in join_all(jobs).await {
        match job {
            Ok(Ok((artifact, object))) => {
                outcomes.push(artifact);
                outcomes.push(object);
            }
            Ok(Err(error)) => {
                error!("route reconciliation failed: {error}");
                failure.get_or_insert(Error::Reconciliation(error.to_string()));
            }
            Err(join_error) => {
                error!("route reconciliation task failed: {join_error}");
                failure.get_or_insert(Error::Reconciliation(join_error.to_string()));
            }
        }
    }

    match failure {
        Some(error) => Err(error),
        None => Ok(outcomes),
    }
}

// PUT /route
//
// Deploys a batch of routes and answers 201 with one entry per touched
// cluster resource, in submission order.
pub async fn deploy_routes(
    State(ctx): State<Context>,
    payload: Result<Json<DeployRequest>, JsonRejection>,
) -> Result<Response> {
    info!("received deployment request");

    let Json(request) =
        payload.map_err(|rejection| Error::MalformedRequest(rejection.body_text()))?;
    if request.routes.is_empty() {
        return Err(Error::MalformedRequest(
            "deployment request must contain at least one route".to_string(),
        ));
    }

    let outcomes = run_batch(&ctx, request.routes).await?;
    Ok((StatusCode::CREATED, Json(outcomes)).into_response())
}
