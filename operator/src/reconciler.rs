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

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{Api, ListParams, Patch, PatchParams, PostParams};
use kube::core::ObjectMeta;
use kube::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::consts::{CONFIGMAP_SUFFIX, CREATED_BY_LABEL, CREATED_BY_VALUE, ROUTE_XML_KEY};
use crate::crd::{IntegrationRoute, IntegrationRouteSpec};
use crate::gateway::ClusterGateway;
use crate::{Error, Result, RouteSpec};

/// What happened to one cluster resource during reconciliation.
///
/// `Deleted` and `Recreated` are part of the outcome vocabulary consumers
/// already understand; the current update policy patches resources in place
/// and only ever emits `Created` and `Updated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileStatus {
    Created,
    Updated,
    Deleted,
    Recreated,
}

/// One reconciled cluster resource and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    pub name: String,
    pub status: ReconcileStatus,
}

// Derives the ConfigMap name for a route. The mapping is fixed so repeated
// deployments of the same route land on the same object.
pub fn config_artifact_name(route_name: &str) -> String {
    format!("{route_name}{CONFIGMAP_SUFFIX}")
}

fn provenance_labels() -> BTreeMap<String, String> {
    BTreeMap::from([(CREATED_BY_LABEL.to_string(), CREATED_BY_VALUE.to_string())])
}

// The full desired ConfigMap for a route, ready to create or replace.
fn route_configmap(route: &RouteSpec, name: &str) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(route.namespace.clone()),
            labels: Some(provenance_labels()),
            ..Default::default()
        },
        data: Some(BTreeMap::from([(
            ROUTE_XML_KEY.to_string(),
            route.xml.clone(),
        )])),
        ..Default::default()
    }
}

fn desired_route(route: &RouteSpec, config_artifact: &str) -> IntegrationRoute {
    let mut object = IntegrationRoute::new(
        &route.name,
        IntegrationRouteSpec {
            route_config_map: config_artifact.to_string(),
        },
    );
    object.metadata.labels = Some(provenance_labels());
    object
}

// Refuses to hand out a client unless the cluster answers a read-only probe.
// Every mutating operation goes through this guard.
async fn reachable_client(gateway: &ClusterGateway) -> Result<Client> {
    if !gateway.is_reachable().await {
        return Err(Error::ClusterUnreachable);
    }
    match gateway.ensure_connected().await {
        Some(client) => Ok(client.clone()),
        None => Err(Error::ClusterUnreachable),
    }
}

// Creates the route's ConfigMap, or replaces it in full if an object with
// the derived name already exists in the namespace.
pub async fn reconcile_config_artifact(
    gateway: &ClusterGateway,
    route: &RouteSpec,
) -> Result<ReconcileOutcome> {
    let client = reachable_client(gateway).await?;

    let name = config_artifact_name(&route.name);
    let api: Api<ConfigMap> = Api::namespaced(client, &route.namespace);

    let existing = api
        .list(&ListParams::default().fields(&format!("metadata.name={name}")))
        .await
        .map_err(Error::ClusterApi)?;

    let desired = route_configmap(route, &name);
    let status = if existing.items.is_empty() {
        info!("route ConfigMap '{name}' does not exist and will be created");
        api.create(&PostParams::default(), &desired)
            .await
            .map_err(Error::ClusterApi)?;
        ReconcileStatus::Created
    } else {
        info!("route ConfigMap '{name}' already exists and will be updated");
        api.replace(&name, &PostParams::default(), &desired)
            .await
            .map_err(Error::ClusterApi)?;
        ReconcileStatus::Updated
    };

    Ok(ReconcileOutcome { name, status })
}

// Creates the IntegrationRoute, or patches its ConfigMap reference if the
// object already exists. Existing objects are never deleted or recreated, so
// fields owned by other controllers survive a redeployment.
pub async fn reconcile_route_object(
    gateway: &ClusterGateway,
    route: &RouteSpec,
    config_artifact: &str,
) -> Result<ReconcileOutcome> {
    let client = reachable_client(gateway).await?;

    let api: Api<IntegrationRoute> = Api::namespaced(client, &route.namespace);

    let existing = api
        .list(&ListParams::default().fields(&format!("metadata.name={}", route.name)))
        .await
        .map_err(Error::ClusterApi)?;

    let status = if existing.items.is_empty() {
        info!("IntegrationRoute '{}' does not exist and will be created", route.name);
        api.create(&PostParams::default(), &desired_route(route, config_artifact))
            .await
            .map_err(Error::ClusterApi)?;
        ReconcileStatus::Created
    } else {
        info!("IntegrationRoute '{}' already exists and will be patched", route.name);
        let patch = json!({"spec": {"routeConfigMap": config_artifact}});
        api.patch(&route.name, &PatchParams::default(), &Patch::Merge(patch))
            .await
            .map_err(Error::ClusterApi)?;
        ReconcileStatus::Updated
    };

    Ok(ReconcileOutcome {
        name: route.name.clone(),
        status,
    })
}

// Reconciles both resources for one route: the ConfigMap first, then the
// IntegrationRoute pointing at it. A ConfigMap failure stops the route
// object from being touched at all.
pub async fn reconcile_route(
    gateway: &ClusterGateway,
    route: &RouteSpec,
) -> Result<(ReconcileOutcome, ReconcileOutcome)> {
    let artifact = reconcile_config_artifact(gateway, route).await?;
    let object = reconcile_route_object(gateway, route, &artifact.name).await?;
    Ok((artifact, object))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> RouteSpec {
        RouteSpec {
            name: "my-route".to_string(),
            namespace: "default".to_string(),
            xml: "<route/>".to_string(),
        }
    }

    #[test]
    fn config_artifact_names_are_deterministic() {
        assert_eq!(config_artifact_name("my-route"), "my-route-cm");
        assert_eq!(config_artifact_name("my-route"), config_artifact_name("my-route"));
    }

    #[test]
    fn statuses_serialize_lowercase() {
        let outcome = ReconcileOutcome {
            name: "my-route".to_string(),
            status: ReconcileStatus::Created,
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value, serde_json::json!({"name": "my-route", "status": "created"}));

        for (status, expected) in [
            (ReconcileStatus::Created, "created"),
            (ReconcileStatus::Updated, "updated"),
            (ReconcileStatus::Deleted, "deleted"),
            (ReconcileStatus::Recreated, "recreated"),
        ] {
            assert_eq!(serde_json::to_value(status).unwrap(), expected);
        }
    }

    #[test]
    fn configmap_holds_xml_under_fixed_key() {
        let cm = route_configmap(&spec(), "my-route-cm");
        assert_eq!(cm.metadata.name.as_deref(), Some("my-route-cm"));
        assert_eq!(cm.metadata.namespace.as_deref(), Some("default"));
        assert_eq!(
            cm.data.as_ref().and_then(|d| d.get("integrationRoute.xml")),
            Some(&"<route/>".to_string())
        );
        assert_eq!(
            cm.metadata
                .labels
                .as_ref()
                .and_then(|l| l.get("app.kubernetes.io/created-by")),
            Some(&"keip".to_string())
        );
    }

    #[test]
    fn route_object_references_its_configmap() {
        let object = desired_route(&spec(), "my-route-cm");
        assert_eq!(object.metadata.name.as_deref(), Some("my-route"));
        assert_eq!(object.spec.route_config_map, "my-route-cm");
        assert_eq!(
            object
                .metadata
                .labels
                .as_ref()
                .and_then(|l| l.get("app.kubernetes.io/created-by")),
            Some(&"keip".to_string())
        );
    }
}
