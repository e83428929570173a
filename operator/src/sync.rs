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

use serde_json::{json, Value};

use crate::consts::{CREATED_BY_LABEL, CREATED_BY_VALUE, ROUTE_XML_KEY};
use crate::webhook::SyncError;

// Where route workloads find their mounted XML definition.
const ROUTE_MOUNT_PATH: &str = "/var/spring/xml";

fn require<'a>(request: &'a Value, pointer: &str, field: &'static str) -> Result<&'a Value, SyncError> {
    match request.pointer(pointer) {
        Some(value) if !value.is_null() => Ok(value),
        _ => Err(SyncError::MissingField(field)),
    }
}

fn require_str<'a>(
    request: &'a Value,
    pointer: &str,
    field: &'static str,
) -> Result<&'a str, SyncError> {
    require(request, pointer, field)?
        .as_str()
        .ok_or(SyncError::MissingField(field))
}

// Computes the desired children for an IntegrationRoute parent: a single
// Deployment running the integration container with the route's ConfigMap
// mounted. The status echoes the parent generation that was acted on.
pub fn integration_route_sync(image: &str, request: &Value) -> Result<Value, SyncError> {
    let name = require_str(request, "/parent/metadata/name", "parent.metadata.name")?;
    let config_map = require_str(
        request,
        "/parent/spec/routeConfigMap",
        "parent.spec.routeConfigMap",
    )?;
    let generation = request
        .pointer("/parent/metadata/generation")
        .and_then(Value::as_i64)
        .unwrap_or(0);

    let deployment = json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {
            "name": name,
            "labels": {
                "app": name,
                (CREATED_BY_LABEL): CREATED_BY_VALUE,
            },
        },
        "spec": {
            "replicas": 1,
            "selector": {"matchLabels": {"app": name}},
            "template": {
                "metadata": {
                    "labels": {
                        "app": name,
                        (CREATED_BY_LABEL): CREATED_BY_VALUE,
                    },
                },
                "spec": {
                    "containers": [{
                        "name": "integration",
                        "image": image,
                        "volumeMounts": [{
                            "name": "route-config",
                            "mountPath": ROUTE_MOUNT_PATH,
                            "readOnly": true,
                        }],
                    }],
                    "volumes": [{
                        "name": "route-config",
                        "configMap": {
                            "name": config_map,
                            "items": [{"key": ROUTE_XML_KEY, "path": ROUTE_XML_KEY}],
                        },
                    }],
                },
            },
        },
    });

    Ok(json!({
        "status": {"observedGeneration": generation},
        "children": [deployment],
    }))
}

// Computes the desired cert-manager Certificate child for a parent that
// declares DNS names and an issuer.
pub fn certificate_sync(request: &Value) -> Result<Value, SyncError> {
    let name = require_str(request, "/parent/metadata/name", "parent.metadata.name")?;
    let dns_names = require(request, "/parent/spec/dnsNames", "parent.spec.dnsNames")?;
    let issuer = require_str(
        request,
        "/parent/spec/issuerRef/name",
        "parent.spec.issuerRef.name",
    )?;

    let certificate = json!({
        "apiVersion": "cert-manager.io/v1",
        "kind": "Certificate",
        "metadata": {
            "name": format!("{name}-cert"),
            "labels": {(CREATED_BY_LABEL): CREATED_BY_VALUE},
        },
        "spec": {
            "secretName": format!("{name}-tls"),
            "dnsNames": dns_names,
            "issuerRef": {"name": issuer, "kind": "Issuer"},
        },
    });

    Ok(json!({"status": {}, "children": [certificate]}))
}
