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

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Spec of the IntegrationRoute custom resource.
///
/// Deliberately thin: the route's XML definition lives in a ConfigMap and
/// the resource only points at it. The controller backing the resource
/// resolves the reference when it materializes the route workload.
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "keip.codice.org",
    version = "v1alpha2",
    kind = "IntegrationRoute",
    plural = "integrationroutes",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationRouteSpec {
    /// Name of the ConfigMap holding the route's XML definition.
    pub route_config_map: String,
}
