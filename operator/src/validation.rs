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

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::RouteSpec;

// Upper bound on route name length, matching the Kubernetes limit for
// object names.
pub const MAX_NAME_LENGTH: usize = 253;

// Route names become Kubernetes object names, so they follow the DNS
// subdomain rules: lowercase alphanumerics with interior `-` and `.`.
static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-.a-z0-9]*[a-z0-9])?$").expect("Invalid route name regex")
});

/// The rule a route definition broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    EmptyName,
    NameTooLong,
    NotLowercase,
    InvalidNamePattern,
    EmptyPayload,
}

/// A single broken rule on one field of a route definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    fn new(kind: ViolationKind, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            field,
            message: message.into(),
        }
    }
}

/// A violation tied back to its position in a deployment request.
#[derive(Debug, Serialize)]
pub struct RouteViolation {
    pub index: usize,
    pub name: String,
    #[serde(flatten)]
    pub violation: Violation,
}

// Checks a single route definition against the deployment rules. Returns
// every violation found; an empty result means the definition is deployable.
// Purely computational, never touches the cluster.
pub fn validate(route: &RouteSpec) -> Vec<Violation> {
    let mut violations = Vec::new();

    let name = route.name.as_str();
    if name.is_empty() {
        violations.push(Violation::new(
            ViolationKind::EmptyName,
            "name",
            "route name must not be empty",
        ));
    } else {
        if name.len() > MAX_NAME_LENGTH {
            violations.push(Violation::new(
                ViolationKind::NameTooLong,
                "name",
                format!("route name must not exceed {MAX_NAME_LENGTH} characters"),
            ));
        }
        if name != name.to_lowercase() {
            violations.push(Violation::new(
                ViolationKind::NotLowercase,
                "name",
                "route name must be lowercase",
            ));
        }
        if !NAME_PATTERN.is_match(name) {
            violations.push(Violation::new(
                ViolationKind::InvalidNamePattern,
                "name",
                "route name must start and end with an alphanumeric character \
                 and may only contain `-` and `.` in between",
            ));
        }
    }

    if route.xml.is_empty() {
        violations.push(Violation::new(
            ViolationKind::EmptyPayload,
            "xml",
            "route definition must not be empty",
        ));
    }

    violations
}
