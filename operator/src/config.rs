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

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::consts::{DEFAULT_INTEGRATION_IMAGE, DEFAULT_LISTEN_ADDR};
use crate::{Error, Result};

// Runtime settings, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Verbose logging. Not suitable for production.
    pub debug: bool,
    /// Raw comma-separated origin list from CORS_ALLOWED_ORIGINS. Empty
    /// disables CORS entirely.
    pub cors_allowed_origins: String,
    /// Container image handed to route workloads by the sync webhook.
    pub integration_image: String,
    /// Address the HTTP server binds to.
    pub listen_addr: SocketAddr,
    /// Explicit kubeconfig path. Unset means in-cluster configuration.
    pub kubeconfig: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let listen_addr = match env::var("LISTEN_ADDR") {
            Ok(raw) => raw.parse().map_err(|_| {
                Error::InvalidConfig(format!("LISTEN_ADDR `{raw}` is not a socket address"))
            })?,
            Err(_) => DEFAULT_LISTEN_ADDR,
        };

        Ok(Self {
            debug: env_flag(&env::var("DEBUG").unwrap_or_default()),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default(),
            integration_image: env::var("INTEGRATION_IMAGE")
                .unwrap_or_else(|_| DEFAULT_INTEGRATION_IMAGE.to_string()),
            listen_addr,
            kubeconfig: env::var_os("KUBECONFIG")
                .filter(|raw| !raw.is_empty())
                .map(PathBuf::from),
        })
    }
}

// Interprets a boolean environment flag. Unset or unrecognized means false.
fn env_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// Splits a comma-separated origin list, trimming entries and dropping empty
// ones. A result with no entries means CORS stays disabled.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
