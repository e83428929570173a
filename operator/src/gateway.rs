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

use std::path::{Path, PathBuf};

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tokio::sync::OnceCell;
use tracing::{debug, error};

// Handle to the cluster API. The client is built on first use, not at
// construction, so the server can come up without a running cluster and
// report it as unreachable instead of crashing.
pub struct ClusterGateway {
    kubeconfig: Option<PathBuf>,
    client: OnceCell<Option<Client>>,
}

impl ClusterGateway {
    // A gateway that configures itself from the given kubeconfig path, or
    // from the in-cluster environment when no path is given.
    pub fn new(kubeconfig: Option<PathBuf>) -> Self {
        Self {
            kubeconfig,
            client: OnceCell::new(),
        }
    }

    // A gateway over an already-configured client.
    pub fn from_client(client: Client) -> Self {
        Self {
            kubeconfig: None,
            client: OnceCell::new_with(Some(Some(client))),
        }
    }

    // Returns the shared client, attempting configuration exactly once. A
    // failed attempt is logged and remembered; every later call observes the
    // unconfigured state without retrying.
    pub async fn ensure_connected(&self) -> Option<&Client> {
        self.client
            .get_or_init(|| async {
                match build_client(self.kubeconfig.as_deref()).await {
                    Ok(client) => Some(client),
                    Err(error) => {
                        error!(
                            "failed to configure the cluster client: {error:#}; \
                             integration routes cannot be deployed"
                        );
                        None
                    }
                }
            })
            .await
            .as_ref()
    }

    // Read-only reachability probe. Never fails: an unconfigured client or
    // any API error simply reports the cluster as unreachable.
    pub async fn is_reachable(&self) -> bool {
        match self.ensure_connected().await {
            Some(client) => client.list_core_api_resources("v1").await.is_ok(),
            None => false,
        }
    }
}

async fn build_client(kubeconfig: Option<&Path>) -> anyhow::Result<Client> {
    let config = match kubeconfig {
        Some(path) => {
            debug!("loading kubeconfig from {}", path.display());
            let kubeconfig = Kubeconfig::read_from(path)?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?
        }
        None => {
            debug!("no kubeconfig given, inferring cluster configuration");
            Config::infer().await?
        }
    };
    Ok(Client::try_from(config)?)
}
