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

use operator::*;

use std::sync::Arc;

use tracing::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run().await
}

pub async fn run() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    let level = if settings.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = tracing_subscriber::fmt().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if settings.debug {
        warn!("Running server with debug mode. NOT SUITABLE FOR PRODUCTION!");
    }

    let gateway = Arc::new(ClusterGateway::new(settings.kubeconfig.clone()));
    // a cluster that is down at startup is logged and reported through the
    // health endpoint, not treated as a startup failure
    if gateway.ensure_connected().await.is_some() {
        info!("cluster connection configured");
    }

    let app = build_app(Context { gateway }, &settings);

    let listener = tokio::net::TcpListener::bind(settings.listen_addr).await?;
    info!("listening on {}", settings.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!("failed to listen for the shutdown signal: {error}");
        return;
    }
    info!("shutdown signal received, draining connections");
}
