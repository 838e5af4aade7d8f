// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PrintBridge: HTTP print service for a locally attached printer.
//
// Entry point. Initialises logging and backend services, starts the spool
// monitor, and serves the HTTP API until Ctrl-C.

mod config;
mod routes;
mod services;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Notify;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::ServiceConfig;
use services::app_services::AppServices;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "PrintBridge starting");

    if let Err(e) = serve().await {
        error!(error = %e, "PrintBridge stopped with an error");
        std::process::exit(1);
    }
}

async fn serve() -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = services::data_dir::data_dir()?;
    std::fs::create_dir_all(&data_dir)?;

    let config = ServiceConfig::load(&data_dir);
    let bind_addr = config.bind_addr.clone();
    let services = AppServices::init(&data_dir, config)?;

    let shutdown = Arc::new(Notify::new());
    let monitor = tokio::spawn(Arc::clone(&services.monitor).run(Arc::clone(&shutdown)));

    let listener = TcpListener::bind(&bind_addr).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, routes::build_router(services))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for Ctrl-C");
            }
            info!("shutdown requested");
        })
        .await?;

    shutdown.notify_one();
    if let Err(e) = monitor.await {
        error!(error = %e, "spool monitor task failed");
    }

    info!("PrintBridge stopped");
    Ok(())
}
