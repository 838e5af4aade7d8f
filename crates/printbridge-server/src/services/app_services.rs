// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer: builds every backend subsystem once at startup and
// hands the HTTP handlers cheap, cloneable access to them.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use printbridge_core::config::{SettingsProvider, SettingsStore};
use printbridge_core::error::Result;
use printbridge_core::exec::{CommandExecutor, SystemExecutor};
use printbridge_document::FileBackend;
use printbridge_print::spool::{FsSpool, RecoveryPlan, SpoolMonitor, SpoolRecovery};
use printbridge_print::{CupsTarget, PrintDispatcher};
use tracing::info;

use super::document_store::DocumentStore;
use crate::config::{RUNTIME_SETTINGS_FILE, ServiceConfig};

const UPLOADS_DIR: &str = "uploads";

/// Shared services, one instance per process.
///
/// All fields are `Arc`-wrapped so the struct can be cloned into every
/// request handler.
#[derive(Clone)]
pub struct AppServices {
    pub config: Arc<ServiceConfig>,
    pub settings: Arc<dyn SettingsProvider>,
    pub documents: Arc<DocumentStore>,
    pub dispatcher: Arc<PrintDispatcher>,
    pub monitor: Arc<SpoolMonitor>,
    pub executor: Arc<dyn CommandExecutor>,
}

impl AppServices {
    /// Wire up the production services rooted at `data_dir`.
    pub fn init(data_dir: &Path, config: ServiceConfig) -> Result<Self> {
        info!(path = %data_dir.display(), "initialising services");

        let executor: Arc<dyn CommandExecutor> = Arc::new(SystemExecutor);
        let settings: Arc<dyn SettingsProvider> = Arc::new(SettingsStore::load(
            data_dir.join(RUNTIME_SETTINGS_FILE),
            config.runtime_defaults(),
        ));
        let documents = Arc::new(DocumentStore::open(data_dir.join(UPLOADS_DIR))?);

        let dispatcher = Arc::new(PrintDispatcher::new(
            Arc::new(FileBackend::new(Arc::clone(&executor))),
            Arc::new(CupsTarget::new(
                Arc::clone(&executor),
                config.paper_size,
                config.margin_mm,
            )),
            Arc::clone(&settings),
        ));

        let monitor = Arc::new(
            SpoolMonitor::new(
                Arc::clone(&settings),
                Arc::new(FsSpool::new(config.spool_dir.clone())),
                SpoolRecovery::new(Arc::clone(&executor), RecoveryPlan::for_host(&config.spool_dir)),
            )
            .with_interval(Duration::from_secs(config.poll_interval_secs)),
        );

        info!(
            spool = %config.spool_dir.display(),
            uploads = %documents.dir().display(),
            paper = ?config.paper_size,
            "services initialised"
        );

        Ok(Self {
            config: Arc::new(config),
            settings,
            documents,
            dispatcher,
            monitor,
            executor,
        })
    }

    /// Resolve an uploaded document id to its file.
    pub fn document_path(&self, id: &str) -> Result<PathBuf> {
        self.documents.find(id)
    }
}
