// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print dispatcher: chooses how a job reaches the printer and drives it.
//
// PDFs without rotation go to the device as-is so vector content and
// multi-page handling stay with the printing subsystem. Images, and PDFs that
// must be rotated, are rasterised page by page, rotated, fitted to the
// printable area and submitted as composed pages.

use std::path::Path;
use std::sync::Arc;

use printbridge_core::config::SettingsProvider;
use printbridge_core::error::{PrintBridgeError, Result};
use printbridge_core::types::{FileKind, JobId, Orientation, PrintJob};
use printbridge_document::DocumentBackend;
use serde::Serialize;
use tracing::{debug, error, info, instrument};

use crate::compositor;
use crate::pages::PageSequence;
use crate::target::{JobOptions, PrintTarget};

/// Resolution pages are rasterised at for printing.
pub const RASTER_DPI: u32 = 300;

/// Resolution pages are rasterised at for on-screen preview.
pub const PREVIEW_DPI: u32 = 96;

/// How a job is sent to the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Whole document handed to the device's native print path.
    Direct,
    /// Pages rasterised, rotated and composed individually.
    Raster,
}

/// What a successful dispatch did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub job_id: JobId,
    pub strategy: Strategy,
    /// Pages composed and submitted; `None` for the direct path, where the
    /// device counts pages itself.
    pub pages: Option<usize>,
}

/// Pick the strategy for `job`.
///
/// Rotation is compared after reduction modulo 360, so 360 and 720 print
/// directly like 0.
pub fn select_strategy(job: &PrintJob) -> Strategy {
    match job.file_kind() {
        FileKind::Image => Strategy::Raster,
        FileKind::Pdf if job.rotation_degrees().rem_euclid(360) == 0 => Strategy::Direct,
        FileKind::Pdf => Strategy::Raster,
    }
}

/// Routes print jobs and renders previews.
///
/// Holds no per-request state: concurrent dispatches are ordered by the OS
/// spooler, not here.
pub struct PrintDispatcher {
    backend: Arc<dyn DocumentBackend>,
    target: Arc<dyn PrintTarget>,
    settings: Arc<dyn SettingsProvider>,
}

impl PrintDispatcher {
    pub fn new(
        backend: Arc<dyn DocumentBackend>,
        target: Arc<dyn PrintTarget>,
        settings: Arc<dyn SettingsProvider>,
    ) -> Self {
        Self {
            backend,
            target,
            settings,
        }
    }

    // -- Printing -------------------------------------------------------------

    /// Print `job`. Blocks until the job has been handed to the spooler.
    ///
    /// Failures are logged with the job identity and returned unchanged.
    pub fn dispatch(&self, job: PrintJob) -> Result<DispatchReport> {
        let job_id = job.id();
        match self.run_job(&job) {
            Ok(report) => {
                info!(
                    job_id = %job_id,
                    strategy = ?report.strategy,
                    pages = ?report.pages,
                    "print job dispatched"
                );
                Ok(report)
            }
            Err(e) => {
                error!(
                    job_id = %job_id,
                    path = %job.source_path().display(),
                    error = %e,
                    "print job failed"
                );
                Err(e)
            }
        }
    }

    fn run_job(&self, job: &PrintJob) -> Result<DispatchReport> {
        if !self.target.is_available() {
            return Err(PrintBridgeError::PlatformUnsupported(
                "no native printing subsystem on this host".into(),
            ));
        }

        let settings = self.settings.get_settings();
        let options = JobOptions {
            job_id: job.id(),
            printer: settings.printer().map(str::to_string),
            copies: job.copies(),
            title: job
                .source_path()
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| job.id().to_string()),
        };

        let strategy = select_strategy(job);
        debug!(job_id = %job.id(), ?strategy, printer = ?options.printer, "strategy selected");

        let pages = match strategy {
            Strategy::Direct => {
                self.target.print_document(job.source_path(), &options)?;
                None
            }
            Strategy::Raster => Some(self.print_raster(job, &options)?),
        };

        Ok(DispatchReport {
            job_id: job.id(),
            strategy,
            pages,
        })
    }

    /// Rasterise, rotate, fit and submit every page. The first failure
    /// abandons the whole job.
    fn print_raster(&self, job: &PrintJob, options: &JobOptions) -> Result<usize> {
        let document = self.backend.open(job.source_path(), job.file_kind())?;
        let pages = PageSequence::new(document, RASTER_DPI);
        let rotation = job.rotation();
        let mut sink = self.target.start_job(options)?;

        for page in pages {
            let bitmap = page?.rotate(rotation);

            // Only loose images pick their sheet orientation; PDF pages keep
            // the default.
            let orientation = match job.file_kind() {
                FileKind::Image => compositor::orientation_for(&bitmap),
                FileKind::Pdf => Orientation::Portrait,
            };
            let area = sink.printable_area(orientation);
            let placement = compositor::fit(&bitmap, &area);
            debug!(
                job_id = %job.id(),
                page = bitmap.page(),
                ?orientation,
                ?placement,
                "page fitted"
            );
            sink.submit_page(bitmap, placement, &area)?;
        }

        sink.finish()
    }

    // -- Preview --------------------------------------------------------------

    /// Render one PDF page at screen resolution and return it as PNG bytes.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub fn render_preview(&self, path: &Path, page_index: usize) -> Result<Vec<u8>> {
        if !path.is_file() {
            return Err(PrintBridgeError::NotFound(path.display().to_string()));
        }
        match FileKind::from_path(path) {
            Ok(FileKind::Pdf) => {}
            _ => {
                return Err(PrintBridgeError::InvalidOperation(
                    "only PDF documents can be rendered for preview".into(),
                ));
            }
        }

        let mut document = self.backend.open(path, FileKind::Pdf)?;
        let page_count = document.page_count();
        if page_index >= page_count {
            return Err(PrintBridgeError::InvalidOperation(format!(
                "page {page_index} does not exist (document has {page_count} pages)"
            )));
        }

        document
            .render_page(page_index, PREVIEW_DPI, PREVIEW_DPI)?
            .to_png_bytes()
    }
}
