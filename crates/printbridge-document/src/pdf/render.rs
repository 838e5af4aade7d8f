// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF page rasterisation through poppler's `pdftoppm`.
//
// Pages are rendered one at a time into a scratch directory and decoded back
// into a `PageBitmap`, so only one rasterised page is held in memory at once.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use printbridge_core::error::{PrintBridgeError, Result};
use printbridge_core::exec::{CommandExecutor, CommandSpec};
use tracing::{debug, instrument};

use crate::backend::DocumentHandle;
use crate::bitmap::PageBitmap;
use crate::pdf::reader::PdfReader;

/// Default rasteriser program.
const PDFTOPPM: &str = "pdftoppm";

/// Opens PDFs for page-by-page rendering.
pub struct PdfRenderer {
    executor: Arc<dyn CommandExecutor>,
    program: String,
}

impl PdfRenderer {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self::with_program(executor, PDFTOPPM)
    }

    /// Use a specific `pdftoppm` binary (e.g. a bundled copy on Windows).
    pub fn with_program(executor: Arc<dyn CommandExecutor>, program: impl Into<String>) -> Self {
        Self {
            executor,
            program: program.into(),
        }
    }

    /// Parse the PDF and prepare it for rendering.
    pub fn open(&self, path: &Path) -> Result<PdfDocument> {
        let page_count = PdfReader::open(path)?.page_count();
        Ok(PdfDocument {
            path: path.to_path_buf(),
            page_count,
            executor: Arc::clone(&self.executor),
            program: self.program.clone(),
        })
    }
}

/// An opened PDF whose pages are rasterised on demand.
pub struct PdfDocument {
    path: PathBuf,
    page_count: usize,
    executor: Arc<dyn CommandExecutor>,
    program: String,
}

impl PdfDocument {
    fn render_command(&self, index: usize, dpi_x: u32, dpi_y: u32, out_prefix: &Path) -> CommandSpec {
        // pdftoppm numbers pages from 1.
        let page = (index + 1).to_string();
        CommandSpec::new(&self.program)
            .args(["-f", page.as_str(), "-l", page.as_str()])
            .args(["-rx".to_string(), dpi_x.to_string()])
            .args(["-ry".to_string(), dpi_y.to_string()])
            .args(["-png", "-singlefile"])
            .arg(self.path.display().to_string())
            .arg(out_prefix.display().to_string())
    }
}

impl DocumentHandle for PdfDocument {
    fn page_count(&self) -> usize {
        self.page_count
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn render_page(&mut self, index: usize, dpi_x: u32, dpi_y: u32) -> Result<PageBitmap> {
        if index >= self.page_count {
            return Err(PrintBridgeError::RenderFailure {
                page: index,
                message: format!("page out of range (document has {} pages)", self.page_count),
            });
        }

        let render_err = |message: String| PrintBridgeError::RenderFailure { page: index, message };

        let scratch = tempfile::tempdir().map_err(|e| render_err(format!("scratch dir: {e}")))?;
        let prefix = scratch.path().join("page");
        let command = self.render_command(index, dpi_x, dpi_y, &prefix);

        let output = self.executor.run(&command);
        if !output.is_success() {
            return Err(render_err(format!(
                "{} exited with status {}: {}",
                self.program,
                output.exit_code,
                output.stderr.trim()
            )));
        }

        let png_path = prefix.with_extension("png");
        let bytes = std::fs::read(&png_path)
            .map_err(|e| render_err(format!("reading {}: {e}", png_path.display())))?;
        let bitmap = PageBitmap::from_bytes(index, &bytes)?;

        debug!(page = index, width = bitmap.width(), height = bitmap.height(), "PDF page rendered");
        Ok(bitmap)
    }
}
