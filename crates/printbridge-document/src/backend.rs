// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document rendering backend abstraction.
//
// The dispatcher only needs three capabilities from a document: open it,
// count its pages, and rasterise page N at a given resolution. Everything
// format-specific stays behind these traits.

use std::path::Path;
use std::sync::Arc;

use printbridge_core::error::Result;
use printbridge_core::exec::CommandExecutor;
use printbridge_core::types::FileKind;

use crate::bitmap::PageBitmap;
use crate::pdf::render::PdfRenderer;
use crate::raster::document::ImageDocument;

/// An opened document.
pub trait DocumentHandle: Send {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Rasterise the zero-based page `index` at the given resolution.
    fn render_page(&mut self, index: usize, dpi_x: u32, dpi_y: u32) -> Result<PageBitmap>;
}

/// Opens documents of the supported kinds.
pub trait DocumentBackend: Send + Sync {
    /// Open `path` as a document of `kind`, failing with `LoadError`.
    fn open(&self, path: &Path, kind: FileKind) -> Result<Box<dyn DocumentHandle>>;
}

/// Backend for files on local disk: PDFs through `pdftoppm`, images through
/// the `image` crate.
pub struct FileBackend {
    pdf: PdfRenderer,
}

impl FileBackend {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            pdf: PdfRenderer::new(executor),
        }
    }
}

impl DocumentBackend for FileBackend {
    fn open(&self, path: &Path, kind: FileKind) -> Result<Box<dyn DocumentHandle>> {
        match kind {
            FileKind::Pdf => Ok(Box::new(self.pdf.open(path)?)),
            FileKind::Image => Ok(Box::new(ImageDocument::open(path)?)),
        }
    }
}
