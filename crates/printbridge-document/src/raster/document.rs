// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// A raster image file viewed as a one-page document.

use std::path::{Path, PathBuf};

use printbridge_core::error::{PrintBridgeError, Result};
use tracing::instrument;

use crate::backend::DocumentHandle;
use crate::bitmap::PageBitmap;

/// Single-page document backed by a JPEG/PNG/BMP file.
///
/// The image is decoded when opened so that corrupt files fail with
/// `LoadError` before anything is sent to a printer. Images already have a
/// resolution of their own, so the requested DPI is ignored.
pub struct ImageDocument {
    path: PathBuf,
    decoded: Option<PageBitmap>,
}

impl ImageDocument {
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let decoded = PageBitmap::open(path.as_ref())?;
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            decoded: Some(decoded),
        })
    }
}

impl DocumentHandle for ImageDocument {
    fn page_count(&self) -> usize {
        1
    }

    fn render_page(&mut self, index: usize, _dpi_x: u32, _dpi_y: u32) -> Result<PageBitmap> {
        if index != 0 {
            return Err(PrintBridgeError::RenderFailure {
                page: index,
                message: "an image has only one page".into(),
            });
        }
        // Hand over the bitmap decoded at open time; decode again only if the
        // page is requested a second time.
        match self.decoded.take() {
            Some(bitmap) => Ok(bitmap),
            None => PageBitmap::open(&self.path).map_err(|e| PrintBridgeError::RenderFailure {
                page: 0,
                message: e.to_string(),
            }),
        }
    }
}
