// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory raster of a single rendered page.

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat};
use printbridge_core::error::{PrintBridgeError, Result};
use printbridge_core::types::Rotation;
use tracing::{debug, info, instrument};

/// One rendered page, owned by whoever rendered it until it is drawn.
///
/// Transformations consume `self` and return the transformed bitmap, so a
/// page is never aliased while it is being rotated or printed.
#[derive(Debug, Clone)]
pub struct PageBitmap {
    /// Zero-based page index within the source document.
    page: usize,
    image: DynamicImage,
}

impl PageBitmap {
    // -- Construction ---------------------------------------------------------

    /// Decode an image file as page 0.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let img = image::open(path.as_ref()).map_err(|err| {
            PrintBridgeError::LoadError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self::from_dynamic(0, img))
    }

    /// Decode encoded image bytes (PNG, JPEG, ...) as the given page.
    pub fn from_bytes(page: usize, data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data).map_err(|err| PrintBridgeError::RenderFailure {
            page,
            message: format!("failed to decode rendered page: {err}"),
        })?;
        debug!(page, width = img.width(), height = img.height(), "Page decoded");
        Ok(Self::from_dynamic(page, img))
    }

    pub fn from_dynamic(page: usize, image: DynamicImage) -> Self {
        Self { page, image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Wider than tall.
    pub fn is_landscape(&self) -> bool {
        self.image.width() > self.image.height()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Rotate clockwise by a quarter-turn amount. Lossless.
    pub fn rotate(self, rotation: Rotation) -> Self {
        let image = match rotation {
            Rotation::None => return self,
            Rotation::Clockwise90 => self.image.rotate90(),
            Rotation::Clockwise180 => self.image.rotate180(),
            Rotation::Clockwise270 => self.image.rotate270(),
        };
        debug!(page = self.page, degrees = rotation.degrees(), "Page rotated");
        Self {
            page: self.page,
            image,
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the page as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|err| PrintBridgeError::RenderFailure {
                page: self.page,
                message: format!("PNG encoding failed: {err}"),
            })?;
        Ok(buffer)
    }
}
