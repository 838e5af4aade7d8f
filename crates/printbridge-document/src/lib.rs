// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// printbridge-document: the document rendering backend.
//
// Opens PDFs and raster images, reports their page count, and rasterises a
// page to an in-memory `PageBitmap` at a requested resolution. PDF pages are
// rendered by the external `pdftoppm` program; images are decoded with the
// `image` crate.

pub mod backend;
pub mod bitmap;
pub mod raster;
pub mod pdf;

pub use backend::{DocumentBackend, DocumentHandle, FileBackend};
pub use bitmap::PageBitmap;
pub use raster::document::ImageDocument;
pub use pdf::reader::PdfReader;
pub use pdf::render::{PdfDocument, PdfRenderer};
