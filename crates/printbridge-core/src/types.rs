// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the print bridge.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PrintBridgeError, Result};

/// Millimetres per inch, used when converting paper sizes to device pixels.
const MM_PER_INCH: f64 = 25.4;

/// Unique identifier for a print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kinds of document the bridge knows how to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    Pdf,
    Image,
}

impl FileKind {
    /// Infer the file kind from a bare extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "jpg" | "jpeg" | "png" | "bmp" => Some(Self::Image),
            _ => None,
        }
    }

    /// Infer the file kind from a path, failing with `UnsupportedFileKind`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(ext).ok_or_else(|| {
            PrintBridgeError::UnsupportedFileKind(if ext.is_empty() {
                format!("{} has no extension", path.display())
            } else {
                format!(".{ext}")
            })
        })
    }

    /// MIME type for a stored file of this kind with the given extension.
    pub fn mime_type(ext: &str) -> &'static str {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => "application/pdf",
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "bmp" => "image/bmp",
            _ => "application/octet-stream",
        }
    }
}

/// Quarter-turn rotation applied to rendered pages (clockwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    /// Normalise a requested rotation in degrees.
    ///
    /// Degrees are reduced modulo 360 (so -90 becomes 270). Values that are
    /// not a multiple of 90 map to `Rotation::None`.
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees.rem_euclid(360) {
            90 => Self::Clockwise90,
            180 => Self::Clockwise180,
            270 => Self::Clockwise270,
            _ => Self::None,
        }
    }

    pub fn degrees(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::Clockwise90 => 90,
            Self::Clockwise180 => 180,
            Self::Clockwise270 => 270,
        }
    }
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
}

impl PaperSize {
    /// Dimensions in millimetres (width, height), portrait.
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
        }
    }

    /// CUPS `media` option value for this paper size.
    pub fn media_keyword(&self) -> &'static str {
        match self {
            Self::A4 => "A4",
            Self::A3 => "A3",
            Self::A5 => "A5",
            Self::Letter => "Letter",
            Self::Legal => "Legal",
        }
    }
}

/// Page orientation requested from the print target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// A single request to print one stored document.
///
/// Immutable once built; consumed by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintJob {
    id: JobId,
    source_path: PathBuf,
    copies: u32,
    rotation_degrees: i32,
    file_kind: FileKind,
}

impl PrintJob {
    /// Build a job for `source_path`, inferring its kind from the extension.
    pub fn new(source_path: impl Into<PathBuf>, copies: u32, rotation_degrees: i32) -> Result<Self> {
        let source_path = source_path.into();
        if copies == 0 {
            return Err(PrintBridgeError::InvalidOperation(
                "copies must be at least 1".into(),
            ));
        }
        let file_kind = FileKind::from_path(&source_path)?;
        Ok(Self {
            id: JobId::new(),
            source_path,
            copies,
            rotation_degrees,
            file_kind,
        })
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn copies(&self) -> u32 {
        self.copies
    }

    /// Rotation exactly as requested by the caller.
    pub fn rotation_degrees(&self) -> i32 {
        self.rotation_degrees
    }

    /// Rotation normalised to a quarter turn.
    pub fn rotation(&self) -> Rotation {
        Rotation::from_degrees(self.rotation_degrees)
    }

    pub fn file_kind(&self) -> FileKind {
        self.file_kind
    }
}

/// Drawable region of a physical page in device pixels.
///
/// `left`/`top`/`width`/`height` are the margin bounds; `page_width` and
/// `page_height` are the full sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrintableArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub page_width: f64,
    pub page_height: f64,
    pub landscape: bool,
}

impl PrintableArea {
    /// Printable area of `paper` at `dpi`, inset by `margin_mm` on every side.
    pub fn for_paper(paper: PaperSize, orientation: Orientation, dpi: u32, margin_mm: f64) -> Self {
        let (w_mm, h_mm) = paper.dimensions_mm();
        let to_px = |mm: f64| mm / MM_PER_INCH * f64::from(dpi);

        let (page_width, page_height) = match orientation {
            Orientation::Portrait => (to_px(f64::from(w_mm)), to_px(f64::from(h_mm))),
            Orientation::Landscape => (to_px(f64::from(h_mm)), to_px(f64::from(w_mm))),
        };

        // Margins wider than half the sheet collapse to a zero-size area
        // centred on the page rather than going negative.
        let margin = to_px(margin_mm.max(0.0))
            .min(page_width / 2.0)
            .min(page_height / 2.0);

        Self {
            left: margin,
            top: margin,
            width: page_width - 2.0 * margin,
            height: page_height - 2.0 * margin,
            page_width,
            page_height,
            landscape: orientation == Orientation::Landscape,
        }
    }
}

/// Output rectangle for a bitmap inside a printable area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}
