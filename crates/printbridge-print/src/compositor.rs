// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page compositor: fit-to-page geometry.
//
// Pure functions only: given the size of a rendered page and the printable
// area of the sheet it is going onto, work out where to draw it. The result
// always keeps the bitmap's aspect ratio and stays inside the printable area.

use printbridge_core::types::{Orientation, Placement, PrintableArea};
use printbridge_document::PageBitmap;

/// Fit `bitmap` into `area`, scaled as large as possible and centred.
pub fn fit(bitmap: &PageBitmap, area: &PrintableArea) -> Placement {
    fit_dimensions(bitmap.width(), bitmap.height(), area)
}

/// [`fit`] for a bitmap of `width` x `height` pixels.
///
/// An empty bitmap or a collapsed printable area yields a zero-sized
/// placement at the centre of the area.
pub fn fit_dimensions(width: u32, height: u32, area: &PrintableArea) -> Placement {
    let centre_x = area.left + area.width / 2.0;
    let centre_y = area.top + area.height / 2.0;

    if width == 0 || height == 0 || area.width <= 0.0 || area.height <= 0.0 {
        return Placement {
            x: centre_x,
            y: centre_y,
            width: 0.0,
            height: 0.0,
        };
    }

    let image_ratio = f64::from(width) / f64::from(height);
    let area_ratio = area.width / area.height;

    let (out_width, out_height) = if image_ratio >= area_ratio {
        // Wider than the area: the width is the binding edge.
        (area.width, (area.width / image_ratio).min(area.height))
    } else {
        ((area.height * image_ratio).min(area.width), area.height)
    };

    Placement {
        x: area.left + (area.width - out_width) / 2.0,
        y: area.top + (area.height - out_height) / 2.0,
        width: out_width,
        height: out_height,
    }
}

/// Sheet orientation to request for a raster image: landscape when the
/// bitmap is wider than tall.
pub fn orientation_for(bitmap: &PageBitmap) -> Orientation {
    if bitmap.is_landscape() {
        Orientation::Landscape
    } else {
        Orientation::Portrait
    }
}
