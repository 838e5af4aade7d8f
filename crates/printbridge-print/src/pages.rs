// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pull-based page sequence for the raster print path.

use std::iter::FusedIterator;

use printbridge_core::error::Result;
use printbridge_document::{DocumentHandle, PageBitmap};

/// Renders the pages of an opened document one at a time, in order.
///
/// Each call to `next` rasterises exactly one page; the sequence ends after
/// `page_count` items, whatever the outcome of the individual renders. Only
/// the page most recently yielded is alive at any point unless the caller
/// holds on to it.
pub struct PageSequence {
    document: Box<dyn DocumentHandle>,
    dpi: u32,
    next_index: usize,
    page_count: usize,
}

impl PageSequence {
    pub fn new(document: Box<dyn DocumentHandle>, dpi: u32) -> Self {
        let page_count = document.page_count();
        Self {
            document,
            dpi,
            next_index: 0,
            page_count,
        }
    }
}

impl Iterator for PageSequence {
    type Item = Result<PageBitmap>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_index >= self.page_count {
            return None;
        }
        let index = self.next_index;
        self.next_index += 1;
        Some(self.document.render_page(index, self.dpi, self.dpi))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.page_count - self.next_index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PageSequence {}

impl FusedIterator for PageSequence {}
