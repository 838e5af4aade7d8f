// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The page-oriented printing capability the dispatcher drives.

use std::path::Path;

use printbridge_core::error::Result;
use printbridge_core::types::{JobId, Orientation, Placement, PrintableArea};
use printbridge_document::PageBitmap;

/// Per-job options passed to the print target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOptions {
    pub job_id: JobId,
    /// Destination queue; `None` means the system default printer.
    pub printer: Option<String>,
    pub copies: u32,
    /// Name shown in the OS print queue.
    pub title: String,
}

/// A printing subsystem able to take whole documents or composed pages.
pub trait PrintTarget: Send + Sync {
    /// Whether this host has the native printing capability at all.
    fn is_available(&self) -> bool;

    /// Hand a whole document to the device's native multi-page print path.
    fn print_document(&self, path: &Path, options: &JobOptions) -> Result<()>;

    /// Begin a page-by-page job.
    fn start_job(&self, options: &JobOptions) -> Result<Box<dyn PageSink>>;
}

/// An in-progress page-by-page print job.
///
/// Dropping a sink without calling [`PageSink::finish`] abandons the job and
/// nothing is printed.
pub trait PageSink: Send {
    /// Printable area of the next page, requesting `orientation` for it.
    ///
    /// The request is best effort: a target that cannot change orientation
    /// mid-job returns the area it will actually use.
    fn printable_area(&mut self, orientation: Orientation) -> PrintableArea;

    /// Draw `bitmap` at `placement` on a page laid out as `area`.
    fn submit_page(
        &mut self,
        bitmap: PageBitmap,
        placement: Placement,
        area: &PrintableArea,
    ) -> Result<()>;

    /// Submit every page drawn so far as one job and return how many pages
    /// were sent.
    fn finish(self: Box<Self>) -> Result<usize>;
}
