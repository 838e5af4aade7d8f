// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CUPS print target.
//
// Whole documents go straight to `lp`. Raster jobs are composed onto white,
// page-sized canvases at the raster resolution, written to a scratch
// directory as PNG, and submitted to `lp` as a single multi-file job when the
// job finishes.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use printbridge_core::error::{PrintBridgeError, Result};
use printbridge_core::exec::{CommandExecutor, CommandSpec};
use printbridge_core::types::{Orientation, PaperSize, Placement, PrintableArea};
use printbridge_document::PageBitmap;
use tempfile::TempDir;
use tracing::{debug, info};

use crate::dispatcher::RASTER_DPI;
use crate::target::{JobOptions, PageSink, PrintTarget};

const LP: &str = "lp";

/// Prints through the CUPS `lp` command.
pub struct CupsTarget {
    executor: Arc<dyn CommandExecutor>,
    paper: PaperSize,
    margin_mm: f64,
    program: String,
}

impl CupsTarget {
    pub fn new(executor: Arc<dyn CommandExecutor>, paper: PaperSize, margin_mm: f64) -> Self {
        Self {
            executor,
            paper,
            margin_mm,
            program: LP.into(),
        }
    }
}

/// Common `lp` prefix: destination, copies and title.
fn lp_command(program: &str, options: &JobOptions) -> CommandSpec {
    let mut command = CommandSpec::new(program);
    if let Some(printer) = &options.printer {
        command = command.args(["-d", printer.as_str()]);
    }
    command
        .args(["-n".to_string(), options.copies.to_string()])
        .args(["-t", options.title.as_str()])
}

/// Run a submit command, turning a non-zero exit into `DeviceFailure`.
fn submit(executor: &dyn CommandExecutor, command: &CommandSpec) -> Result<()> {
    let output = executor.run(command);
    if output.is_success() {
        Ok(())
    } else {
        Err(PrintBridgeError::DeviceFailure(format!(
            "`{command}` exited with status {}: {}",
            output.exit_code,
            output.stderr.trim()
        )))
    }
}

impl PrintTarget for CupsTarget {
    /// CUPS only exists on Unix hosts. Windows has no print target yet, so
    /// every job there fails with `PlatformUnsupported`.
    fn is_available(&self) -> bool {
        cfg!(unix)
    }

    fn print_document(&self, path: &Path, options: &JobOptions) -> Result<()> {
        let command = lp_command(&self.program, options)
            .arg("--")
            .arg(path.display().to_string());
        submit(self.executor.as_ref(), &command)?;
        info!(job_id = %options.job_id, path = %path.display(), "document sent to CUPS");
        Ok(())
    }

    fn start_job(&self, options: &JobOptions) -> Result<Box<dyn PageSink>> {
        let scratch = tempfile::Builder::new()
            .prefix("printbridge-job-")
            .tempdir()?;
        Ok(Box::new(CupsPageSink {
            executor: Arc::clone(&self.executor),
            options: options.clone(),
            paper: self.paper,
            margin_mm: self.margin_mm,
            program: self.program.clone(),
            scratch,
            pages: Vec::new(),
        }))
    }
}

/// Raster job being built up page by page in a scratch directory.
struct CupsPageSink {
    executor: Arc<dyn CommandExecutor>,
    options: JobOptions,
    paper: PaperSize,
    margin_mm: f64,
    program: String,
    scratch: TempDir,
    pages: Vec<PathBuf>,
}

impl CupsPageSink {
    /// Paint `bitmap` onto a white sheet of the area's page size.
    fn compose(bitmap: PageBitmap, placement: Placement, area: &PrintableArea) -> RgbImage {
        let page_width = area.page_width.round().max(1.0) as u32;
        let page_height = area.page_height.round().max(1.0) as u32;
        let mut canvas = RgbImage::from_pixel(page_width, page_height, Rgb([255, 255, 255]));

        let out_width = placement.width.round() as u32;
        let out_height = placement.height.round() as u32;
        if out_width == 0 || out_height == 0 {
            return canvas;
        }

        let scaled = bitmap
            .into_dynamic()
            .resize_exact(out_width, out_height, FilterType::Triangle)
            .to_rgb8();
        imageops::overlay(
            &mut canvas,
            &scaled,
            placement.x.round() as i64,
            placement.y.round() as i64,
        );
        canvas
    }
}

impl PageSink for CupsPageSink {
    fn printable_area(&mut self, orientation: Orientation) -> PrintableArea {
        PrintableArea::for_paper(self.paper, orientation, RASTER_DPI, self.margin_mm)
    }

    fn submit_page(
        &mut self,
        bitmap: PageBitmap,
        placement: Placement,
        area: &PrintableArea,
    ) -> Result<()> {
        let page = bitmap.page();
        let canvas = Self::compose(bitmap, placement, area);

        let path = self
            .scratch
            .path()
            .join(format!("page-{:04}.png", self.pages.len()));
        canvas
            .save(&path)
            .map_err(|e| PrintBridgeError::DeviceFailure(format!("spooling page {page}: {e}")))?;

        debug!(job_id = %self.options.job_id, page, path = %path.display(), "page composed");
        self.pages.push(path);
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<usize> {
        if self.pages.is_empty() {
            debug!(job_id = %self.options.job_id, "no pages composed, nothing submitted");
            return Ok(0);
        }

        let command = lp_command(&self.program, &self.options)
            .args(["-o".to_string(), format!("ppi={RASTER_DPI}")])
            .args(["-o".to_string(), format!("media={}", self.paper.media_keyword())])
            .arg("--")
            .args(self.pages.iter().map(|p| p.display().to_string()));
        submit(self.executor.as_ref(), &command)?;

        info!(
            job_id = %self.options.job_id,
            pages = self.pages.len(),
            "raster job sent to CUPS"
        );
        Ok(self.pages.len())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use image::{DynamicImage, Rgba, RgbaImage};
    use printbridge_core::exec::CommandOutput;
    use printbridge_core::types::JobId;

    use super::*;
    use crate::compositor;

    /// Records submitted commands and decodes the spooled page files before
    /// the scratch directory goes away.
    #[derive(Default)]
    struct RecordingLp {
        commands: Mutex<Vec<CommandSpec>>,
        spooled: Mutex<Vec<RgbImage>>,
        exit_code: i32,
    }

    impl CommandExecutor for RecordingLp {
        fn run(&self, command: &CommandSpec) -> CommandOutput {
            self.commands.lock().unwrap().push(command.clone());
            for arg in command.args.iter().filter(|a| a.ends_with(".png")) {
                self.spooled
                    .lock()
                    .unwrap()
                    .push(image::open(arg).unwrap().to_rgb8());
            }
            CommandOutput {
                exit_code: self.exit_code,
                stderr: if self.exit_code == 0 {
                    String::new()
                } else {
                    "lp: The printer or class does not exist.".into()
                },
            }
        }
    }

    fn options(printer: Option<&str>, copies: u32) -> JobOptions {
        JobOptions {
            job_id: JobId::new(),
            printer: printer.map(str::to_string),
            copies,
            title: "invoice.pdf".into(),
        }
    }

    fn black_page(width: u32, height: u32) -> PageBitmap {
        PageBitmap::from_dynamic(
            0,
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]))),
        )
    }

    #[test]
    fn available_only_on_unix() {
        let target = CupsTarget::new(Arc::new(RecordingLp::default()), PaperSize::A4, 25.4);
        assert_eq!(target.is_available(), cfg!(unix));
    }

    #[test]
    fn direct_print_names_printer_and_copies() {
        let lp = Arc::new(RecordingLp::default());
        let target = CupsTarget::new(lp.clone(), PaperSize::A4, 25.4);

        target
            .print_document(Path::new("/tmp/doc.pdf"), &options(Some("Front Desk"), 3))
            .unwrap();

        let commands = lp.commands.lock().unwrap();
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].program, "lp");
        assert_eq!(
            commands[0].args,
            ["-d", "Front Desk", "-n", "3", "-t", "invoice.pdf", "--", "/tmp/doc.pdf"]
        );
    }

    #[test]
    fn default_printer_omits_destination() {
        let lp = Arc::new(RecordingLp::default());
        let target = CupsTarget::new(lp.clone(), PaperSize::A4, 25.4);
        target
            .print_document(Path::new("/tmp/doc.pdf"), &options(None, 1))
            .unwrap();
        assert!(!lp.commands.lock().unwrap()[0].args.contains(&"-d".to_string()));
    }

    #[test]
    fn rejected_submission_is_device_failure() {
        let lp = Arc::new(RecordingLp {
            exit_code: 1,
            ..Default::default()
        });
        let target = CupsTarget::new(lp, PaperSize::A4, 25.4);
        let err = target
            .print_document(Path::new("/tmp/doc.pdf"), &options(Some("nope"), 1))
            .unwrap_err();
        match err {
            PrintBridgeError::DeviceFailure(message) => {
                assert!(message.contains("does not exist"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn raster_job_composes_centred_pages_and_submits_once() {
        let lp = Arc::new(RecordingLp::default());
        let target = CupsTarget::new(lp.clone(), PaperSize::A5, 25.4);
        let mut sink = target.start_job(&options(None, 2)).unwrap();

        for _ in 0..2 {
            let area = sink.printable_area(Orientation::Portrait);
            let bitmap = black_page(40, 20);
            let placement = compositor::fit(&bitmap, &area);
            sink.submit_page(bitmap, placement, &area).unwrap();
        }
        assert_eq!(sink.finish().unwrap(), 2);

        let commands = lp.commands.lock().unwrap();
        assert_eq!(commands.len(), 1);
        let args = &commands[0].args;
        assert!(args.windows(2).any(|w| w == ["-n", "2"]));
        assert!(args.windows(2).any(|w| w == ["-o", "ppi=300"]));
        assert!(args.windows(2).any(|w| w == ["-o", "media=A5"]));
        assert_eq!(args.iter().filter(|a| a.ends_with(".png")).count(), 2);

        let spooled = lp.spooled.lock().unwrap();
        let page = &spooled[0];
        // A5 at 300 DPI.
        assert_eq!(page.dimensions(), (1748, 2480));
        // Margin stays white, the middle of the sheet carries the image.
        assert_eq!(page.get_pixel(5, 5).0, [255, 255, 255]);
        assert_eq!(page.get_pixel(874, 1240).0, [0, 0, 0]);
        // Wide image on a portrait sheet: blank above and below it.
        assert_eq!(page.get_pixel(874, 400).0, [255, 255, 255]);
    }

    #[test]
    fn landscape_request_changes_the_sheet() {
        let lp = Arc::new(RecordingLp::default());
        let target = CupsTarget::new(lp, PaperSize::A4, 10.0);
        let mut sink = target.start_job(&options(None, 1)).unwrap();

        let portrait = sink.printable_area(Orientation::Portrait);
        let landscape = sink.printable_area(Orientation::Landscape);
        assert!(!portrait.landscape && landscape.landscape);
        assert!((portrait.page_width - landscape.page_height).abs() < 1e-9);
    }

    #[test]
    fn empty_job_submits_nothing() {
        let lp = Arc::new(RecordingLp::default());
        let target = CupsTarget::new(lp.clone(), PaperSize::A4, 25.4);
        let sink = target.start_job(&options(None, 1)).unwrap();
        assert_eq!(sink.finish().unwrap(), 0);
        assert!(lp.commands.lock().unwrap().is_empty());
    }

    #[test]
    fn abandoned_job_submits_nothing() {
        let lp = Arc::new(RecordingLp::default());
        let target = CupsTarget::new(lp.clone(), PaperSize::A4, 25.4);
        {
            let mut sink = target.start_job(&options(None, 1)).unwrap();
            let area = sink.printable_area(Orientation::Portrait);
            let bitmap = black_page(10, 10);
            let placement = compositor::fit(&bitmap, &area);
            sink.submit_page(bitmap, placement, &area).unwrap();
        }
        assert!(lp.commands.lock().unwrap().is_empty());
    }
}
