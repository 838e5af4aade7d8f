// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for fit-to-page geometry and page rotation in the
// printbridge-print crate.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, RgbImage};

use printbridge_core::types::{Orientation, PaperSize, PrintableArea, Rotation};
use printbridge_document::PageBitmap;
use printbridge_print::compositor::fit_dimensions;

fn bench_fit(c: &mut Criterion) {
    let portrait = PrintableArea::for_paper(PaperSize::A4, Orientation::Portrait, 300, 25.4);
    let landscape = PrintableArea::for_paper(PaperSize::A4, Orientation::Landscape, 300, 25.4);

    c.bench_function("fit_a4_page_render", |b| {
        b.iter(|| fit_dimensions(black_box(2480), black_box(3508), black_box(&portrait)))
    });

    c.bench_function("fit_photo_mixed_orientations", |b| {
        let sizes = [(4032, 3024), (3024, 4032), (1920, 1080), (1, 10_000)];
        b.iter(|| {
            for &(w, h) in &sizes {
                black_box(fit_dimensions(w, h, &portrait));
                black_box(fit_dimensions(w, h, &landscape));
            }
        })
    });
}

fn bench_rotate(c: &mut Criterion) {
    // A4 at 96 DPI keeps iterations short while still moving real pixels.
    let page = PageBitmap::from_dynamic(0, DynamicImage::ImageRgb8(RgbImage::new(794, 1123)));

    c.bench_function("rotate_page_90", |b| {
        b.iter(|| black_box(page.clone()).rotate(Rotation::Clockwise90))
    });
}

criterion_group!(benches, bench_fit, bench_rotate);
criterion_main!(benches);
