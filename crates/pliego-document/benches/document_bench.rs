// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the layout engine in the pliego-document crate.
// Covers text wrapping, a long multi-page table through the paginator, and
// JPEG recompression of a catalog-sized photo.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb as Pixel, RgbImage};

use pliego_core::{ImageConfig, ImageFormat, PageFormat};
use pliego_document::image::normalizer::recompress;
use pliego_document::pdf::metrics::wrap_text;
use pliego_document::pdf::{
    Column, ColumnTotals, ColumnWidth, FontFace, PageRegion, Paginator, Row, TableSpec,
    TableStyle, TotalKind,
};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Wrap a long ledger concept into a 60 mm column.
fn bench_wrap_text(c: &mut Criterion) {
    let concept = "Pago a proveedor por instalación de valla publicitaria en Av. Arce, \
                   incluye transporte, montaje, iluminación y mantenimiento trimestral "
        .repeat(4);

    c.bench_function("wrap_text (60 mm, 8 pt)", |b| {
        b.iter(|| black_box(wrap_text(black_box(&concept), 60.0, FontFace::Regular, 8.0)));
    });
}

/// Lay out 500 rows with wrapped glosses and running totals.
fn bench_paginated_table(c: &mut Criterion) {
    let table = TableSpec::new(
        vec![
            Column::text("cuenta", "Cuenta", ColumnWidth::Fixed(25.0)),
            Column::text("descripcion", "Descripción", ColumnWidth::Weight(3.0)).absorbing(),
            Column::numeric("debe", "Debe Bs", ColumnWidth::Weight(1.0)),
            Column::numeric("haber", "Haber Bs", ColumnWidth::Weight(1.0)),
        ],
        15.0,
        180.0,
        TableStyle::default(),
    )
    .expect("valid table");

    let rows: Vec<Row> = (0..500)
        .map(|i| {
            Row::new()
                .text("cuenta", format!("1.1.{i:03}"))
                .text("descripcion", "Caja moneda nacional, arqueo del periodo")
                .number("debe", 1234.5 + f64::from(i))
                .number("haber", 0.0)
                .gloss("descripcion", "Glosa de respaldo para la línea")
        })
        .collect();

    c.bench_function("paginated table (500 rows)", |b| {
        b.iter(|| {
            let mut pager = Paginator::new(
                "bench",
                PageFormat::A4_PORTRAIT,
                PageRegion::new(20.0, 270.0),
                40.0,
            );
            let mut totals = ColumnTotals::new();
            pager.begin_table(&table).expect("header fits");
            for row in &rows {
                totals.record(&table, row).expect("finite amounts");
                let band = table.body_band(row).expect("row lays out");
                pager.place(&band).expect("row fits");
            }
            pager
                .place(&table.total_band("TOTALES:", 1, &totals, TotalKind::Grand))
                .expect("total fits");
            black_box(pager.finish(None));
        });
    });
}

/// Recompress a 2400x1800 opaque photo to the 1200 px budget.
fn bench_recompress(c: &mut Criterion) {
    let photo = DynamicImage::ImageRgb8(RgbImage::from_fn(2400, 1800, |x, y| {
        Pixel([(x % 256) as u8, (y % 256) as u8, 128])
    }));
    let mut bytes = std::io::Cursor::new(Vec::new());
    photo
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("png encodes");
    let bytes = bytes.into_inner();
    let config = ImageConfig::default();

    c.bench_function("recompress (2400x1800 png)", |b| {
        b.iter(|| black_box(recompress(bytes.clone(), ImageFormat::Png, &config)));
    });
}

criterion_group!(benches, bench_wrap_text, bench_paginated_table, bench_recompress);
criterion_main!(benches);
