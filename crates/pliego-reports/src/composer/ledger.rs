// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// General ledger ("Libro Diario").
//
// One group per voucher: a grey header band, the voucher's lines under a
// repeated table header, and a subtotal. A group that fails to render is
// rolled back and skipped so the rest of the book still comes out.

use std::collections::HashMap;

use chrono::Datelike;
use pliego_core::error::{PliegoError, Result};
use pliego_core::{PageFormat, ReportKind, Rgb};
use pliego_document::pdf::metrics::text_width_mm;
use pliego_document::pdf::{
    Band, Column, ColumnTotals, ColumnWidth, DrawOp, EmbeddedImage, PageRegion, Paginator, Row,
    StrokeStyle, TableSpec, TableStyle, TextStyle, TotalKind,
};
use tracing::{debug, info, instrument, warn};

use super::letterhead::{MARGIN, accounting_footer, draw_filter_lines, draw_letterhead};
use super::{ReportComposer, Rendered, fit_text};
use crate::filename::ledger_stem;
use crate::filters::{LedgerFilter, display_date};
use crate::models::{Voucher, VoucherLine};
use crate::source::ReportSource;

const REGION: PageRegion = PageRegion {
    top: 15.0,
    threshold: 270.0,
};
const TABLE_WIDTH: f64 = 180.0;
const GROUP_HEADER_HEIGHT: f64 = 8.0;
/// Group header, table header and one row.
const GROUP_MIN_HEIGHT: f64 = 22.0;
const EMPTY: &str = "No hay comprobantes para exportar con los filtros seleccionados";

fn table(accent: Rgb) -> Result<TableSpec> {
    let amount = |key: &str, label: &str| Column::numeric(key, label, ColumnWidth::Weight(1.0));
    TableSpec::new(
        vec![
            Column::text("cuenta", "Cuenta", ColumnWidth::Fixed(30.0)),
            Column::text("descripcion", "Descripción", ColumnWidth::Fixed(70.0)),
            amount("debe_bs", "Debe Bs"),
            amount("haber_bs", "Haber Bs"),
            amount("debe_usd", "Debe USD"),
            amount("haber_usd", "Haber USD"),
        ],
        MARGIN,
        TABLE_WIDTH,
        TableStyle {
            body_text: TextStyle::regular(7.0),
            gloss_text: TextStyle::italic(7.0).with_color(Rgb::grey(100)),
            line_height: 4.0,
            body_baseline: 4.0,
            accent,
            ..TableStyle::default()
        },
    )
}

#[instrument(skip_all)]
pub(super) fn render<S: ReportSource>(
    composer: &ReportComposer<S>,
    logo: Option<&EmbeddedImage>,
    filter: &LedgerFilter,
) -> Result<Rendered> {
    let vouchers = composer.source().vouchers(&filter.query())?;
    if vouchers.is_empty() {
        return Err(PliegoError::EmptyDataset(EMPTY.into()));
    }
    let ids: Vec<i64> = vouchers.iter().map(|v| v.id).collect();
    let lines = composer.source().voucher_lines(&ids)?;
    if lines.is_empty() {
        return Err(PliegoError::EmptyDataset(EMPTY.into()));
    }
    let descriptions = composer.account_descriptions(&lines)?;
    let mut groups: HashMap<i64, Vec<&VoucherLine>> = HashMap::new();
    for line in &lines {
        groups.entry(line.voucher_id).or_default().push(line);
    }

    let brand = &composer.config().brand;
    let table = table(brand.accent)?;
    let mut pager = Paginator::new(ReportKind::Ledger.title(), PageFormat::A4_PORTRAIT, REGION, 0.0);
    draw_letterhead(&mut pager, brand, logo, "Libro Diario", TextStyle::bold(14.0));
    let top = draw_filter_lines(&mut pager, &filter.summary_lines());
    pager.set_cursor(top);

    let mut grand = ColumnTotals::new();
    let mut rendered = 0usize;
    for voucher in &vouchers {
        let Some(group) = groups.get(&voucher.id) else {
            warn!(number = %voucher.number, "Voucher has no lines, skipped");
            continue;
        };
        let checkpoint = pager.checkpoint();
        match render_group(&mut pager, &table, voucher, group, &descriptions) {
            Ok(subtotal) => {
                grand.merge(&subtotal);
                rendered += 1;
            }
            Err(err) => {
                warn!(number = %voucher.number, error = %err, "Ledger group failed, skipped");
                pager.rollback(checkpoint);
            }
        }
    }
    if rendered == 0 {
        return Err(PliegoError::EmptyDataset(EMPTY.into()));
    }

    pager.advance(5.0);
    pager.place(&table.total_band("TOTALES GENERALES:", 1, &grand, TotalKind::Grand))?;
    info!(groups = rendered, pages = pager.page_count(), "Ledger laid out");

    let footer = accounting_footer(brand, composer.today().year());
    Ok(Rendered {
        document: pager.finish(Some(&footer)),
        stem: ledger_stem(composer.today()),
    })
}

fn render_group(
    pager: &mut Paginator,
    table: &TableSpec,
    voucher: &Voucher,
    lines: &[&VoucherLine],
    descriptions: &HashMap<String, String>,
) -> Result<ColumnTotals> {
    pager.keep_together(GROUP_MIN_HEIGHT)?;
    pager.place(&group_header(voucher))?;
    pager.begin_table(table)?;

    let mut subtotal = ColumnTotals::new();
    for line in lines {
        let description = descriptions
            .get(&line.account)
            .map(String::as_str)
            .or(line.gloss_text())
            .unwrap_or("-");
        let row = Row::new()
            .text("cuenta", line.account.clone())
            .text("descripcion", description)
            .number("debe_bs", line.debit_bs)
            .number("haber_bs", line.credit_bs)
            .number("debe_usd", line.debit_usd)
            .number("haber_usd", line.credit_usd);
        subtotal.record(table, &row)?;
        pager.place(&table.body_band(&row)?)?;
    }
    pager.place(&table.total_band("TOTALES:", 1, &subtotal, TotalKind::Subtotal))?;
    pager.end_table();
    pager.advance(2.0);
    debug!(number = %voucher.number, lines = lines.len(), "Ledger group placed");
    Ok(subtotal)
}

/// `N°: 15   Fecha: 05/03/2025   Comprobante de Ingreso   Concepto: ...`
fn group_header(voucher: &Voucher) -> Band {
    let style = TextStyle::bold(8.0);
    let mut band = Band::new(GROUP_HEADER_HEIGHT).with(DrawOp::rect(
        MARGIN,
        0.0,
        TABLE_WIDTH,
        GROUP_HEADER_HEIGHT,
        Some(Rgb::grey(245)),
        Some(StrokeStyle::hairline(Rgb::grey(200))),
    ));
    let right = MARGIN + TABLE_WIDTH - 2.0;
    let mut x = MARGIN + 2.0;
    let mut runs = vec![
        format!("N°: {}", voucher.number),
        format!("Fecha: {}", display_date(voucher.date)),
        format!("Comprobante de {}", voucher.kind_title()),
    ];
    if let Some(concept) = voucher.concept.as_deref().filter(|c| !c.trim().is_empty()) {
        runs.push(format!("Concepto: {}", concept.trim()));
    }
    for run in runs {
        let text = fit_text(&run, right - x, style);
        if text.is_empty() {
            break;
        }
        let width = text_width_mm(&text, style.face, style.size_pt);
        band.push(DrawOp::text(x, 5.0, text, style));
        x += width + 5.0;
    }
    band
}
