// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single accounting voucher.

use chrono::Datelike;
use pliego_core::error::{PliegoError, Result};
use pliego_core::{PageFormat, ReportKind, Rgb};
use pliego_document::amount_in_words;
use pliego_document::pdf::metrics::{text_width_mm, wrap_text};
use pliego_document::pdf::{
    Align, Band, Column, ColumnTotals, ColumnWidth, DrawOp, EmbeddedImage, PageRegion, Paginator,
    Row, StrokeStyle, TableSpec, TableStyle, TextStyle, TotalKind,
};
use tracing::{debug, instrument};

use super::letterhead::{MARGIN, accounting_footer, draw_letterhead};
use super::{ReportComposer, Rendered};
use crate::filename::voucher_stem;
use crate::filters::display_date;
use crate::source::ReportSource;

const REGION: PageRegion = PageRegion {
    top: 15.0,
    threshold: 270.0,
};
const TABLE_WIDTH: f64 = 180.0;
const FIELDS_TOP: f64 = 42.0;
const FIELD_VALUE_X: f64 = 50.0;
const FIELD_VALUE_WIDTH: f64 = 150.0;
/// Keeps the header fields clear of the table and the page threshold.
const FIELD_MAX_LINES: usize = 6;
const FIELD_STEP: f64 = 6.0;
const WRAPPED_STEP: f64 = 5.0;
const SIGNATURES: [&str; 4] = [
    "Elaborado por",
    "Revisado por",
    "Autorizado por",
    "Recibí conforme",
];
const SIGNATURE_PITCH: f64 = 45.0;

fn table() -> Result<TableSpec> {
    let amount = |key: &str, label: &str| Column::numeric(key, label, ColumnWidth::Weight(1.0));
    TableSpec::new(
        vec![
            Column::text("cuenta", "Cuenta", ColumnWidth::Fixed(25.0)),
            Column::text("descripcion", "Descripción", ColumnWidth::Fixed(50.0)),
            amount("debe_bs", "Debe Bs"),
            amount("haber_bs", "Haber Bs"),
            amount("debe_usd", "Debe USD"),
            amount("haber_usd", "Haber USD"),
        ],
        MARGIN,
        TABLE_WIDTH,
        TableStyle {
            total_text: TextStyle::bold(9.0),
            ..TableStyle::default()
        },
    )
}

#[instrument(skip(composer, logo))]
pub(super) fn render<S: ReportSource>(
    composer: &ReportComposer<S>,
    logo: Option<&EmbeddedImage>,
    id: i64,
) -> Result<Rendered> {
    let voucher = composer.source().voucher(id)?;
    if !voucher.is_approved() {
        return Err(PliegoError::InvalidRequest(
            "Solo se pueden exportar comprobantes aprobados".into(),
        ));
    }
    let lines = composer.source().voucher_lines(&[voucher.id])?;
    if lines.is_empty() {
        return Err(PliegoError::EmptyDataset(
            "El comprobante no tiene detalles".into(),
        ));
    }
    let descriptions = composer.account_descriptions(&lines)?;
    let brand = &composer.config().brand;
    let kind = voucher.kind_title();
    debug!(number = %voucher.number, lines = lines.len(), "Rendering voucher");

    let format = PageFormat::A4_PORTRAIT;
    let mut pager = Paginator::new(ReportKind::Voucher.title(), format, REGION, FIELDS_TOP);
    draw_letterhead(
        &mut pager,
        brand,
        logo,
        &format!("Comprobante de {kind} N° {}", voucher.number),
        TextStyle::bold(12.0),
    );
    pager.draw(DrawOp::aligned_text(
        format.width_mm() - MARGIN,
        36.0,
        format!("Fecha: {}", display_date(voucher.date)),
        TextStyle::regular(10.0),
        Align::Right,
    ));

    // -- Header fields ---------------------------------------------------------

    let label = TextStyle::bold(9.0);
    let value = TextStyle::regular(9.0);
    let mut y = FIELDS_TOP;
    let field = |pager: &mut Paginator, caption: &str, text: &str, y: &mut f64| {
        pager.draw(DrawOp::text(MARGIN, *y, caption, label));
        let wrapped = super::clamp_lines(
            wrap_text(text, FIELD_VALUE_WIDTH, value.face, value.size_pt),
            FIELD_MAX_LINES,
            FIELD_VALUE_WIDTH,
            value,
        );
        let count = wrapped.len().max(1);
        for (i, line) in wrapped.into_iter().enumerate() {
            pager.draw(DrawOp::text(FIELD_VALUE_X, *y + WRAPPED_STEP * i as f64, line, value));
        }
        *y += FIELD_STEP.max(WRAPPED_STEP * count as f64 + 1.0);
    };
    field(&mut pager, "Beneficiario:", &super::or_dash(voucher.beneficiary.as_deref()), &mut y);
    field(&mut pager, "NIT:", &super::or_dash(voucher.tax_id.as_deref()), &mut y);
    field(&mut pager, "Concepto:", &super::or_dash(voucher.concept.as_deref()), &mut y);
    field(&mut pager, "Tipo de Cambio:", &brand.exchange_rate_label, &mut y);
    if let Some(check) = voucher.check_number.as_deref().filter(|c| !c.trim().is_empty()) {
        field(&mut pager, "Nro. Cheque:", check, &mut y);
    }
    pager.set_cursor(y + 2.0);

    // -- Lines -----------------------------------------------------------------

    let table = table()?;
    let mut totals = ColumnTotals::new();
    pager.begin_table(&table)?;
    for line in &lines {
        let description = descriptions.get(&line.account).cloned().unwrap_or_default();
        let row = Row::new()
            .text("cuenta", line.account.clone())
            .text("descripcion", description)
            .number("debe_bs", line.debit_bs)
            .number("haber_bs", line.credit_bs)
            .number("debe_usd", line.debit_usd)
            .number("haber_usd", line.credit_usd)
            .gloss("descripcion", line.gloss_text().unwrap_or_default());
        totals.record(&table, &row)?;
        pager.place(&table.body_band(&row)?)?;
    }
    pager.end_table();
    pager.advance(3.0);
    pager.place(&table.total_band("TOTALES", 1, &totals, TotalKind::Grand))?;

    // -- Amount in words and signatures ----------------------------------------

    let words = amount_in_words(totals.amount("debe_bs"), &brand.currency_name)?;
    let son = son_band(&words);
    let signatures = signature_band();
    pager.advance(8.0);
    pager.keep_together(son.height() + signatures.height())?;
    pager.place(&son)?;
    pager.place(&signatures)?;

    let footer = accounting_footer(brand, composer.today().year());
    Ok(Rendered {
        document: pager.finish(Some(&footer)),
        stem: voucher_stem(&kind, &voucher.number),
    })
}

/// "Son:" followed by the amount in words.
fn son_band(words: &str) -> Band {
    let style = TextStyle::regular(9.0);
    let lines = wrap_text(words, 160.0, style.face, style.size_pt);
    let mut band = Band::new(WRAPPED_STEP * lines.len() as f64 + 2.0)
        .with(DrawOp::text(MARGIN, 4.0, "Son:", TextStyle::bold(9.0)));
    for (i, line) in lines.into_iter().enumerate() {
        band.push(DrawOp::text(40.0, 4.0 + WRAPPED_STEP * i as f64, line, style));
    }
    band
}

/// Signature captions with a rule under each.
fn signature_band() -> Band {
    let style = TextStyle::bold(9.0);
    let baseline = 25.0;
    let mut band = Band::new(30.0);
    for (i, caption) in SIGNATURES.iter().enumerate() {
        let x = MARGIN + SIGNATURE_PITCH * i as f64;
        let width = text_width_mm(caption, style.face, style.size_pt);
        band.push(DrawOp::text(x, baseline, *caption, style));
        band.push(DrawOp::hline(
            x,
            x + width,
            baseline + 3.0,
            StrokeStyle::hairline(Rgb::BLACK),
        ));
    }
    band
}
