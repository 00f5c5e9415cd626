// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stock movement history on A4 landscape.

use chrono::Datelike;
use pliego_core::error::{PliegoError, Result};
use pliego_core::{PageFormat, ReportKind};
use pliego_document::pdf::metrics::truncate_chars;
use pliego_document::pdf::{
    BodyBorders, Column, ColumnWidth, EmbeddedImage, PageRegion, Paginator, Row, TableSpec,
    TableStyle, TextStyle,
};
use pliego_document::{format_amount, format_signed};
use tracing::{info, instrument};

use super::letterhead::{MARGIN, commercial_footer, draw_filter_runs, draw_letterhead};
use super::{ReportComposer, Rendered, or_dash};
use crate::filename::stock_history_stem;
use crate::filters::{StockHistoryFilter, display_timestamp, origin_short_label};
use crate::models::StockMovement;
use crate::source::ReportSource;

const REGION: PageRegion = PageRegion {
    top: 15.0,
    threshold: 193.0,
};
const NAME_LIMIT: usize = 30;

const COLUMNS: [(&str, &str, f64); 13] = [
    ("fecha", "Fecha", 20.0),
    ("origen", "Origen", 18.0),
    ("tipo", "Tipo", 14.0),
    ("codigo", "Código", 15.0),
    ("item", "Ítem", 38.0),
    ("sucursal", "Sucursal", 16.0),
    ("cantidad", "Cantidad", 19.0),
    ("impacto", "Impacto", 13.0),
    ("stock_anterior", "Stock Ant.", 16.0),
    ("stock_nuevo", "Stock Nuevo", 16.0),
    ("tipo_movimiento", "Tipo Mov.", 17.0),
    ("referencia", "Referencia", 19.0),
    ("usuario", "Usuario", 20.0),
];

fn table(page_width: f64) -> Result<TableSpec> {
    let columns = COLUMNS
        .iter()
        .map(|(key, label, weight)| {
            let column = Column::text(*key, *label, ColumnWidth::Weight(*weight)).centered();
            if *key == "item" { column.absorbing() } else { column }
        })
        .collect();
    TableSpec::new(
        columns,
        MARGIN,
        page_width - 2.0 * MARGIN,
        TableStyle {
            header_text: TextStyle::bold(7.0),
            body_text: TextStyle::regular(6.0),
            line_height: 5.0,
            body_baseline: 3.0,
            min_row_height: 5.0,
            body_borders: BodyBorders::Sides,
            ..TableStyle::default()
        },
    )
}

/// Whole numbers without decimals, anything else in the amount format.
fn quantity(value: f64) -> Result<String> {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        Ok(format!("{value:.0}"))
    } else {
        format_amount(value)
    }
}

/// Manual entries show the packaging they were recorded in, everything else
/// the quantity in the unit of measure.
fn quantity_cell(movement: &StockMovement) -> Result<String> {
    if movement.origin == StockMovement::MANUAL_ORIGIN {
        if let Some(packaging) = &movement.packaging {
            if let (Some(amount), Some(format)) = (
                packaging.quantity.as_deref().filter(|q| !q.trim().is_empty()),
                packaging.format.as_deref().filter(|f| !f.trim().is_empty()),
            ) {
                return Ok(format!("{} {}", amount.trim(), format.trim()));
            }
        }
    }
    let amount = quantity(movement.quantity)?;
    Ok(match movement.unit.as_deref().filter(|u| !u.trim().is_empty()) {
        Some(unit) => format!("{amount} {}", unit.trim()),
        None => amount,
    })
}

fn movement_row(movement: &StockMovement) -> Result<Row> {
    let name = or_dash(movement.item_name.as_deref());
    Ok(Row::new()
        .text("fecha", display_timestamp(movement.date))
        .text("origen", origin_short_label(&movement.origin))
        .text("tipo", or_dash(movement.item_type.as_deref()))
        .text("codigo", or_dash(movement.item_code.as_deref()))
        .text("item", truncate_chars(&name, NAME_LIMIT))
        .text("sucursal", or_dash(movement.branch.as_deref()))
        .text("cantidad", quantity_cell(movement)?)
        .text("impacto", format_signed(movement.impact)?)
        .text("stock_anterior", quantity(movement.stock_before)?)
        .text("stock_nuevo", quantity(movement.stock_after)?)
        .text("tipo_movimiento", or_dash(movement.movement_type.as_deref()))
        .text("referencia", or_dash(movement.reference_code.as_deref()))
        .text("usuario", or_dash(movement.user_name.as_deref())))
}

#[instrument(skip(composer, logo))]
pub(super) fn render<S: ReportSource>(
    composer: &ReportComposer<S>,
    logo: Option<&EmbeddedImage>,
    filter: &StockHistoryFilter,
) -> Result<Rendered> {
    let movements = composer.source().stock_movements(filter)?;
    if movements.is_empty() {
        return Err(PliegoError::EmptyDataset(
            "No hay datos para generar el historial con los filtros seleccionados".into(),
        ));
    }

    let brand = &composer.config().brand;
    let format = PageFormat::A4_LANDSCAPE;
    let table = table(format.width_mm())?;
    let mut pager = Paginator::new(ReportKind::StockHistory.title(), format, REGION, 0.0);
    draw_letterhead(&mut pager, brand, logo, "Historial de Stock", TextStyle::bold(14.0));
    let top = draw_filter_runs(&mut pager, &filter.summary_runs());
    pager.set_cursor(top);

    pager.begin_table(&table)?;
    for movement in &movements {
        pager.place(&table.body_band(&movement_row(movement)?)?)?;
    }
    pager.end_table();
    info!(movements = movements.len(), pages = pager.page_count(), "Stock history laid out");

    let identity = composer.footer_identity();
    let footer = commercial_footer(brand, identity.as_ref(), composer.today().year());
    Ok(Rendered {
        document: pager.finish(Some(&footer)),
        stem: stock_history_stem(composer.today()),
    })
}
