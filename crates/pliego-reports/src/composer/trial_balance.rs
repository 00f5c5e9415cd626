// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Trial balance ("Balance de Sumas y Saldos").

use std::collections::HashMap;

use chrono::Datelike;
use pliego_core::error::{PliegoError, Result};
use pliego_core::{PageFormat, ReportKind, Rgb};
use pliego_document::format::format_cents;
use pliego_document::pdf::{
    Align, Band, BodyBorders, Column, ColumnTotals, ColumnWidth, DrawOp, EmbeddedImage,
    PageRegion, Paginator, Row, StrokeStyle, TableSpec, TableStyle, TextStyle,
};
use tracing::{debug, instrument};

use super::letterhead::{MARGIN, accounting_footer, draw_filter_lines, draw_letterhead};
use super::{ReportComposer, Rendered};
use crate::filename::trial_balance_stem;
use crate::filters::TrialBalanceFilter;
use crate::models::{Account, VoucherLine};
use crate::source::ReportSource;

const REGION: PageRegion = PageRegion {
    top: 15.0,
    threshold: 270.0,
};
const AMOUNT_WIDTH: f64 = 17.0;

/// Debit, credit and balance of one account in both currencies.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AccountBalance {
    pub debit_bs: f64,
    pub credit_bs: f64,
    pub debit_usd: f64,
    pub credit_usd: f64,
}

impl AccountBalance {
    fn add(&mut self, line: &VoucherLine) {
        self.debit_bs += line.debit_bs;
        self.credit_bs += line.credit_bs;
        self.debit_usd += line.debit_usd;
        self.credit_usd += line.credit_usd;
    }

    pub fn balance_bs(&self) -> f64 {
        self.debit_bs - self.credit_bs
    }

    pub fn balance_usd(&self) -> f64 {
        self.debit_usd - self.credit_usd
    }

    pub fn is_zero(&self) -> bool {
        [self.debit_bs, self.credit_bs, self.debit_usd, self.credit_usd]
            .iter()
            .all(|v| v.abs() < 0.005)
    }
}

/// Sum `lines` per account, in chart order, dropping quiet accounts unless
/// `include_zero` is set.
pub fn balances<'a>(
    accounts: &'a [Account],
    lines: &[VoucherLine],
    include_zero: bool,
) -> Vec<(&'a Account, AccountBalance)> {
    let mut sums: HashMap<&str, AccountBalance> = HashMap::new();
    for line in lines {
        sums.entry(line.account.as_str()).or_default().add(line);
    }
    accounts
        .iter()
        .map(|account| {
            let balance = sums.get(account.code.as_str()).copied().unwrap_or_default();
            (account, balance)
        })
        .filter(|(_, balance)| include_zero || !balance.is_zero())
        .collect()
}

fn table() -> Result<TableSpec> {
    let amount = |key: &str, label: &str| Column::numeric(key, label, ColumnWidth::Fixed(AMOUNT_WIDTH));
    TableSpec::new(
        vec![
            Column::text("cuenta", "Cuenta", ColumnWidth::Fixed(20.0)),
            Column::text("descripcion", "Descripción", ColumnWidth::Fixed(58.0)),
            amount("debe_bs", "Debe BS"),
            amount("haber_bs", "Haber BS"),
            amount("saldo_bs", "Saldo BS"),
            amount("debe_usd", "Debe USD"),
            amount("haber_usd", "Haber USD"),
            amount("saldo_usd", "Saldo USD"),
        ],
        MARGIN,
        180.0,
        TableStyle {
            body_text: TextStyle::regular(7.0),
            line_height: 5.0,
            body_baseline: 3.0,
            min_row_height: 5.0,
            body_borders: BodyBorders::Sides,
            ..TableStyle::default()
        },
    )
}

#[instrument(skip(composer, logo))]
pub(super) fn render<S: ReportSource>(
    composer: &ReportComposer<S>,
    logo: Option<&EmbeddedImage>,
    filter: &TrialBalanceFilter,
) -> Result<Rendered> {
    filter.validate()?;
    let vouchers = composer.source().vouchers(&filter.voucher_query())?;
    let ids: Vec<i64> = vouchers.iter().map(|v| v.id).collect();
    let lines = if ids.is_empty() {
        Vec::new()
    } else {
        composer.source().voucher_lines(&ids)?
    };
    let accounts = composer.source().accounts(&filter.account_query())?;
    let rows = balances(&accounts, &lines, filter.include_zero);
    if rows.is_empty() {
        return Err(PliegoError::EmptyDataset(
            "No hay datos para generar el balance con los filtros seleccionados".into(),
        ));
    }
    debug!(accounts = rows.len(), vouchers = vouchers.len(), "Balancing accounts");

    let brand = &composer.config().brand;
    let table = table()?;
    let mut pager = Paginator::new(
        ReportKind::TrialBalance.title(),
        PageFormat::A4_PORTRAIT,
        REGION,
        0.0,
    );
    draw_letterhead(
        &mut pager,
        brand,
        logo,
        "Balance de Sumas y Saldos",
        TextStyle::bold(14.0),
    );
    let top = draw_filter_lines(&mut pager, &filter.summary_lines());
    pager.set_cursor(top);

    let mut totals = ColumnTotals::new();
    pager.begin_table(&table)?;
    for (account, balance) in &rows {
        let row = Row::new()
            .text("cuenta", account.code.clone())
            .text("descripcion", account.description.clone())
            .number("debe_bs", balance.debit_bs)
            .number("haber_bs", balance.credit_bs)
            .number("saldo_bs", balance.balance_bs())
            .number("debe_usd", balance.debit_usd)
            .number("haber_usd", balance.credit_usd)
            .number("saldo_usd", balance.balance_usd());
        totals.record(&table, &row)?;
        pager.place(&table.body_band(&row)?)?;
    }
    pager.end_table();
    pager.place(&totals_band(&table, &totals))?;

    let footer = accounting_footer(brand, composer.today().year());
    Ok(Rendered {
        document: pager.finish(Some(&footer)),
        stem: trial_balance_stem(filter.fiscal_year, filter.period),
    })
}

/// A rule across the table, then "TOTALES" and every column total.
fn totals_band(table: &TableSpec, totals: &ColumnTotals) -> Band {
    let style = TextStyle::bold(8.0);
    let mut band = Band::new(8.0)
        .with(DrawOp::hline(
            table.left(),
            table.right(),
            2.0,
            StrokeStyle::hairline(Rgb::BLACK),
        ))
        .with(DrawOp::text(table.left() + 2.0, 6.0, "TOTALES", style));
    let edges = table.boundaries();
    for (i, column) in table.columns().iter().enumerate() {
        if !column.numeric {
            continue;
        }
        band.push(DrawOp::aligned_text(
            edges[i] + table.column_widths()[i] / 2.0,
            6.0,
            format_cents(totals.cents(&column.key)),
            style,
            Align::Center,
        ));
    }
    band
}
