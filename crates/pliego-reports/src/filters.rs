// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Request filters for every report and the summary lines printed under the
// report title.

use chrono::{NaiveDate, NaiveDateTime};
use pliego_core::error::{PliegoError, Result};
use serde::{Deserialize, Serialize};

use crate::models::{APPROVED, Account, StockMovement, Voucher};

const MONTHS: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Spanish month name for 1-12.
pub fn month_name(period: u32) -> Option<&'static str> {
    period
        .checked_sub(1)
        .and_then(|index| MONTHS.get(index as usize))
        .copied()
}

/// `dd/mm/yyyy`, the date form printed in every report.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `dd/mm/yyyy, hh:mm` for stock movements.
pub fn display_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format("%d/%m/%Y, %H:%M").to_string()
}

/// Treat "", "all" and "Todos" as "no filter".
fn selective(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all") && !v.eq_ignore_ascii_case("todos"))
}

fn same(a: Option<&str>, b: &str) -> bool {
    a.is_some_and(|a| a.trim().eq_ignore_ascii_case(b))
}

/// Which vouchers a source should return.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoucherQuery {
    pub fiscal_year: Option<i32>,
    pub period: Option<u32>,
    pub entry_kind: Option<String>,
    pub voucher_kind: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Exact status, `None` for every status.
    pub status: Option<String>,
}

impl VoucherQuery {
    pub fn matches(&self, voucher: &Voucher) -> bool {
        self.fiscal_year.is_none_or(|year| voucher.fiscal_year == Some(year))
            && self.period.is_none_or(|period| voucher.period == Some(period))
            && selective(&self.entry_kind).is_none_or(|kind| same(voucher.entry_kind.as_deref(), kind))
            && selective(&self.voucher_kind).is_none_or(|kind| same(voucher.kind.as_deref(), kind))
            && self.date_from.is_none_or(|from| voucher.date >= from)
            && self.date_to.is_none_or(|to| voucher.date <= to)
            && self
                .status
                .as_deref()
                .is_none_or(|status| voucher.status.trim().eq_ignore_ascii_case(status.trim()))
    }
}

/// Which chart-of-accounts entries a source should return.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountQuery {
    /// Restrict to these codes.
    pub codes: Option<Vec<String>>,
    pub from_code: Option<String>,
    pub to_code: Option<String>,
    /// Accounts at this level or above (numerically lower or equal).
    pub max_level: Option<u32>,
    pub account_type: Option<String>,
    pub active_only: bool,
}

impl AccountQuery {
    pub fn by_codes(codes: impl IntoIterator<Item = String>) -> Self {
        Self {
            codes: Some(codes.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn matches(&self, account: &Account) -> bool {
        self.codes
            .as_ref()
            .is_none_or(|codes| codes.iter().any(|c| c == &account.code))
            && self
                .from_code
                .as_deref()
                .is_none_or(|from| account.code.as_str() >= from)
            && self
                .to_code
                .as_deref()
                .is_none_or(|to| account.code.as_str() <= to)
            && self.max_level.is_none_or(|level| account.level <= level)
            && selective(&self.account_type)
                .is_none_or(|kind| same(account.account_type.as_deref(), kind))
            && (!self.active_only || account.active)
    }
}

/// General ledger ("Libro Diario") request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerFilter {
    pub fiscal_year: Option<i32>,
    /// Month 1-12; 0 means the whole year.
    pub period: Option<u32>,
    pub entry_kind: Option<String>,
    pub voucher_kind: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// Status to export. Unset, blank or "Todos" export approved vouchers.
    pub status: Option<String>,
}

impl LedgerFilter {
    fn period(&self) -> Option<u32> {
        self.period.filter(|p| *p != 0)
    }

    pub fn query(&self) -> VoucherQuery {
        let status = selective(&self.status)
            .map(str::to_uppercase)
            .unwrap_or_else(|| APPROVED.to_string());
        VoucherQuery {
            fiscal_year: self.fiscal_year,
            period: self.period(),
            entry_kind: self.entry_kind.clone(),
            voucher_kind: self.voucher_kind.clone(),
            date_from: self.date_from,
            date_to: self.date_to,
            status: Some(status),
        }
    }

    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            lines.push(format!("Período: {} al {}", display_date(from), display_date(to)));
        }
        if let Some(year) = self.fiscal_year {
            lines.push(format!("Gestión: {year}"));
        }
        if let Some(month) = self.period().and_then(month_name) {
            lines.push(format!("Mes: {month}"));
        }
        lines
    }
}

/// Trial balance ("Balance de Sumas y Saldos") request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialBalanceFilter {
    pub fiscal_year: i32,
    pub period: u32,
    /// Voucher status to aggregate; `None` or "Todos" aggregates all.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub from_account: Option<String>,
    #[serde(default)]
    pub to_account: Option<String>,
    #[serde(default)]
    pub max_level: Option<u32>,
    #[serde(default)]
    pub account_type: Option<String>,
    /// Keep accounts that had no movement in the period.
    #[serde(default = "include_zero_default")]
    pub include_zero: bool,
}

fn include_zero_default() -> bool {
    true
}

impl TrialBalanceFilter {
    /// Both year and month are required; the month must be 1-12.
    pub fn new(fiscal_year: Option<i32>, period: Option<u32>) -> Result<Self> {
        let (Some(fiscal_year), Some(period)) = (fiscal_year, period) else {
            return Err(PliegoError::InvalidRequest(
                "Los parámetros 'gestion' y 'periodo' son requeridos".into(),
            ));
        };
        let filter = Self {
            fiscal_year,
            period,
            status: None,
            from_account: None,
            to_account: None,
            max_level: None,
            account_type: None,
            include_zero: true,
        };
        filter.validate()?;
        Ok(filter)
    }

    pub fn validate(&self) -> Result<()> {
        if month_name(self.period).is_none() {
            return Err(PliegoError::InvalidRequest(format!(
                "Periodo inválido: {}",
                self.period
            )));
        }
        Ok(())
    }

    pub fn voucher_query(&self) -> VoucherQuery {
        VoucherQuery {
            fiscal_year: Some(self.fiscal_year),
            period: Some(self.period),
            status: selective(&self.status).map(str::to_uppercase),
            ..VoucherQuery::default()
        }
    }

    pub fn account_query(&self) -> AccountQuery {
        AccountQuery {
            codes: None,
            from_code: self.from_account.clone().filter(|c| !c.trim().is_empty()),
            to_code: self.to_account.clone().filter(|c| !c.trim().is_empty()),
            max_level: self.max_level,
            account_type: self.account_type.clone(),
            active_only: true,
        }
    }

    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Gestión: {}", self.fiscal_year)];
        if let Some(month) = month_name(self.period) {
            lines.push(format!("Mes: {month}"));
        }
        if let Some(status) = selective(&self.status) {
            lines.push(format!("Estado: {status}"));
        }
        lines
    }
}

/// Long origin labels for the filter line.
pub fn origin_label(origin: &str) -> &str {
    match origin {
        "registro_manual" => "Registro Manual",
        "cotizacion_aprobada" => "Cotización Aprobada",
        "cotizacion_rechazada" => "Cotización Rechazada",
        "cotizacion_editada" => "Cotización Editada",
        "cotizacion_eliminada" => "Cotización Eliminada",
        other => other,
    }
}

/// Short origin labels for table cells.
pub fn origin_short_label(origin: &str) -> &str {
    match origin {
        "registro_manual" => "Manual",
        "cotizacion_aprobada" => "Cot. Aprob.",
        "cotizacion_rechazada" => "Cot. Rech.",
        "cotizacion_editada" => "Cot. Edit.",
        "cotizacion_eliminada" => "Cot. Elim.",
        other => other,
    }
}

/// Stock history request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockHistoryFilter {
    pub item_type: Option<String>,
    pub origin: Option<String>,
    pub branch: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub item_id: Option<String>,
    /// Case-insensitive substring of the reference code.
    pub reference_code: Option<String>,
}

impl StockHistoryFilter {
    pub fn matches(&self, movement: &StockMovement) -> bool {
        let day = movement.date.date();
        selective(&self.item_type).is_none_or(|t| same(movement.item_type.as_deref(), t))
            && selective(&self.origin).is_none_or(|o| movement.origin == o)
            && selective(&self.branch).is_none_or(|b| same(movement.branch.as_deref(), b))
            && self.date_from.is_none_or(|from| day >= from)
            && self.date_to.is_none_or(|to| day <= to)
            && selective(&self.item_id).is_none_or(|id| movement.item_id.as_deref() == Some(id))
            && selective(&self.reference_code).is_none_or(|needle| {
                movement
                    .reference_code
                    .as_deref()
                    .is_some_and(|code| code.to_lowercase().contains(&needle.to_lowercase()))
            })
    }

    /// Active filters joined by " | ", then the date bounds. Each entry is a
    /// separate run so the caller can space them.
    pub fn summary_runs(&self) -> Vec<String> {
        let mut filters = Vec::new();
        if let Some(item_type) = selective(&self.item_type) {
            filters.push(format!("Tipo de Ítem: {item_type}"));
        }
        if let Some(origin) = selective(&self.origin) {
            filters.push(format!("Origen: {}", origin_label(origin)));
        }
        if let Some(branch) = selective(&self.branch) {
            filters.push(format!("Sucursal: {branch}"));
        }
        if let Some(reference) = selective(&self.reference_code) {
            filters.push(format!("Referencia: {reference}"));
        }

        let mut runs = Vec::new();
        if !filters.is_empty() {
            runs.push(filters.join(" | "));
        }
        if let Some(from) = self.date_from {
            runs.push(format!("Fecha desde: {}", display_date(from)));
        }
        if let Some(to) = self.date_to {
            runs.push(format!("Fecha hasta: {}", display_date(to)));
        }
        runs
    }
}

/// Inventory catalog request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogRequest {
    pub product_ids: Vec<String>,
    /// Name of the single selected product, for the file name.
    pub product_name: Option<String>,
    /// Selected category, for the file name.
    pub category: Option<String>,
}

impl CatalogRequest {
    pub fn validate(&self) -> Result<()> {
        if self.product_ids.iter().all(|id| id.trim().is_empty()) {
            return Err(PliegoError::InvalidRequest(
                "IDs de productos requeridos".into(),
            ));
        }
        Ok(())
    }
}
