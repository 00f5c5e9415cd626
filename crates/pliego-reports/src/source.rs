// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Report data sources.
//
// The composer never queries a store directly. A `ReportSource` hands it
// rows that are already filtered and sorted; `JsonSource` is the file-backed
// implementation used by the CLI and the tests.

use std::path::Path;

use pliego_core::error::{PliegoError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::filters::{AccountQuery, StockHistoryFilter, VoucherQuery};
use crate::models::{Account, FooterIdentity, Product, StockMovement, Voucher, VoucherLine};

/// Row supplier for every report.
pub trait ReportSource {
    /// One voucher by id; `NotFound` when it does not exist.
    fn voucher(&self, id: i64) -> Result<Voucher>;

    /// Vouchers matching `query`, ordered by date then number.
    fn vouchers(&self, query: &VoucherQuery) -> Result<Vec<Voucher>>;

    /// Lines of the given vouchers, ordered by voucher then line order.
    fn voucher_lines(&self, voucher_ids: &[i64]) -> Result<Vec<VoucherLine>>;

    /// Chart-of-accounts entries matching `query`, ordered by code.
    fn accounts(&self, query: &AccountQuery) -> Result<Vec<Account>>;

    /// Products in the order of `ids`. Unknown ids are skipped.
    fn products(&self, ids: &[String]) -> Result<Vec<Product>>;

    /// Stock movements matching `filter`, newest first.
    fn stock_movements(&self, filter: &StockHistoryFilter) -> Result<Vec<StockMovement>>;

    /// Contact details of the requesting user, for commercial footers.
    fn footer_identity(&self) -> Result<Option<FooterIdentity>>;
}

/// Everything a `JsonSource` serves, as one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    #[serde(rename = "comprobantes")]
    pub vouchers: Vec<Voucher>,
    #[serde(rename = "comprobante_detalle")]
    pub voucher_lines: Vec<VoucherLine>,
    #[serde(rename = "plan_cuentas")]
    pub accounts: Vec<Account>,
    #[serde(rename = "productos")]
    pub products: Vec<Product>,
    #[serde(rename = "historial_stock")]
    pub stock_movements: Vec<StockMovement>,
    #[serde(rename = "usuario")]
    pub user: Option<FooterIdentity>,
}

/// In-memory source over a [`Dataset`].
#[derive(Debug, Clone, Default)]
pub struct JsonSource {
    dataset: Dataset,
}

impl JsonSource {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }

    /// Read a dataset file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let source = Self::from_json(&raw)?;
        info!(
            vouchers = source.dataset.vouchers.len(),
            lines = source.dataset.voucher_lines.len(),
            accounts = source.dataset.accounts.len(),
            products = source.dataset.products.len(),
            movements = source.dataset.stock_movements.len(),
            "Dataset loaded"
        );
        Ok(source)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let dataset: Dataset = serde_json::from_str(raw)?;
        Ok(Self::new(dataset))
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

impl ReportSource for JsonSource {
    fn voucher(&self, id: i64) -> Result<Voucher> {
        self.dataset
            .vouchers
            .iter()
            .find(|v| v.id == id)
            .cloned()
            .ok_or_else(|| PliegoError::NotFound("Comprobante no encontrado".into()))
    }

    fn vouchers(&self, query: &VoucherQuery) -> Result<Vec<Voucher>> {
        let mut vouchers: Vec<Voucher> = self
            .dataset
            .vouchers
            .iter()
            .filter(|v| query.matches(v))
            .cloned()
            .collect();
        vouchers.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| natural_number(&a.number).cmp(&natural_number(&b.number)))
                .then_with(|| a.number.cmp(&b.number))
        });
        debug!(count = vouchers.len(), "Vouchers selected");
        Ok(vouchers)
    }

    fn voucher_lines(&self, voucher_ids: &[i64]) -> Result<Vec<VoucherLine>> {
        let mut lines: Vec<VoucherLine> = self
            .dataset
            .voucher_lines
            .iter()
            .filter(|line| voucher_ids.contains(&line.voucher_id))
            .cloned()
            .collect();
        lines.sort_by_key(|line| (line.voucher_id, line.order));
        Ok(lines)
    }

    fn accounts(&self, query: &AccountQuery) -> Result<Vec<Account>> {
        let mut accounts: Vec<Account> = self
            .dataset
            .accounts
            .iter()
            .filter(|a| query.matches(a))
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(accounts)
    }

    fn products(&self, ids: &[String]) -> Result<Vec<Product>> {
        Ok(ids
            .iter()
            .filter_map(|id| {
                let found = self.dataset.products.iter().find(|p| p.id == id.trim());
                if found.is_none() {
                    debug!(id = %id, "Product not in dataset, skipped");
                }
                found.cloned()
            })
            .collect())
    }

    fn stock_movements(&self, filter: &StockHistoryFilter) -> Result<Vec<StockMovement>> {
        let mut movements: Vec<StockMovement> = self
            .dataset
            .stock_movements
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();
        movements.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(movements)
    }

    fn footer_identity(&self) -> Result<Option<FooterIdentity>> {
        Ok(self.dataset.user.clone())
    }
}

/// Numeric value of a voucher number, so "9" sorts before "10".
fn natural_number(number: &str) -> Option<u64> {
    number.trim().parse().ok()
}
