// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pliego-reports — The concrete reports: accounting vouchers, the general
// ledger, the trial balance, the inventory catalog and the stock history.
//
// Rows come from a `ReportSource`; the composer lays them out with the
// pliego-document engine and returns PDF bytes under a download name.

pub mod composer;
pub mod filename;
pub mod filters;
pub mod models;
pub mod source;

pub use composer::{ExportedReport, PDF_CONTENT_TYPE, ReportComposer, ReportRequest};
pub use filters::{CatalogRequest, LedgerFilter, StockHistoryFilter, TrialBalanceFilter};
pub use source::{Dataset, JsonSource, ReportSource};
