// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Report composer — turns a request plus source rows into a finished PDF.
//
// Each report variant lives in its own module and returns a finished document
// and a file stem. This module owns what they share: the source, the brand
// configuration, the image normalizer, the logo and the error logging policy.

mod catalog;
mod ledger;
mod letterhead;
mod stock_history;
mod trial_balance;
mod voucher;

use std::collections::HashMap;

use chrono::NaiveDate;
use pliego_core::error::{PliegoError, Result};
use pliego_core::{AppConfig, ReportKind};
use pliego_document::ImageNormalizer;
use pliego_document::pdf::EmbeddedImage;
use pliego_document::pdf::metrics::{text_width_mm, truncate_chars};
use pliego_document::pdf::{FinishedDocument, TextStyle};
use tracing::{debug, error, info, instrument, warn};

use crate::filename::{content_disposition, normalize_file_name};
use crate::filters::{AccountQuery, CatalogRequest, LedgerFilter, StockHistoryFilter, TrialBalanceFilter};
use crate::models::{FooterIdentity, VoucherLine};
use crate::source::ReportSource;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// One export request.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportRequest {
    Voucher { id: i64 },
    Ledger(LedgerFilter),
    TrialBalance(TrialBalanceFilter),
    Catalog(CatalogRequest),
    StockHistory(StockHistoryFilter),
}

impl ReportRequest {
    pub fn kind(&self) -> ReportKind {
        match self {
            Self::Voucher { .. } => ReportKind::Voucher,
            Self::Ledger(_) => ReportKind::Ledger,
            Self::TrialBalance(_) => ReportKind::TrialBalance,
            Self::Catalog(_) => ReportKind::InventoryCatalog,
            Self::StockHistory(_) => ReportKind::StockHistory,
        }
    }
}

/// PDF bytes with the name they should be downloaded under.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedReport {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: &'static str,
}

impl ExportedReport {
    pub fn content_disposition(&self) -> String {
        content_disposition(&self.file_name)
    }
}

/// What a variant hands back before serialization.
pub(crate) struct Rendered {
    pub document: FinishedDocument,
    pub stem: String,
}

pub struct ReportComposer<S> {
    source: S,
    config: AppConfig,
    images: ImageNormalizer,
    today: NaiveDate,
}

impl<S: ReportSource> ReportComposer<S> {
    pub fn new(source: S, config: AppConfig) -> Result<Self> {
        let images = ImageNormalizer::new(config.images.clone())?;
        Ok(Self {
            source,
            config,
            images,
            today: chrono::Local::now().date_naive(),
        })
    }

    /// Pin the date used in file names and footers.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Build the report for `request`. Nothing is returned unless the whole
    /// document rendered.
    #[instrument(skip_all, fields(kind = ?request.kind()))]
    pub async fn export(&self, request: &ReportRequest) -> Result<ExportedReport> {
        let kind = request.kind();
        let logo = self.load_logo();

        let rendered = match request {
            ReportRequest::Voucher { id } => voucher::render(self, logo.as_ref(), *id),
            ReportRequest::Ledger(filter) => ledger::render(self, logo.as_ref(), filter),
            ReportRequest::TrialBalance(filter) => trial_balance::render(self, logo.as_ref(), filter),
            ReportRequest::Catalog(request) => catalog::render(self, logo.as_ref(), request).await,
            ReportRequest::StockHistory(filter) => stock_history::render(self, logo.as_ref(), filter),
        }
        .and_then(|rendered| {
            let bytes = rendered.document.to_pdf()?;
            Ok((rendered, bytes))
        });

        match rendered {
            Ok((rendered, bytes)) => {
                let file_name = format!("{}.pdf", normalize_file_name(&rendered.stem));
                info!(
                    pages = rendered.document.page_count(),
                    bytes = bytes.len(),
                    file = %file_name,
                    "Report exported"
                );
                Ok(ExportedReport {
                    bytes,
                    file_name,
                    content_type: PDF_CONTENT_TYPE,
                })
            }
            Err(err) => {
                match &err {
                    PliegoError::EmptyDataset(message) => info!(%message, "Nothing to export"),
                    PliegoError::RenderFailure(_) | PliegoError::PdfError(_) => {
                        error!(?kind, error = %err, "Report rendering failed")
                    }
                    other => warn!(error = %other, "Report export rejected"),
                }
                Err(err)
            }
        }
    }

    /// The letterhead logo, read once per request. A missing or unreadable
    /// file only costs the logo.
    fn load_logo(&self) -> Option<EmbeddedImage> {
        let path = self.config.brand.logo_path.as_ref()?;
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Logo not readable, omitted");
                return None;
            }
        };
        match EmbeddedImage::from_encoded(bytes) {
            Ok(logo) => Some(logo),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Logo not decodable, omitted");
                None
            }
        }
    }

    /// Footer contact details. A failed lookup leaves the footer without them.
    fn footer_identity(&self) -> Option<FooterIdentity> {
        match self.source.footer_identity() {
            Ok(identity) => identity,
            Err(err) => {
                debug!(error = %err, "Footer identity lookup failed");
                None
            }
        }
    }

    /// Chart-of-accounts descriptions for every account used by `lines`.
    fn account_descriptions(&self, lines: &[VoucherLine]) -> Result<HashMap<String, String>> {
        let mut codes: Vec<String> = lines.iter().map(|line| line.account.clone()).collect();
        codes.sort();
        codes.dedup();
        let accounts = self.source.accounts(&AccountQuery::by_codes(codes))?;
        Ok(accounts
            .into_iter()
            .filter(|account| !account.description.trim().is_empty())
            .map(|account| (account.code, account.description))
            .collect())
    }
}

/// `text`, shortened with "..." until it fits in `max_width` millimetres.
pub(crate) fn fit_text(text: &str, max_width: f64, style: TextStyle) -> String {
    let fits = |candidate: &str| text_width_mm(candidate, style.face, style.size_pt) <= max_width;
    if fits(text) {
        return text.to_string();
    }
    let mut keep = text.chars().count();
    while keep > 3 {
        keep -= 1;
        let candidate = truncate_chars(text, keep);
        if fits(&candidate) {
            return candidate;
        }
    }
    String::new()
}

/// At most `max_lines` wrapped lines; a cut is marked on the last one kept.
pub(crate) fn clamp_lines(
    mut lines: Vec<String>,
    max_lines: usize,
    max_width: f64,
    style: TextStyle,
) -> Vec<String> {
    if lines.len() <= max_lines {
        return lines;
    }
    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
        *last = fit_text(&format!("{last}..."), max_width, style);
    }
    lines
}

/// Non-blank text or a dash.
pub(crate) fn or_dash(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("-")
        .to_string()
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use pliego_core::human_errors::humanize_error;

    #[tokio::test]
    async fn exports_carry_name_and_content_type() {
        let report = composer()
            .export(&ReportRequest::Voucher { id: 1 })
            .await
            .unwrap();
        assert_eq!(report.file_name, "comprobante_Ingreso_15.pdf");
        assert_eq!(report.content_type, "application/pdf");
        assert!(report.bytes.starts_with(b"%PDF"));
        assert_eq!(page_count(&report.bytes), 1);
        assert!(report.content_disposition().starts_with("attachment; filename=\"comprobante_Ingreso_15.pdf\""));
    }

    #[tokio::test]
    async fn empty_dataset_maps_to_bad_request() {
        let filter = LedgerFilter {
            fiscal_year: Some(1999),
            ..LedgerFilter::default()
        };
        let err = composer()
            .export(&ReportRequest::Ledger(filter))
            .await
            .unwrap_err();
        assert!(matches!(err, PliegoError::EmptyDataset(_)));
        assert_eq!(humanize_error(&err).status, 400);
    }

    #[tokio::test]
    async fn unreadable_logo_is_omitted() {
        let mut config = AppConfig::default();
        config.brand.logo_path = Some("/nonexistent/logo.jpg".into());
        let composer = ReportComposer::new(crate::source::JsonSource::from_json(DATASET).unwrap(), config)
            .unwrap()
            .with_today(today());
        assert!(composer.load_logo().is_none());
        assert!(composer.export(&ReportRequest::Voucher { id: 1 }).await.is_ok());
    }

    #[test]
    fn fit_text_truncates_until_it_fits() {
        let style = TextStyle::bold(8.0);
        let long = "Cobro por alquiler de vallas publicitarias en la zona sur de la ciudad";
        let fitted = fit_text(long, 40.0, style);
        assert!(fitted.ends_with("..."));
        assert!(text_width_mm(&fitted, style.face, style.size_pt) <= 40.0);
        assert_eq!(fit_text("Corto", 40.0, style), "Corto");
    }

    #[test]
    fn descriptions_skip_blank_entries() {
        let composer = composer();
        let lines = composer.source().voucher_lines(&[1]).unwrap();
        let descriptions = composer.account_descriptions(&lines).unwrap();
        assert_eq!(descriptions.get("1.1.01").map(String::as_str), Some("Caja moneda nacional"));
        assert_eq!(descriptions.len(), 2);
    }
}
