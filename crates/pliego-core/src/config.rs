// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Report configuration: letterhead identity and image pipeline limits.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::Rgb;

/// Top-level settings for a rendering run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub brand: BrandConfig,
    pub images: ImageConfig,
}

impl AppConfig {
    /// Load settings from a JSON file. Missing fields keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }
}

/// Company identity printed in letterheads and footers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandConfig {
    /// Legal name shown bold in the letterhead.
    pub legal_name: String,
    /// Short trade name used in the footer ("<year> <trade name>").
    pub trade_name: String,
    /// Address lines right-aligned under the legal name.
    pub address_lines: Vec<String>,
    pub website: String,
    /// Address shown in accounting report footers.
    pub accounting_email: String,
    /// Address that replaces any of `masked_emails` in commercial footers.
    pub commercial_email: String,
    /// Personal addresses that must never be printed.
    pub masked_emails: Vec<String>,
    /// Tax identifier (NIT).
    pub tax_id: String,
    /// Accent colour for footers and grand-total rows.
    pub accent: Rgb,
    /// JPEG logo drawn in letterheads.
    pub logo_path: Option<PathBuf>,
    /// Currency named in the amount-in-words line.
    pub currency_name: String,
    /// Exchange-rate caption printed on vouchers.
    pub exchange_rate_label: String,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            legal_name: "Publicidad Vial Imagen S.R.L.".into(),
            trade_name: "Publicidad Vial Imagen".into(),
            address_lines: vec![
                "C. Nicolás Acosta Esq. Pedro Blanco".into(),
                "(Alto San Pedro) N° 1471".into(),
                "La Paz".into(),
            ],
            website: "publicidadvialimagen.com".into(),
            accounting_email: "contabilidad@publicidadvialimagen.com".into(),
            commercial_email: "comercial@publicidadvialimagen.com".into(),
            masked_emails: Vec::new(),
            tax_id: "164692025".into(),
            accent: Rgb::new(190, 8, 18),
            logo_path: None,
            currency_name: "Bolivianos".into(),
            exchange_rate_label: "1$ USD = Bs 6.96".into(),
        }
    }
}

impl BrandConfig {
    /// E-mail to print for a session user, replacing masked personal
    /// addresses with the commercial one. Blank input yields `None`.
    pub fn footer_email(&self, email: Option<&str>) -> Option<String> {
        let email = email.map(str::trim).filter(|e| !e.is_empty())?;
        let lower = email.to_lowercase();
        if self
            .masked_emails
            .iter()
            .any(|masked| masked.trim().to_lowercase() == lower)
        {
            return Some(self.commercial_email.clone());
        }
        Some(email.to_string())
    }
}

/// Limits for catalog image ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Upper bound for one image fetch, in milliseconds.
    pub fetch_timeout_ms: u64,
    /// Neither side of a normalized image exceeds this many pixels.
    pub max_dimension: u32,
    /// JPEG quality (1-100) for recompressed images.
    pub jpeg_quality: u8,
    /// `User-Agent` sent with image requests.
    pub user_agent: String,
    /// Honour `HTTP_PROXY`-style environment variables.
    pub use_system_proxy: bool,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 10_000,
            max_dimension: 1200,
            jpeg_quality: 75,
            user_agent: "Mozilla/5.0 (compatible; Pliego/0.3; +report-export)".into(),
            use_system_proxy: true,
        }
    }
}

impl ImageConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "brand": {{ "tax_id": "999" }}, "images": {{ "jpeg_quality": 60 }} }}"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.brand.tax_id, "999");
        assert_eq!(config.brand.currency_name, "Bolivianos");
        assert_eq!(config.images.jpeg_quality, 60);
        assert_eq!(config.images.max_dimension, 1200);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AppConfig::load("/nonexistent/pliego.json").unwrap_err();
        assert!(matches!(err, crate::PliegoError::Io(_)));
    }

    #[test]
    fn masked_email_becomes_commercial() {
        let brand = BrandConfig {
            masked_emails: vec!["Someone@Example.com".into()],
            ..BrandConfig::default()
        };
        assert_eq!(
            brand.footer_email(Some(" someone@example.com ")).as_deref(),
            Some("comercial@publicidadvialimagen.com")
        );
        assert_eq!(
            brand.footer_email(Some("sales@example.com")).as_deref(),
            Some("sales@example.com")
        );
        assert_eq!(brand.footer_email(Some("   ")), None);
        assert_eq!(brand.footer_email(None), None);
    }
}
