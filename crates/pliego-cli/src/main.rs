// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pliego — render one ERP report to PDF.
//
// Entry point. Initialises logging, loads the configuration and the JSON
// dataset, exports the requested report and writes it under its download
// name. Failures are printed to stderr as the JSON error payload.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use pliego_core::AppConfig;
use pliego_core::error::Result;
use pliego_core::human_errors::humanize_error;
use pliego_reports::{
    CatalogRequest, JsonSource, LedgerFilter, ReportComposer, ReportRequest, StockHistoryFilter,
    TrialBalanceFilter,
};

#[derive(Parser)]
#[command(name = "pliego")]
#[command(version)]
#[command(about = "Render accounting and inventory reports to PDF", long_about = None)]
struct Cli {
    /// JSON dataset to read rows from
    #[arg(long, value_name = "FILE", global = true, default_value = "dataset.json")]
    data: PathBuf,

    /// JSON configuration (brand identity, image limits)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Directory the PDF is written to
    #[arg(long, value_name = "DIR", global = true, default_value = ".")]
    out: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// One approved accounting voucher
    Voucher {
        #[arg(long)]
        id: i64,
    },

    /// General ledger ("Libro Diario")
    Ledger {
        #[arg(long)]
        year: Option<i32>,
        /// Month 1-12, 0 for the whole year
        #[arg(long)]
        period: Option<u32>,
        #[arg(long)]
        entry_kind: Option<String>,
        #[arg(long)]
        voucher_kind: Option<String>,
        #[arg(long, value_name = "YYYY-MM-DD")]
        from: Option<NaiveDate>,
        #[arg(long, value_name = "YYYY-MM-DD")]
        to: Option<NaiveDate>,
        #[arg(long)]
        status: Option<String>,
    },

    /// Trial balance ("Balance de Sumas y Saldos")
    TrialBalance {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        period: Option<u32>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        from_account: Option<String>,
        #[arg(long)]
        to_account: Option<String>,
        #[arg(long)]
        max_level: Option<u32>,
        #[arg(long)]
        account_type: Option<String>,
        /// Leave out accounts without movements
        #[arg(long)]
        skip_zero: bool,
    },

    /// Product catalog, one page per product
    Catalog {
        /// Product id (repeatable)
        #[arg(long = "product", value_name = "ID", required = true)]
        products: Vec<String>,
        /// Name of the single selected product, used in the file name
        #[arg(long)]
        product_name: Option<String>,
        /// Selected category, used in the file name
        #[arg(long)]
        category: Option<String>,
    },

    /// Stock movement history
    StockHistory {
        #[arg(long)]
        item_type: Option<String>,
        #[arg(long)]
        origin: Option<String>,
        #[arg(long)]
        branch: Option<String>,
        #[arg(long, value_name = "YYYY-MM-DD")]
        from: Option<NaiveDate>,
        #[arg(long, value_name = "YYYY-MM-DD")]
        to: Option<NaiveDate>,
        #[arg(long)]
        item_id: Option<String>,
        #[arg(long)]
        reference: Option<String>,
    },
}

impl Command {
    fn into_request(self) -> Result<ReportRequest> {
        Ok(match self {
            Self::Voucher { id } => ReportRequest::Voucher { id },
            Self::Ledger {
                year,
                period,
                entry_kind,
                voucher_kind,
                from,
                to,
                status,
            } => ReportRequest::Ledger(LedgerFilter {
                fiscal_year: year,
                period,
                entry_kind,
                voucher_kind,
                date_from: from,
                date_to: to,
                status,
            }),
            Self::TrialBalance {
                year,
                period,
                status,
                from_account,
                to_account,
                max_level,
                account_type,
                skip_zero,
            } => ReportRequest::TrialBalance(TrialBalanceFilter {
                status,
                from_account,
                to_account,
                max_level,
                account_type,
                include_zero: !skip_zero,
                ..TrialBalanceFilter::new(year, period)?
            }),
            Self::Catalog {
                products,
                product_name,
                category,
            } => ReportRequest::Catalog(CatalogRequest {
                product_ids: products,
                product_name,
                category,
            }),
            Self::StockHistory {
                item_type,
                origin,
                branch,
                from,
                to,
                item_id,
                reference,
            } => ReportRequest::StockHistory(StockHistoryFilter {
                item_type,
                origin,
                branch,
                date_from: from,
                date_to: to,
                item_id,
                reference_code: reference,
            }),
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", humanize_error(&err).to_json());
            ExitCode::FAILURE
        }
    }
}

/// Export the requested report and return the path it was written to.
async fn run(cli: Cli) -> Result<PathBuf> {
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let request = cli.command.into_request()?;
    let source = JsonSource::load(&cli.data)?;
    let composer = ReportComposer::new(source, config)?;
    let report = composer.export(&request).await?;
    write_report(&cli.out, &report.file_name, &report.bytes)
}

fn write_report(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    std::fs::write(&path, bytes)?;
    tracing::info!(path = %path.display(), "Report written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pliego_core::PliegoError;

    const DATASET: &str = r#"{
        "comprobantes": [
            {"id": 7, "numero": "3", "fecha": "2025-05-02", "tipo_comprobante": "egreso",
             "estado": "APROBADO", "gestion": 2025, "periodo": 5}
        ],
        "comprobante_detalle": [
            {"comprobante_id": 7, "cuenta": "5.1", "orden": 1, "debe_bs": 1000},
            {"comprobante_id": 7, "cuenta": "1.1", "orden": 2, "haber_bs": 1000}
        ],
        "plan_cuentas": [
            {"cuenta": "1.1", "descripcion": "Caja", "nivel": 2},
            {"cuenta": "5.1", "descripcion": "Gastos de publicidad", "nivel": 2}
        ]
    }"#;

    #[test]
    fn trial_balance_flags_build_the_filter() {
        let cli = Cli::try_parse_from([
            "pliego",
            "trial-balance",
            "--year",
            "2025",
            "--period",
            "5",
            "--skip-zero",
        ])
        .unwrap();
        match cli.command.into_request().unwrap() {
            ReportRequest::TrialBalance(filter) => {
                assert_eq!(filter.fiscal_year, 2025);
                assert_eq!(filter.period, 5);
                assert!(!filter.include_zero);
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn trial_balance_needs_year_and_period() {
        let cli = Cli::try_parse_from(["pliego", "trial-balance", "--year", "2025"]).unwrap();
        assert!(matches!(
            cli.command.into_request(),
            Err(PliegoError::InvalidRequest(_))
        ));
    }

    #[test]
    fn catalog_requires_a_product() {
        assert!(Cli::try_parse_from(["pliego", "catalog"]).is_err());
        let cli = Cli::try_parse_from(["pliego", "catalog", "--product", "a", "--product", "b"]).unwrap();
        match cli.command.into_request().unwrap() {
            ReportRequest::Catalog(request) => assert_eq!(request.product_ids, vec!["a", "b"]),
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[tokio::test]
    async fn writes_the_voucher_under_its_name() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("dataset.json");
        std::fs::write(&data, DATASET).unwrap();
        let out = dir.path().join("reportes");
        let cli = Cli::try_parse_from([
            "pliego",
            "voucher",
            "--id",
            "7",
            "--data",
            data.to_str().unwrap(),
            "--out",
            out.to_str().unwrap(),
        ])
        .unwrap();
        let path = run(cli).await.unwrap();
        assert_eq!(path, out.join("comprobante_Egreso_3.pdf"));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(lopdf::Document::load_mem(&bytes).unwrap().get_pages().len(), 1);
    }

    #[tokio::test]
    async fn missing_dataset_is_an_io_error() {
        let cli = Cli::try_parse_from([
            "pliego",
            "ledger",
            "--data",
            "/nonexistent/dataset.json",
        ])
        .unwrap();
        assert!(matches!(run(cli).await, Err(PliegoError::Io(_))));
    }
}
