// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Row types handed to the composer by a report source.
//
// Field names on the wire follow the ERP's column names, so an export of the
// store deserializes without a mapping layer.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Status a voucher must have to be exported on its own.
pub const APPROVED: &str = "APROBADO";

/// An accounting voucher header ("comprobante").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voucher {
    pub id: i64,
    #[serde(rename = "numero")]
    pub number: String,
    #[serde(rename = "fecha")]
    pub date: NaiveDate,
    /// Diario, Ingreso, Egreso, Traspaso...
    #[serde(rename = "tipo_comprobante", default)]
    pub kind: Option<String>,
    #[serde(rename = "tipo_asiento", default)]
    pub entry_kind: Option<String>,
    #[serde(rename = "concepto", default)]
    pub concept: Option<String>,
    #[serde(rename = "beneficiario", default)]
    pub beneficiary: Option<String>,
    /// Beneficiary tax id.
    #[serde(rename = "nit", default)]
    pub tax_id: Option<String>,
    #[serde(rename = "nro_cheque", default)]
    pub check_number: Option<String>,
    #[serde(rename = "estado")]
    pub status: String,
    /// Fiscal year ("gestión").
    #[serde(rename = "gestion", default)]
    pub fiscal_year: Option<i32>,
    /// Month 1-12 ("periodo").
    #[serde(rename = "periodo", default)]
    pub period: Option<u32>,
}

impl Voucher {
    pub fn is_approved(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case(APPROVED)
    }

    /// Voucher kind with the first letter upper-cased and the rest lower-cased,
    /// "Diario" when unset.
    pub fn kind_title(&self) -> String {
        let kind = self
            .kind
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .unwrap_or("Diario");
        let mut chars = kind.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
            None => String::new(),
        }
    }
}

/// One debit/credit line of a voucher ("comprobante_detalle").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoucherLine {
    #[serde(rename = "comprobante_id")]
    pub voucher_id: i64,
    #[serde(rename = "cuenta")]
    pub account: String,
    #[serde(rename = "auxiliar", default)]
    pub auxiliary: Option<String>,
    #[serde(rename = "glosa", default)]
    pub gloss: Option<String>,
    #[serde(rename = "debe_bs", default)]
    pub debit_bs: f64,
    #[serde(rename = "haber_bs", default)]
    pub credit_bs: f64,
    #[serde(rename = "debe_usd", default)]
    pub debit_usd: f64,
    #[serde(rename = "haber_usd", default)]
    pub credit_usd: f64,
    #[serde(rename = "orden", default)]
    pub order: i32,
}

impl VoucherLine {
    /// The gloss, when it has any visible text.
    pub fn gloss_text(&self) -> Option<&str> {
        self.gloss.as_deref().map(str::trim).filter(|g| !g.is_empty())
    }
}

/// A chart-of-accounts entry ("plan_cuentas").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "cuenta")]
    pub code: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "nivel", default)]
    pub level: u32,
    #[serde(rename = "tipo_cuenta", default)]
    pub account_type: Option<String>,
    #[serde(rename = "vigente", default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// An inventory product shown in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(rename = "codigo", default)]
    pub code: Option<String>,
    #[serde(rename = "nombre", default)]
    pub name: Option<String>,
    #[serde(rename = "categoria", default)]
    pub category: Option<String>,
    #[serde(rename = "unidad_medida", default)]
    pub unit: Option<String>,
    #[serde(rename = "precio_venta", default)]
    pub sale_price: Option<f64>,
    #[serde(rename = "disponibilidad", default)]
    pub availability: Option<String>,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    /// URL or data URI of the cover photo.
    #[serde(rename = "imagen_portada", default)]
    pub cover_image: Option<String>,
}

impl Product {
    /// Name used in titles and error messages: name, else code, else id.
    pub fn display_name(&self) -> &str {
        [self.name.as_deref(), self.code.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or(&self.id)
    }

    pub fn has_cover_image(&self) -> bool {
        self.cover_image
            .as_deref()
            .is_some_and(|reference| !reference.trim().is_empty())
    }
}

/// Packaging a manual stock entry was recorded in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Packaging {
    #[serde(rename = "cantidad_formato", default)]
    pub quantity: Option<String>,
    #[serde(rename = "formato_seleccionado", default)]
    pub format: Option<String>,
}

/// One stock movement ("historial_stock").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovement {
    #[serde(rename = "fecha", deserialize_with = "timestamp")]
    pub date: NaiveDateTime,
    #[serde(rename = "origen")]
    pub origin: String,
    #[serde(rename = "item_id", default)]
    pub item_id: Option<String>,
    #[serde(rename = "item_tipo", default)]
    pub item_type: Option<String>,
    #[serde(rename = "item_codigo", default)]
    pub item_code: Option<String>,
    #[serde(rename = "item_nombre", default)]
    pub item_name: Option<String>,
    #[serde(rename = "sucursal", default)]
    pub branch: Option<String>,
    #[serde(rename = "cantidad_udm", default)]
    pub quantity: f64,
    #[serde(rename = "unidad_medida", default)]
    pub unit: Option<String>,
    #[serde(rename = "formato", default)]
    pub packaging: Option<Packaging>,
    #[serde(rename = "impacto", default)]
    pub impact: f64,
    #[serde(rename = "stock_anterior", default)]
    pub stock_before: f64,
    #[serde(rename = "stock_nuevo", default)]
    pub stock_after: f64,
    #[serde(rename = "tipo_movimiento", default)]
    pub movement_type: Option<String>,
    #[serde(rename = "referencia_codigo", default)]
    pub reference_code: Option<String>,
    #[serde(rename = "usuario_nombre", default)]
    pub user_name: Option<String>,
}

impl StockMovement {
    /// Origin of entries registered by hand in the inventory screen.
    pub const MANUAL_ORIGIN: &'static str = "registro_manual";
}

/// Accept `2025-06-01T14:30:00`, RFC 3339 with an offset (kept as wall-clock
/// time) or a bare date at midnight.
fn timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(parsed);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.and_time(chrono::NaiveTime::MIN))
        .map_err(|_| serde::de::Error::custom(format!("unrecognised timestamp `{raw}`")))
}

/// Contact details of the user requesting a commercial export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FooterIdentity {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "numero", default)]
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voucher(kind: Option<&str>, status: &str) -> Voucher {
        Voucher {
            id: 1,
            number: "15".into(),
            date: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(),
            kind: kind.map(String::from),
            entry_kind: None,
            concept: None,
            beneficiary: None,
            tax_id: None,
            check_number: None,
            status: status.into(),
            fiscal_year: Some(2025),
            period: Some(3),
        }
    }

    #[test]
    fn kind_title_is_capitalised() {
        assert_eq!(voucher(Some("INGRESO"), APPROVED).kind_title(), "Ingreso");
        assert_eq!(voucher(Some("egreso"), APPROVED).kind_title(), "Egreso");
        assert_eq!(voucher(None, APPROVED).kind_title(), "Diario");
    }

    #[test]
    fn approval_ignores_case() {
        assert!(voucher(None, "aprobado").is_approved());
        assert!(!voucher(None, "BORRADOR").is_approved());
    }

    #[test]
    fn store_rows_deserialize() {
        let line: VoucherLine = serde_json::from_str(
            r#"{"comprobante_id": 7, "cuenta": "1.1.01", "glosa": "  ", "debe_bs": 300}"#,
        )
        .unwrap();
        assert_eq!(line.debit_bs, 300.0);
        assert_eq!(line.credit_usd, 0.0);
        assert!(line.gloss_text().is_none());

        let movement: StockMovement = serde_json::from_str(
            r#"{"fecha": "2025-06-01T14:30:00", "origen": "registro_manual",
                "formato": {"cantidad_formato": "2", "formato_seleccionado": "Cajas"}}"#,
        )
        .unwrap();
        assert_eq!(movement.packaging.unwrap().format.as_deref(), Some("Cajas"));
    }

    #[test]
    fn timestamps_accept_store_formats() {
        let parse = |raw: &str| {
            serde_json::from_str::<StockMovement>(&format!(
                r#"{{"fecha": "{raw}", "origen": "registro_manual"}}"#
            ))
            .map(|m| m.date.format("%d/%m/%Y %H:%M").to_string())
        };
        assert_eq!(parse("2025-06-01T14:30:00+00:00").unwrap(), "01/06/2025 14:30");
        assert_eq!(parse("2025-06-01 08:05:00").unwrap(), "01/06/2025 08:05");
        assert_eq!(parse("2025-06-01").unwrap(), "01/06/2025 00:00");
        assert!(parse("ayer").is_err());
    }

    #[test]
    fn product_display_name_falls_back() {
        let product: Product = serde_json::from_str(r#"{"id": "p-1", "codigo": "LON-01"}"#).unwrap();
        assert_eq!(product.display_name(), "LON-01");
        assert!(!product.has_cover_image());
    }
}
