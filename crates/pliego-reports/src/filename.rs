// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Download file names and the Content-Disposition header that carries them.

use chrono::NaiveDate;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Reduce `text` to a portable file name.
///
/// Accents are stripped to their base letter (`ñ` to `n`, `ç` to `c`), any
/// character outside `[A-Za-z0-9 -_.]` is dropped and whitespace runs
/// collapse to one space with the ends trimmed.
pub fn normalize_file_name(text: &str) -> String {
    let kept: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_' | '.') || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `dd-mm-yyyy` stamp used in dated file names.
pub fn date_stamp(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

/// `attachment` header value with an ASCII fallback name and the RFC 5987
/// UTF-8 form.
pub fn content_disposition(file_name: &str) -> String {
    let ascii = normalize_file_name(file_name);
    let encoded = urlencoding::encode(file_name);
    format!("attachment; filename=\"{ascii}\"; filename*=UTF-8''{encoded}")
}

/// File stem of a single voucher export.
pub fn voucher_stem(kind: &str, number: &str) -> String {
    format!("comprobante_{kind}_{number}")
}

pub fn ledger_stem(today: NaiveDate) -> String {
    format!("libro_diario_{}", date_stamp(today))
}

pub fn trial_balance_stem(fiscal_year: i32, period: u32) -> String {
    format!("balance_sumas_saldos_{fiscal_year}_{period}")
}

pub fn stock_history_stem(today: NaiveDate) -> String {
    format!("historial_stock_{}", date_stamp(today))
}

/// "<product> - <date>", "Catalogo de <category> - <date>" or the general
/// catalog name, in that order of preference.
pub fn catalog_stem(product: Option<&str>, category: Option<&str>, today: NaiveDate) -> String {
    let stamp = date_stamp(today);
    let product = product.map(str::trim).filter(|p| !p.is_empty());
    let category = category.map(str::trim).filter(|c| !c.is_empty());
    match (product, category) {
        (Some(product), _) => format!("{product} - {stamp}"),
        (None, Some(category)) => format!("Catalogo de {category} - {stamp}"),
        (None, None) => format!("Catalogo de productos - {stamp}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 4).unwrap()
    }

    #[test]
    fn accents_are_stripped() {
        assert_eq!(normalize_file_name("Católogo Ñandú"), "Catologo Nandu");
        assert_eq!(normalize_file_name("Façade  Ärger"), "Facade Arger");
    }

    #[test]
    fn disallowed_characters_are_dropped() {
        assert_eq!(
            normalize_file_name("  Lona 3x2 / 50% (blanca)!.pdf "),
            "Lona 3x2 50 blanca.pdf"
        );
        assert_eq!(normalize_file_name("a\t\tb"), "a b");
    }

    #[test]
    fn underscores_survive_at_the_end() {
        assert_eq!(normalize_file_name("reporte__  "), "reporte__");
        assert_eq!(normalize_file_name("comprobante_Diario_"), "comprobante_Diario_");
    }

    #[test]
    fn disposition_carries_both_names() {
        let header = content_disposition("Catálogo de Vinilos - 04-07-2025.pdf");
        assert_eq!(
            header,
            "attachment; filename=\"Catalogo de Vinilos - 04-07-2025.pdf\"; \
             filename*=UTF-8''Cat%C3%A1logo%20de%20Vinilos%20-%2004-07-2025.pdf"
        );
    }

    #[test]
    fn catalog_names_prefer_product_then_category() {
        assert_eq!(
            catalog_stem(Some("Lona Front"), Some("Lonas"), today()),
            "Lona Front - 04-07-2025"
        );
        assert_eq!(
            catalog_stem(Some("  "), Some("Lonas"), today()),
            "Catalogo de Lonas - 04-07-2025"
        );
        assert_eq!(
            catalog_stem(None, None, today()),
            "Catalogo de productos - 04-07-2025"
        );
    }

    #[test]
    fn accounting_stems() {
        assert_eq!(voucher_stem("Ingreso", "15"), "comprobante_Ingreso_15");
        assert_eq!(ledger_stem(today()), "libro_diario_04-07-2025");
        assert_eq!(trial_balance_stem(2025, 6), "balance_sumas_saldos_2025_6");
        assert_eq!(stock_history_stem(today()), "historial_stock_04-07-2025");
    }
}
