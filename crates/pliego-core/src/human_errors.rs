// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error payloads for the export boundary.
//
// Every error is mapped to a plain-language message and an HTTP-style status.
// 400-class errors are actionable by the person who requested the report;
// 500-class errors mean the engine itself failed.

use serde::Serialize;

use crate::error::PliegoError;

/// The structured payload returned instead of document bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HumanError {
    /// Plain-language summary for the requester.
    pub message: String,
    /// HTTP-style status code.
    pub status: u16,
    /// Whether asking again unchanged could succeed.
    pub retriable: bool,
}

impl HumanError {
    /// True for 400-class conditions the requester can fix.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Serialize to the JSON body the boundary sends.
    pub fn to_json(&self) -> String {
        serde_json::json!({ "error": self.message, "status": self.status }).to_string()
    }
}

/// Convert a `PliegoError` into the payload the boundary returns.
pub fn humanize_error(err: &PliegoError) -> HumanError {
    match err {
        // -- Requester-actionable --
        PliegoError::EmptyDataset(detail) => HumanError {
            message: non_empty(detail, "No hay datos para exportar con los filtros seleccionados"),
            status: 400,
            retriable: false,
        },

        PliegoError::MissingResource(detail) | PliegoError::InvalidRequest(detail) => HumanError {
            message: detail.clone(),
            status: 400,
            retriable: false,
        },

        PliegoError::NotFound(detail) => HumanError {
            message: detail.clone(),
            status: 404,
            retriable: false,
        },

        // -- Engine failures --
        PliegoError::InvalidAmount(_) => HumanError {
            message: "Un importe del documento no es válido y el PDF no pudo generarse".into(),
            status: 500,
            retriable: false,
        },

        PliegoError::RenderFailure(_) | PliegoError::PdfError(_) => HumanError {
            message: "Error al generar el PDF".into(),
            status: 500,
            retriable: false,
        },

        // Normally recovered before reaching the boundary.
        PliegoError::MissingAsset(_) => HumanError {
            message: "No se pudo cargar una imagen del documento".into(),
            status: 500,
            retriable: true,
        },

        PliegoError::Source(_) => HumanError {
            message: "Error al obtener los datos del informe".into(),
            status: 500,
            retriable: true,
        },

        PliegoError::Io(_) | PliegoError::Serialization(_) => HumanError {
            message: "Error interno al preparar el documento".into(),
            status: 500,
            retriable: true,
        },
    }
}

fn non_empty(detail: &str, fallback: &str) -> String {
    if detail.trim().is_empty() {
        fallback.to_string()
    } else {
        detail.to_string()
    }
}
