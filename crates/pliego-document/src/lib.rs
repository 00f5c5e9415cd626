// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pliego-document — Layout engine for the Pliego report renderer.
//
// Provides locale amount formatting and Spanish amount-in-words, a measured
// table layout engine producing bands, a pagination state machine with
// repeated headers and a deferred footer pass, an lopdf-backed writer, and
// the catalog image normalizer.

pub mod format;
pub mod image;
pub mod pdf;

// Re-export the primary types so callers can use `pliego_document::Paginator` etc.
pub use format::{amount_in_words, format_amount, format_signed, to_words};
pub use image::{ImageNormalizer, NormalizedImage};
pub use pdf::{
    Band, Column, ColumnTotals, ColumnWidth, Document, DrawOp, FinishedDocument, FooterSpec,
    PageRegion, Paginator, PdfWriter, Row, TableSpec, TableStyle, TotalKind,
};
