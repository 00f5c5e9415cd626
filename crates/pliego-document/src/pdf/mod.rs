// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — document model, table layout, pagination, footer and writer.

pub mod document;
pub mod encoding;
pub mod footer;
pub mod metrics;
pub mod pagination;
pub mod style;
pub mod table;
pub mod writer;

pub use document::{
    Document, DrawOp, EmbeddedImage, FinishedDocument, ImageData, ImageId, Page,
};
pub use footer::FooterSpec;
pub use pagination::{PageRegion, PaginationState, Paginator};
pub use style::{Align, FontFace, StrokeStyle, TextStyle};
pub use table::{
    Band, BodyBorders, CellValue, Column, ColumnTotals, ColumnWidth, Row, TableSpec, TableStyle,
    TotalKind,
};
pub use writer::PdfWriter;
