// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pagination — the vertical cursor and the page-break state machine.
//
// The paginator owns the document being built. Every band goes through
// `place`, which checks the overflow threshold first; on overflow the open
// side borders of the current table are closed, a page is appended, the
// cursor returns to the top margin and the table header is drawn again.

use pliego_core::PageFormat;
use pliego_core::error::{PliegoError, Result};
use tracing::{debug, warn};

use super::document::{Document, DocumentCheckpoint, DrawOp, FinishedDocument};
use super::footer::FooterSpec;
use super::style::StrokeStyle;
use super::table::{Band, BodyBorders, TableSpec};

/// Where content may go on a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRegion {
    /// Cursor position after a page break.
    pub top: f64,
    /// Nothing may extend below this coordinate.
    pub threshold: f64,
}

impl PageRegion {
    /// Region from the top margin down to the overflow threshold.
    pub fn new(top: f64, threshold: f64) -> Self {
        Self { top, threshold }
    }

    /// Vertical room on a fresh page.
    pub fn usable_height(&self) -> f64 {
        self.threshold - self.top
    }
}

/// Phase of the paginator between two draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    /// Bands go onto the current page.
    Drawing,
    /// A page was appended and its table header is being repeated.
    PageBreak,
}

/// A table whose header repeats on every page it spans.
#[derive(Debug, Clone)]
struct ActiveTable {
    header: Band,
    left: f64,
    right: f64,
    sides: Option<StrokeStyle>,
    segment_top: f64,
}

/// Restore point for [`Paginator::rollback`].
#[derive(Debug, Clone)]
pub struct Checkpoint {
    document: DocumentCheckpoint,
    cursor: f64,
    table: Option<ActiveTable>,
}

/// Builds a [`Document`] top to bottom, breaking pages at the region's
/// threshold and repeating the open table's header on each new page.
///
/// ```
/// use pliego_core::PageFormat;
/// use pliego_document::pdf::{PageRegion, PaginationState, Paginator};
///
/// let mut pager = Paginator::new("Libro Diario", PageFormat::A4_PORTRAIT, PageRegion::new(20.0, 270.0), 40.0);
/// assert_eq!(pager.region().usable_height(), 250.0);
/// pager.new_page();
/// assert_eq!(pager.page_count(), 2);
/// assert_eq!(pager.cursor(), 20.0);
/// assert_eq!(pager.state(), PaginationState::Drawing);
/// ```
#[derive(Debug)]
pub struct Paginator {
    document: Document,
    region: PageRegion,
    cursor: f64,
    state: PaginationState,
    table: Option<ActiveTable>,
}

impl Paginator {
    /// Start a document whose first page's cursor begins at `start`.
    pub fn new(title: impl Into<String>, format: PageFormat, region: PageRegion, start: f64) -> Self {
        Self {
            document: Document::new(title, format),
            region,
            cursor: start,
            state: PaginationState::Drawing,
            table: None,
        }
    }

    /// Current y position, millimetres from the page top.
    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    /// Phase after the last draw or break.
    pub fn state(&self) -> PaginationState {
        self.state
    }

    /// Region the page breaks are computed against.
    pub fn region(&self) -> PageRegion {
        self.region
    }

    /// Pages created so far, the current one included.
    pub fn page_count(&self) -> usize {
        self.document.page_count()
    }

    /// Page size shared by every page.
    pub fn format(&self) -> PageFormat {
        self.document.format()
    }

    /// Mutable access for registering images.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Move the cursor down without drawing.
    pub fn advance(&mut self, dy: f64) {
        self.cursor += dy;
    }

    /// Jump the cursor to an absolute position without drawing.
    pub fn set_cursor(&mut self, y: f64) {
        self.cursor = y;
    }

    /// Draw an op at absolute page coordinates; the cursor does not move.
    pub fn draw(&mut self, op: DrawOp) {
        self.document.push(op);
    }

    /// [`draw`](Self::draw) for each op in order.
    pub fn draw_all(&mut self, ops: impl IntoIterator<Item = DrawOp>) {
        self.document.extend(ops);
    }

    /// Place a band at the cursor, breaking the page first if it would
    /// cross the threshold.
    pub fn place(&mut self, band: &Band) -> Result<()> {
        self.ensure_space(band.height())?;
        self.document.extend(band.placed_at(self.cursor));
        self.cursor += band.height();
        Ok(())
    }

    /// Break the page unless `height` more millimetres fit below the cursor.
    /// Returns whether a break happened.
    pub fn ensure_space(&mut self, height: f64) -> Result<bool> {
        let header = self.table.as_ref().map_or(0.0, |t| t.header.height());
        if height + header > self.region.usable_height() {
            return Err(PliegoError::RenderFailure(format!(
                "band of {height:.1} mm cannot fit on a page with {:.1} mm of room",
                self.region.usable_height() - header
            )));
        }
        if self.cursor + height <= self.region.threshold {
            return Ok(false);
        }
        self.break_page();
        Ok(true)
    }

    /// Keep the next `height` millimetres on one page.
    pub fn keep_together(&mut self, height: f64) -> Result<bool> {
        self.ensure_space(height)
    }

    /// Unconditionally start a new page.
    pub fn new_page(&mut self) {
        self.break_page();
    }

    fn break_page(&mut self) {
        self.state = PaginationState::PageBreak;
        self.close_side_segment();
        self.document.add_page();
        self.cursor = self.region.top;

        if let Some(table) = self.table.as_mut() {
            let header = table.header.clone();
            self.document.extend(header.placed_at(self.cursor));
            self.cursor += header.height();
            table.segment_top = self.cursor;
        }
        debug!(
            page = self.document.page_count(),
            cursor = self.cursor,
            "Page break"
        );
        self.state = PaginationState::Drawing;
    }

    /// Draw the table header and repeat it after every break until
    /// [`end_table`](Self::end_table).
    pub fn begin_table(&mut self, table: &TableSpec) -> Result<()> {
        if self.table.is_some() {
            warn!("Table started while another was open, closing it");
            self.end_table();
        }
        let header = table.header_band();
        self.place(&header)?;
        let sides = (table.style().body_borders == BodyBorders::Sides).then_some(table.style().border);
        self.table = Some(ActiveTable {
            header,
            left: table.left(),
            right: table.right(),
            sides,
            segment_top: self.cursor,
        });
        Ok(())
    }

    /// Close the open table, drawing its final side-border segment.
    pub fn end_table(&mut self) {
        self.close_side_segment();
        self.table = None;
    }

    fn close_side_segment(&mut self) {
        let Some(table) = self.table.as_ref() else {
            return;
        };
        let Some(stroke) = table.sides else {
            return;
        };
        if self.cursor > table.segment_top {
            let (top, bottom) = (table.segment_top, self.cursor);
            let (left, right) = (table.left, table.right);
            self.document.push(DrawOp::vline(left, top, bottom, stroke));
            self.document.push(DrawOp::vline(right, top, bottom, stroke));
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            document: self.document.checkpoint(),
            cursor: self.cursor,
            table: self.table.clone(),
        }
    }

    /// Undo everything drawn since `checkpoint`, including page breaks.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        self.document.rollback(checkpoint.document);
        self.cursor = checkpoint.cursor;
        self.table = checkpoint.table;
        self.state = PaginationState::Drawing;
    }

    /// Close any open table and run the footer pass over every page.
    pub fn finish(mut self, footer: Option<&FooterSpec>) -> FinishedDocument {
        self.end_table();
        self.document.finalize(footer)
    }
}
