// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Table layout — column widths, cell wrapping and header/body/total bands.
//
// A table never decides page breaks. It turns rows into bands whose ops are
// relative to the band's top edge; the paginator places them.

use std::collections::BTreeMap;

use pliego_core::Rgb;
use pliego_core::error::{PliegoError, Result};

use super::document::DrawOp;
use super::metrics::wrap_text;
use super::style::{Align, StrokeStyle, TextStyle};
use crate::format::{format_amount, format_cents, to_cents};

/// Declared width of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnWidth {
    /// Exact width in millimetres.
    Fixed(f64),
    /// Share of whatever the fixed columns leave over.
    Weight(f64),
}

/// One table column: the row key it reads, its header and its geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Key looked up in each [`Row`].
    pub key: String,
    /// Header caption.
    pub label: String,
    pub width: ColumnWidth,
    /// Alignment of header and body cells.
    pub align: Align,
    /// Values are amounts: formatted with [`format_amount`] and summable.
    pub numeric: bool,
    absorbs_remainder: bool,
}

impl Column {
    /// Left-aligned text column.
    pub fn text(key: impl Into<String>, label: impl Into<String>, width: ColumnWidth) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            width,
            align: Align::Left,
            numeric: false,
            absorbs_remainder: false,
        }
    }

    /// Centred amount column; its values feed [`ColumnTotals`].
    pub fn numeric(key: impl Into<String>, label: impl Into<String>, width: ColumnWidth) -> Self {
        Self {
            align: Align::Center,
            numeric: true,
            ..Self::text(key, label, width)
        }
    }

    /// Centre a text column.
    pub fn centered(mut self) -> Self {
        self.align = Align::Center;
        self
    }

    /// Make this column take the rounding remainder of the width split.
    pub fn absorbing(mut self) -> Self {
        self.absorbs_remainder = true;
        self
    }
}

/// Which vertical rules body rows draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyBorders {
    /// Every column boundary, redrawn at each row's height.
    Grid,
    /// Only the outer edges, as continuous segments drawn by the paginator.
    Sides,
}

/// Sizes, colours and faces of a table. Lengths are millimetres.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStyle {
    /// Height of the header band.
    pub header_height: f64,
    /// Header caption baseline below the band's top edge.
    pub header_baseline: f64,
    pub header_fill: Rgb,
    pub header_text: TextStyle,
    pub body_text: TextStyle,
    /// Secondary line printed under a cell's value.
    pub gloss_text: TextStyle,
    /// Vertical distance between wrapped lines.
    pub line_height: f64,
    /// First baseline below a body row's top edge.
    pub body_baseline: f64,
    /// Body rows are never shorter than this.
    pub min_row_height: f64,
    /// Horizontal padding inside a cell.
    pub inset: f64,
    /// Stroke of every rule and cell edge.
    pub border: StrokeStyle,
    pub body_borders: BodyBorders,
    /// Height of subtotal and total bands.
    pub total_height: f64,
    pub total_text: TextStyle,
    /// Fill of grand-total rows.
    pub accent: Rgb,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            header_height: 8.0,
            header_baseline: 5.0,
            header_fill: Rgb::grey(240),
            header_text: TextStyle::bold(8.0),
            body_text: TextStyle::regular(8.0),
            gloss_text: TextStyle::italic(8.0).with_color(Rgb::grey(100)),
            line_height: 5.0,
            body_baseline: 5.0,
            min_row_height: 6.0,
            inset: 2.0,
            border: StrokeStyle::hairline(Rgb::grey(200)),
            body_borders: BodyBorders::Grid,
            total_height: 8.0,
            total_text: TextStyle::bold(8.0),
            accent: Rgb::new(190, 8, 18),
        }
    }
}

/// One cell value. Numbers are formatted at layout time.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

/// Secondary text drawn beneath one column's primary text.
#[derive(Debug, Clone, PartialEq)]
pub struct Gloss {
    pub column: String,
    pub text: String,
}

/// Cell values of one body row, keyed by column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: BTreeMap<String, CellValue>,
    gloss: Option<Gloss>,
}

impl Row {
    /// Empty row; missing cells render blank.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.cells.insert(key.into(), CellValue::Text(value.into()));
        self
    }

    pub fn number(mut self, key: impl Into<String>, value: f64) -> Self {
        self.cells.insert(key.into(), CellValue::Number(value));
        self
    }

    /// Attach a gloss under `column`; blank text is ignored.
    pub fn gloss(mut self, column: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.trim().is_empty() {
            self.gloss = Some(Gloss {
                column: column.into(),
                text: text.trim().to_string(),
            });
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.get(key)
    }
}

/// A horizontal strip of ops positioned relative to its own top edge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Band {
    height: f64,
    ops: Vec<DrawOp>,
}

impl Band {
    pub fn new(height: f64) -> Self {
        Self {
            height,
            ops: Vec::new(),
        }
    }

    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    pub fn with(mut self, op: DrawOp) -> Self {
        self.push(op);
        self
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// The band's ops moved to absolute position `top`.
    pub fn placed_at(&self, top: f64) -> impl Iterator<Item = DrawOp> + '_ {
        self.ops.iter().cloned().map(move |op| op.shifted(top))
    }
}

/// Which kind of totals row to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalKind {
    /// Grey, header-styled per-group totals.
    Subtotal,
    /// Accent-filled document totals with white text.
    Grand,
}

/// Running sums per numeric column, kept in whole cents.
///
/// Each recorded amount is rounded to cents once, exactly as it is printed
/// in its row, so a totals row always equals the sum of the rows above it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnTotals {
    cents: BTreeMap<String, i128>,
}

impl ColumnTotals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str, amount: f64) -> Result<()> {
        let cents = to_cents(amount)?;
        *self.cents.entry(key.to_string()).or_insert(0) += cents;
        Ok(())
    }

    /// Add every numeric cell of `row`.
    pub fn record(&mut self, table: &TableSpec, row: &Row) -> Result<()> {
        for column in table.columns.iter().filter(|c| c.numeric) {
            if let Some(CellValue::Number(value)) = row.get(&column.key) {
                self.add(&column.key, *value)?;
            }
        }
        Ok(())
    }

    pub fn merge(&mut self, other: &ColumnTotals) {
        for (key, cents) in &other.cents {
            *self.cents.entry(key.clone()).or_insert(0) += cents;
        }
    }

    pub fn cents(&self, key: &str) -> i128 {
        self.cents.get(key).copied().unwrap_or(0)
    }

    pub fn amount(&self, key: &str) -> f64 {
        self.cents(key) as f64 / 100.0
    }
}

/// A table with widths fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    columns: Vec<Column>,
    x: f64,
    widths: Vec<f64>,
    style: TableStyle,
}

impl TableSpec {
    /// Resolve column widths so they sum to exactly `total_width`.
    ///
    /// Widths are computed in hundredths of a millimetre. The rounding
    /// remainder goes to the column marked [`Column::absorbing`], else to the
    /// widest text column.
    pub fn new(columns: Vec<Column>, x: f64, total_width: f64, style: TableStyle) -> Result<Self> {
        let widths = resolve_widths(&columns, total_width)?;
        Ok(Self {
            columns,
            x,
            widths,
            style,
        })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_widths(&self) -> &[f64] {
        &self.widths
    }

    pub fn style(&self) -> &TableStyle {
        &self.style
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width()
    }

    pub fn width(&self) -> f64 {
        self.widths.iter().sum()
    }

    /// x of every column boundary, both outer edges included.
    pub fn boundaries(&self) -> Vec<f64> {
        let mut edges = Vec::with_capacity(self.widths.len() + 1);
        let mut x = self.x;
        edges.push(x);
        for width in &self.widths {
            x += width;
            edges.push(x);
        }
        edges
    }

    fn dividers(&self, band: &mut Band, height: f64, stroke: StrokeStyle) {
        for x in self.boundaries() {
            band.push(DrawOp::vline(x, 0.0, height, stroke));
        }
    }

    /// Anchor x for text of the given alignment inside column `index`.
    fn anchor(&self, left: f64, width: f64, align: Align) -> f64 {
        match align {
            Align::Left => left + self.style.inset,
            Align::Center => left + width / 2.0,
            Align::Right => left + width - self.style.inset,
        }
    }

    /// Filled header band with bold labels and every divider.
    pub fn header_band(&self) -> Band {
        let style = &self.style;
        let mut band = Band::new(style.header_height);
        band.push(DrawOp::rect(
            self.x,
            0.0,
            self.width(),
            style.header_height,
            Some(style.header_fill),
            Some(style.border),
        ));
        self.dividers(&mut band, style.header_height, style.border);

        let edges = self.boundaries();
        for (i, column) in self.columns.iter().enumerate() {
            let width = self.widths[i];
            band.push(DrawOp::aligned_text(
                self.anchor(edges[i], width, column.align),
                style.header_baseline,
                column.label.clone(),
                style.header_text,
                column.align,
            ));
        }
        band
    }

    /// One body row. Height grows with the tallest wrapped cell.
    pub fn body_band(&self, row: &Row) -> Result<Band> {
        let style = &self.style;
        let edges = self.boundaries();
        let mut cells: Vec<(usize, Vec<String>, Vec<String>)> = Vec::with_capacity(self.columns.len());
        let mut tallest = 0usize;

        for (i, column) in self.columns.iter().enumerate() {
            let text = match row.get(&column.key) {
                Some(CellValue::Text(text)) => text.clone(),
                Some(CellValue::Number(value)) => format_amount(*value)?,
                None => String::new(),
            };
            let wrap_width = (self.widths[i] - 2.0 * style.inset).max(0.0);
            let primary = wrap_text(
                &text,
                wrap_width,
                style.body_text.face,
                style.body_text.size_pt,
            );
            let gloss = match &row.gloss {
                Some(gloss) if gloss.column == column.key => wrap_text(
                    &gloss.text,
                    wrap_width,
                    style.gloss_text.face,
                    style.gloss_text.size_pt,
                ),
                _ => Vec::new(),
            };
            tallest = tallest.max(primary.len() + gloss.len());
            cells.push((i, primary, gloss));
        }

        let height = style.min_row_height.max(tallest as f64 * style.line_height);
        let mut band = Band::new(height);
        if style.body_borders == BodyBorders::Grid {
            self.dividers(&mut band, height, style.border);
        }

        for (i, primary, gloss) in cells {
            let column = &self.columns[i];
            let anchor = self.anchor(edges[i], self.widths[i], column.align);
            let mut baseline = style.body_baseline;
            for line in primary {
                if !line.is_empty() {
                    band.push(DrawOp::aligned_text(
                        anchor,
                        baseline,
                        line,
                        style.body_text,
                        column.align,
                    ));
                }
                baseline += style.line_height;
            }
            // Gloss sits tight under the primary text.
            let mut gloss_baseline = baseline - 1.0;
            for line in gloss {
                band.push(DrawOp::aligned_text(
                    anchor,
                    gloss_baseline,
                    line,
                    style.gloss_text,
                    column.align,
                ));
                gloss_baseline += style.line_height;
            }
        }
        Ok(band)
    }

    /// A totals row: `label` in column `label_column`, each numeric column's
    /// total centred beneath it.
    pub fn total_band(
        &self,
        label: &str,
        label_column: usize,
        totals: &ColumnTotals,
        kind: TotalKind,
    ) -> Band {
        let style = &self.style;
        let (fill, stroke, text) = match kind {
            TotalKind::Subtotal => (style.header_fill, style.border, style.total_text),
            TotalKind::Grand => (
                style.accent,
                StrokeStyle::hairline(style.accent),
                style.total_text.with_color(Rgb::WHITE),
            ),
        };
        let dividers = match kind {
            TotalKind::Subtotal => style.border,
            TotalKind::Grand => StrokeStyle::hairline(Rgb::WHITE),
        };

        let mut band = Band::new(style.total_height);
        band.push(DrawOp::rect(
            self.x,
            0.0,
            self.width(),
            style.total_height,
            Some(fill),
            Some(stroke),
        ));
        self.dividers(&mut band, style.total_height, dividers);

        let edges = self.boundaries();
        let label_column = label_column.min(self.columns.len().saturating_sub(1));
        band.push(DrawOp::text(
            edges[label_column] + style.inset,
            style.header_baseline,
            label,
            text,
        ));
        for (i, column) in self.columns.iter().enumerate() {
            if !column.numeric {
                continue;
            }
            band.push(DrawOp::aligned_text(
                edges[i] + self.widths[i] / 2.0,
                style.header_baseline,
                format_cents(totals.cents(&column.key)),
                text,
                Align::Center,
            ));
        }
        band
    }
}

fn resolve_widths(columns: &[Column], total_width: f64) -> Result<Vec<f64>> {
    if columns.is_empty() {
        return Err(PliegoError::RenderFailure("table has no columns".into()));
    }
    if !total_width.is_finite() || total_width <= 0.0 {
        return Err(PliegoError::RenderFailure(format!(
            "invalid table width {total_width}"
        )));
    }

    let to_centi = |mm: f64| (mm * 100.0).round() as i64;
    let total = to_centi(total_width);

    let mut centi = vec![0i64; columns.len()];
    let mut weights = Vec::new();
    let mut fixed_sum = 0i64;
    for (i, column) in columns.iter().enumerate() {
        match column.width {
            ColumnWidth::Fixed(mm) if mm.is_finite() && mm >= 0.0 => {
                centi[i] = to_centi(mm);
                fixed_sum += centi[i];
            }
            ColumnWidth::Weight(w) if w.is_finite() && w > 0.0 => weights.push((i, w)),
            other => {
                return Err(PliegoError::RenderFailure(format!(
                    "column '{}' has invalid width {other:?}",
                    column.key
                )));
            }
        }
    }

    let remaining = total - fixed_sum;
    if remaining < 0 {
        return Err(PliegoError::RenderFailure(format!(
            "fixed columns need {:.2} mm but the table is {total_width:.2} mm",
            fixed_sum as f64 / 100.0
        )));
    }

    let weight_sum: f64 = weights.iter().map(|(_, w)| w).sum();
    for (i, w) in &weights {
        centi[*i] = (remaining as f64 * w / weight_sum).floor() as i64;
    }

    let leftover = total - centi.iter().sum::<i64>();
    if leftover != 0 {
        let absorber = columns
            .iter()
            .position(|c| c.absorbs_remainder)
            .or_else(|| {
                columns
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| !c.numeric)
                    .max_by_key(|(i, _)| (centi[*i], std::cmp::Reverse(*i)))
                    .map(|(i, _)| i)
            })
            .unwrap_or(columns.len() - 1);
        centi[absorber] += leftover;
    }

    Ok(centi.into_iter().map(|c| c as f64 / 100.0).collect())
}
