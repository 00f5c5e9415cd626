// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory document model: pages of positioned draw ops.
//
// Coordinates are millimetres from the top-left corner of the page. Text ops
// carry the baseline position. Conversion to PDF user space happens only in
// the writer.

use std::io::Cursor;

use image::codecs::jpeg::JpegDecoder;
use image::{ColorType, ImageDecoder};
use pliego_core::error::{PliegoError, Result};
use pliego_core::{PageFormat, Rgb};
use tracing::debug;

use super::footer::FooterSpec;
use super::metrics::text_width_mm;
use super::style::{Align, StrokeStyle, TextStyle};
use super::writer::PdfWriter;

/// Index of an embedded raster inside its document.
pub type ImageId = usize;

/// One drawing instruction with fully resolved position and style.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f64,
        baseline: f64,
        text: String,
        style: TextStyle,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: StrokeStyle,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<Rgb>,
        stroke: Option<StrokeStyle>,
    },
    Image {
        id: ImageId,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

impl DrawOp {
    pub fn text(x: f64, baseline: f64, text: impl Into<String>, style: TextStyle) -> Self {
        Self::Text {
            x,
            baseline,
            text: text.into(),
            style,
        }
    }

    /// Text positioned relative to `anchor_x`: its left edge, centre or right
    /// edge depending on `align`.
    pub fn aligned_text(
        anchor_x: f64,
        baseline: f64,
        text: impl Into<String>,
        style: TextStyle,
        align: Align,
    ) -> Self {
        let text = text.into();
        let width = text_width_mm(&text, style.face, style.size_pt);
        let x = match align {
            Align::Left => anchor_x,
            Align::Center => anchor_x - width / 2.0,
            Align::Right => anchor_x - width,
        };
        Self::text(x, baseline, text, style)
    }

    pub fn hline(x1: f64, x2: f64, y: f64, stroke: StrokeStyle) -> Self {
        Self::Line {
            x1,
            y1: y,
            x2,
            y2: y,
            stroke,
        }
    }

    pub fn vline(x: f64, y1: f64, y2: f64, stroke: StrokeStyle) -> Self {
        Self::Line {
            x1: x,
            y1,
            x2: x,
            y2,
            stroke,
        }
    }

    pub fn rect(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<Rgb>,
        stroke: Option<StrokeStyle>,
    ) -> Self {
        Self::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        }
    }

    /// The same op moved down by `dy` millimetres.
    pub fn shifted(self, dy: f64) -> Self {
        match self {
            Self::Text {
                x,
                baseline,
                text,
                style,
            } => Self::Text {
                x,
                baseline: baseline + dy,
                text,
                style,
            },
            Self::Line {
                x1,
                y1,
                x2,
                y2,
                stroke,
            } => Self::Line {
                x1,
                y1: y1 + dy,
                x2,
                y2: y2 + dy,
                stroke,
            },
            Self::Rect {
                x,
                y,
                width,
                height,
                fill,
                stroke,
            } => Self::Rect {
                x,
                y: y + dy,
                width,
                height,
                fill,
                stroke,
            },
            Self::Image {
                id,
                x,
                y,
                width,
                height,
            } => Self::Image {
                id,
                x,
                y: y + dy,
                width,
                height,
            },
        }
    }

    /// Text content, if this is a text op.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Sample data of an embedded raster, in the form it is written to the PDF.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageData {
    /// A baseline JPEG stream embedded as is (`/DCTDecode`).
    Jpeg { bytes: Vec<u8>, grey: bool },
    /// Packed RGB8 samples and an optional 8-bit alpha plane, written as a
    /// soft mask.
    Raw { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
}

/// A raster ready for embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    pub width: u32,
    pub height: u32,
    pub data: ImageData,
}

impl EmbeddedImage {
    /// Opaque RGB8 samples.
    pub fn rgb(width: u32, height: u32, rgb: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: ImageData::Raw { rgb, alpha: None },
        }
    }

    /// Embed encoded bytes. JPEG is kept compressed; PNG and WEBP are
    /// decoded, with the alpha plane kept only when some pixel is not opaque.
    pub fn from_encoded(bytes: Vec<u8>) -> Result<Self> {
        let undecodable = |err: ::image::ImageError| {
            PliegoError::MissingAsset(format!("failed to decode image for embedding: {err}"))
        };

        if ::image::guess_format(&bytes).ok() == Some(::image::ImageFormat::Jpeg) {
            let decoder = JpegDecoder::new(Cursor::new(bytes.as_slice())).map_err(undecodable)?;
            let (width, height) = decoder.dimensions();
            let grey = matches!(decoder.color_type(), ColorType::L8 | ColorType::L16);
            return Ok(Self {
                width,
                height,
                data: ImageData::Jpeg { bytes, grey },
            });
        }

        let decoded = ::image::load_from_memory(&bytes).map_err(undecodable)?;
        let (width, height) = (decoded.width(), decoded.height());
        if !decoded.color().has_alpha() {
            return Ok(Self::rgb(width, height, decoded.to_rgb8().into_raw()));
        }

        let rgba = decoded.to_rgba8();
        let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
        let mut alpha = Vec::with_capacity(width as usize * height as usize);
        for pixel in rgba.pixels() {
            rgb.extend_from_slice(&pixel.0[..3]);
            alpha.push(pixel.0[3]);
        }
        let alpha = alpha.iter().any(|a| *a < u8::MAX).then_some(alpha);
        Ok(Self {
            width,
            height,
            data: ImageData::Raw { rgb, alpha },
        })
    }
}

/// The ops of one page, in paint order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    ops: Vec<DrawOp>,
}

impl Page {
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Every text run on the page, in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(DrawOp::as_text)
    }
}

/// Position inside a document that drawing can be rolled back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentCheckpoint {
    pages: usize,
    ops_on_last_page: usize,
}

/// A document under construction. Pages are appended as content overflows.
#[derive(Debug, Clone)]
pub struct Document {
    title: String,
    format: PageFormat,
    pages: Vec<Page>,
    images: Vec<EmbeddedImage>,
}

impl Document {
    /// A new document with one empty page.
    pub fn new(title: impl Into<String>, format: PageFormat) -> Self {
        Self {
            title: title.into(),
            format,
            pages: vec![Page::default()],
            images: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn format(&self) -> PageFormat {
        self.format
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Append an empty page; subsequent ops land on it.
    pub fn add_page(&mut self) {
        self.pages.push(Page::default());
        debug!(page = self.pages.len(), "Page appended");
    }

    /// Draw on the last page.
    pub fn push(&mut self, op: DrawOp) {
        // `new` starts with one page and pages are never removed below one.
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    pub fn extend(&mut self, ops: impl IntoIterator<Item = DrawOp>) {
        for op in ops {
            self.push(op);
        }
    }

    /// Register a raster; the returned id is valid for `DrawOp::Image`.
    pub fn add_image(&mut self, image: EmbeddedImage) -> ImageId {
        self.images.push(image);
        self.images.len() - 1
    }

    pub fn checkpoint(&self) -> DocumentCheckpoint {
        DocumentCheckpoint {
            pages: self.pages.len(),
            ops_on_last_page: self.pages.last().map_or(0, |page| page.ops.len()),
        }
    }

    /// Discard everything drawn after `checkpoint`, including appended pages.
    pub fn rollback(&mut self, checkpoint: DocumentCheckpoint) {
        self.pages.truncate(checkpoint.pages.max(1));
        if let Some(page) = self.pages.last_mut() {
            page.ops.truncate(checkpoint.ops_on_last_page);
        }
    }

    /// Stamp the footer on every page and freeze the document.
    pub fn finalize(mut self, footer: Option<&FooterSpec>) -> FinishedDocument {
        let total = self.pages.len();
        if let Some(footer) = footer {
            for (index, page) in self.pages.iter_mut().enumerate() {
                page.ops
                    .extend(footer.render(index + 1, total, self.format.dimensions_mm()));
            }
        }
        FinishedDocument {
            title: self.title,
            format: self.format,
            pages: self.pages,
            images: self.images,
        }
    }
}

/// A document whose page list can no longer change.
#[derive(Debug, Clone)]
pub struct FinishedDocument {
    title: String,
    format: PageFormat,
    pages: Vec<Page>,
    images: Vec<EmbeddedImage>,
}

impl FinishedDocument {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn format(&self) -> PageFormat {
        self.format
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn images(&self) -> &[EmbeddedImage] {
        &self.images
    }

    /// Serialize to PDF bytes.
    pub fn to_pdf(&self) -> Result<Vec<u8>> {
        PdfWriter::new(self.format).render(self)
    }
}
