// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Pliego report engine.

use serde::{Deserialize, Serialize};

/// Standard paper sizes used by the exports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    /// 210 x 210 mm square sheet used by the product catalog.
    Square,
    Custom { width_mm: f64, height_mm: f64 },
}

impl PaperSize {
    /// Portrait dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (f64, f64) {
        match self {
            Self::A4 => (210.0, 297.0),
            Self::Square => (210.0, 210.0),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Paper size plus orientation: the fixed canvas of a document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageFormat {
    pub paper: PaperSize,
    pub orientation: Orientation,
}

impl PageFormat {
    pub const A4_PORTRAIT: Self = Self {
        paper: PaperSize::A4,
        orientation: Orientation::Portrait,
    };

    pub const A4_LANDSCAPE: Self = Self {
        paper: PaperSize::A4,
        orientation: Orientation::Landscape,
    };

    pub const SQUARE: Self = Self {
        paper: PaperSize::Square,
        orientation: Orientation::Portrait,
    };

    /// Canvas width in millimetres after orientation is applied.
    pub fn width_mm(&self) -> f64 {
        self.dimensions_mm().0
    }

    /// Canvas height in millimetres after orientation is applied.
    pub fn height_mm(&self) -> f64 {
        self.dimensions_mm().1
    }

    /// (width, height) in millimetres after orientation is applied.
    pub fn dimensions_mm(&self) -> (f64, f64) {
        let (w, h) = self.paper.dimensions_mm();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Uniform grey.
    pub const fn grey(level: u8) -> Self {
        Self::new(level, level, level)
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Channels scaled to `0.0..=1.0`.
    pub fn to_unit(&self) -> (f32, f32, f32) {
        (
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }
}

/// Raster formats the image pipeline distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
}

impl ImageFormat {
    /// MIME type string.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// Infer the declared format from a `Content-Type` header value.
    ///
    /// Anything that is not recognisably PNG or WEBP is treated as JPEG.
    pub fn from_content_type(content_type: &str) -> Self {
        let lower = content_type.to_ascii_lowercase();
        if lower.contains("png") {
            Self::Png
        } else if lower.contains("webp") {
            Self::Webp
        } else {
            Self::Jpeg
        }
    }
}

/// The report shapes the composer knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportKind {
    Voucher,
    Ledger,
    TrialBalance,
    InventoryCatalog,
    StockHistory,
}

impl ReportKind {
    /// Document title embedded in the PDF metadata.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Voucher => "Comprobante",
            Self::Ledger => "Libro Diario",
            Self::TrialBalance => "Balance de Sumas y Saldos",
            Self::InventoryCatalog => "Catalogo de productos",
            Self::StockHistory => "Historial de Stock",
        }
    }

    /// Canvas every page of this report uses.
    pub fn page_format(&self) -> PageFormat {
        match self {
            Self::Voucher | Self::Ledger | Self::TrialBalance => PageFormat::A4_PORTRAIT,
            Self::InventoryCatalog => PageFormat::SQUARE,
            Self::StockHistory => PageFormat::A4_LANDSCAPE,
        }
    }
}
