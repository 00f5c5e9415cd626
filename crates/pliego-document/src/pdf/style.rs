// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Explicit drawing state carried by every draw op.

use pliego_core::Rgb;

/// The three Helvetica faces the reports use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    Regular,
    Bold,
    Italic,
}

/// Font face, size and colour of one run of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub face: FontFace,
    pub size_pt: f32,
    pub color: Rgb,
}

impl TextStyle {
    pub const fn new(face: FontFace, size_pt: f32) -> Self {
        Self {
            face,
            size_pt,
            color: Rgb::BLACK,
        }
    }

    pub const fn regular(size_pt: f32) -> Self {
        Self::new(FontFace::Regular, size_pt)
    }

    pub const fn bold(size_pt: f32) -> Self {
        Self::new(FontFace::Bold, size_pt)
    }

    pub const fn italic(size_pt: f32) -> Self {
        Self::new(FontFace::Italic, size_pt)
    }

    pub const fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }
}

/// Colour and thickness of a stroked line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Rgb,
    pub width_pt: f32,
}

impl StrokeStyle {
    /// Hairline used for table borders.
    pub const fn hairline(color: Rgb) -> Self {
        Self {
            color,
            width_pt: 0.57,
        }
    }

    pub const fn with_width(mut self, width_pt: f32) -> Self {
        self.width_pt = width_pt;
        self
    }
}

/// Horizontal placement of text relative to an anchor or a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}
