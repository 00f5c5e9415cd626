// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Footer band stamped on every finished page.
//
// The band is a filled strip along the bottom edge holding a leading brand
// segment, optional contact segments separated by "|", and the running page
// index "i/total" right-aligned. Segment widths are measured before any
// position is fixed, so segments never overlap; a segment that cannot fit is
// dropped rather than drawn on top of its neighbour.

use pliego_core::Rgb;
use tracing::debug;

use super::document::DrawOp;
use super::metrics::text_width_mm;
use super::style::{Align, TextStyle};

const SEPARATOR: &str = "|";
const GAP_MM: f64 = 5.0;

/// Content and look of the footer band.
#[derive(Debug, Clone, PartialEq)]
pub struct FooterSpec {
    /// Left-most text, usually "<year> <brand>".
    pub lead: String,
    /// Text centred between the lead and the contact block. When absent the
    /// contact segments follow the lead directly.
    pub center: Option<String>,
    /// Contact segments in reading order. Blank entries are never drawn.
    pub segments: Vec<String>,
    pub fill: Rgb,
    pub text: TextStyle,
    pub height_mm: f64,
    pub margin_mm: f64,
    /// Baseline distance from the band's top edge.
    pub baseline_mm: f64,
}

impl FooterSpec {
    pub fn new(lead: impl Into<String>, fill: Rgb) -> Self {
        Self {
            lead: lead.into(),
            center: None,
            segments: Vec::new(),
            fill,
            text: TextStyle::regular(9.0).with_color(Rgb::WHITE),
            height_mm: 12.0,
            margin_mm: 5.0,
            baseline_mm: 7.0,
        }
    }

    pub fn with_center(mut self, center: impl Into<String>) -> Self {
        let center = center.into();
        if !center.trim().is_empty() {
            self.center = Some(center);
        }
        self
    }

    /// Append a contact segment; blank text is ignored.
    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        let segment = segment.into();
        if !segment.trim().is_empty() {
            self.segments.push(segment.trim().to_string());
        }
        self
    }

    pub fn pagination_text(index: usize, total: usize) -> String {
        format!("{index}/{total}")
    }

    fn width(&self, text: &str) -> f64 {
        text_width_mm(text, self.text.face, self.text.size_pt)
    }

    /// Ops for page `index` (1-based) of `total`, on a page of `page_size` mm.
    pub fn render(&self, index: usize, total: usize, page_size: (f64, f64)) -> Vec<DrawOp> {
        let (page_w, page_h) = page_size;
        let top = page_h - self.height_mm;
        let baseline = top + self.baseline_mm;

        let pagination = Self::pagination_text(index, total);
        let pagination_left = page_w - self.margin_mm - self.width(&pagination);

        let mut placed: Vec<(f64, String)> = vec![(self.margin_mm, self.lead.clone())];
        let after_lead = self.margin_mm + self.width(&self.lead) + GAP_MM;

        match &self.center {
            None => self.flow_segments(after_lead, pagination_left, &mut placed),
            Some(center) => self.centered_segments(center, after_lead, pagination_left, &mut placed),
        }

        let mut ops = Vec::with_capacity(placed.len() + 2);
        ops.push(DrawOp::rect(
            0.0,
            top,
            page_w,
            self.height_mm,
            Some(self.fill),
            None,
        ));
        ops.extend(
            placed
                .into_iter()
                .map(|(x, text)| DrawOp::text(x, baseline, text, self.text)),
        );
        ops.push(DrawOp::aligned_text(
            page_w - self.margin_mm,
            baseline,
            pagination,
            self.text,
            Align::Right,
        ));
        ops
    }

    /// `lead | seg | seg |` flowing left to right.
    fn flow_segments(&self, start: f64, limit: f64, placed: &mut Vec<(f64, String)>) {
        let separator_w = self.width(SEPARATOR);
        let mut cursor = start;
        let mut any = false;

        for segment in &self.segments {
            let segment_x = cursor + separator_w + GAP_MM;
            if segment_x + self.width(segment) > limit - GAP_MM {
                debug!(segment = %segment, "Footer segment does not fit, dropped");
                break;
            }
            placed.push((cursor, SEPARATOR.to_string()));
            placed.push((segment_x, segment.clone()));
            cursor = segment_x + self.width(segment) + GAP_MM;
            any = true;
        }

        if any && cursor + separator_w <= limit - GAP_MM {
            placed.push((cursor, SEPARATOR.to_string()));
        }
    }

    /// `lead | center | seg | seg |` with the contact block packed against
    /// the page index and the centre text between the two inner separators.
    fn centered_segments(
        &self,
        center: &str,
        start: f64,
        limit: f64,
        placed: &mut Vec<(f64, String)>,
    ) {
        let separator_w = self.width(SEPARATOR);
        let left_separator = start;
        let left_bound = left_separator + separator_w + GAP_MM;

        let mut segments: Vec<&String> = self.segments.iter().collect();
        let (block, right_separator) = loop {
            let (block, block_left) = self.pack_right(&segments, limit);
            let right_separator = block_left - GAP_MM - separator_w;
            if right_separator >= left_bound || segments.is_empty() {
                break (block, right_separator);
            }
            if let Some(dropped) = segments.pop() {
                debug!(segment = %dropped, "Footer segment does not fit, dropped");
            }
        };

        placed.push((left_separator, SEPARATOR.to_string()));
        placed.push((right_separator, SEPARATOR.to_string()));

        let available = (right_separator - GAP_MM) - left_bound;
        let center_w = self.width(center);
        if center_w <= available {
            let mid = (left_bound + right_separator - GAP_MM) / 2.0;
            placed.push((mid - center_w / 2.0, center.to_string()));
        } else {
            debug!(center, "Footer centre text does not fit, omitted");
        }

        placed.extend(block);
    }

    /// Lay `segments` out right-to-left ending `GAP_MM` before `limit`.
    /// Returns the placed texts and the left edge of the block.
    fn pack_right(&self, segments: &[&String], limit: f64) -> (Vec<(f64, String)>, f64) {
        let separator_w = self.width(SEPARATOR);
        let mut x = limit - GAP_MM;
        let mut block = Vec::new();
        if segments.is_empty() {
            return (block, x + GAP_MM);
        }

        x -= separator_w;
        block.push((x, SEPARATOR.to_string()));
        x -= GAP_MM;

        for (i, segment) in segments.iter().rev().enumerate() {
            if i > 0 {
                x -= separator_w;
                block.push((x, SEPARATOR.to_string()));
                x -= GAP_MM;
            }
            x -= self.width(segment);
            block.push((x, (*segment).clone()));
            x -= GAP_MM;
        }
        block.reverse();
        (block, x + GAP_MM)
    }
}
