// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Helvetica glyph metrics and width-based line wrapping.
//
// Widths are the Adobe core-font AFM advances (1/1000 em) for printable
// ASCII. Accented Latin letters measure as their base letter; anything else
// falls back to the width of a digit.

use unicode_normalization::UnicodeNormalization;

use super::style::FontFace;

/// Millimetres per PostScript point.
pub const MM_PER_PT: f64 = 25.4 / 72.0;

const FALLBACK_WIDTH: u16 = 556;

#[rustfmt::skip]
const REGULAR: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Advance width of one character in 1/1000 em.
fn glyph_width(c: char, face: FontFace) -> u16 {
    let table = match face {
        // Oblique shares the upright advances.
        FontFace::Regular | FontFace::Italic => &REGULAR,
        FontFace::Bold => &BOLD,
    };
    let lookup = |c: char| {
        let code = c as u32;
        (32..=126)
            .contains(&code)
            .then(|| table[(code - 32) as usize])
    };
    if let Some(width) = lookup(c) {
        return width;
    }
    match c {
        '°' | 'º' => 400,
        '\u{a0}' => 278,
        _ => std::iter::once(c)
            .nfd()
            .next()
            .and_then(lookup)
            .unwrap_or(FALLBACK_WIDTH),
    }
}

/// Rendered width of `text` in millimetres.
pub fn text_width_mm(text: &str, face: FontFace, size_pt: f32) -> f64 {
    let units: u64 = text.chars().map(|c| u64::from(glyph_width(c, face))).sum();
    units as f64 / 1000.0 * f64::from(size_pt) * MM_PER_PT
}

/// Wrap `text` so that no line is wider than `max_width_mm`.
///
/// Existing newlines start new paragraphs; an empty paragraph yields an empty
/// line, so the result is never empty. Words wider than a whole line are
/// broken between characters.
pub fn wrap_text(text: &str, max_width_mm: f64, face: FontFace, size_pt: f32) -> Vec<String> {
    let fits = |candidate: &str| text_width_mm(candidate, face, size_pt) <= max_width_mm;
    let mut result = Vec::new();

    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            result.push(String::new());
            continue;
        }

        let mut current_line = String::new();

        for word in words {
            let candidate = if current_line.is_empty() {
                word.to_string()
            } else {
                format!("{current_line} {word}")
            };
            if fits(&candidate) {
                current_line = candidate;
                continue;
            }

            if !current_line.is_empty() {
                result.push(std::mem::take(&mut current_line));
            }
            if fits(word) {
                current_line.push_str(word);
                continue;
            }

            // Force-break the oversized word.
            for c in word.chars() {
                current_line.push(c);
                if !fits(&current_line) && current_line.chars().count() > 1 {
                    current_line.pop();
                    result.push(std::mem::take(&mut current_line));
                    current_line.push(c);
                }
            }
        }

        if !current_line.is_empty() {
            result.push(current_line);
        }
    }

    result
}

/// Shorten `text` to at most `max_chars` characters, ending in "...".
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut shortened: String = text.chars().take(keep).collect();
    shortened.push_str("...");
    shortened
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_width_matches_afm() {
        // Ten digits at 10pt: 10 * 556 / 1000 * 10pt.
        let width = text_width_mm("0123456789", FontFace::Regular, 10.0);
        assert!((width - 55.6 * MM_PER_PT).abs() < 1e-9);
    }

    #[test]
    fn bold_is_wider_than_regular() {
        let regular = text_width_mm("Descripción", FontFace::Regular, 8.0);
        let bold = text_width_mm("Descripción", FontFace::Bold, 8.0);
        assert!(bold > regular);
        assert_eq!(
            text_width_mm("Descripción", FontFace::Italic, 8.0),
            regular
        );
    }

    #[test]
    fn accented_letters_measure_as_base() {
        assert_eq!(
            text_width_mm("ñandú", FontFace::Regular, 9.0),
            text_width_mm("nandu", FontFace::Regular, 9.0)
        );
    }

    #[test]
    fn wraps_at_measured_width() {
        let lines = wrap_text(
            "Pago de servicios de publicidad en vallas del centro",
            30.0,
            FontFace::Regular,
            8.0,
        );
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width_mm(line, FontFace::Regular, 8.0) <= 30.0);
        }
        assert_eq!(
            lines.join(" "),
            "Pago de servicios de publicidad en vallas del centro"
        );
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        assert_eq!(wrap_text("", 50.0, FontFace::Regular, 8.0), vec![String::new()]);
    }

    #[test]
    fn oversized_word_is_force_broken() {
        let word = "W".repeat(40);
        let lines = wrap_text(&word, 20.0, FontFace::Bold, 10.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        for line in &lines {
            assert!(text_width_mm(line, FontFace::Bold, 10.0) <= 20.0);
        }
    }

    #[test]
    fn newlines_start_paragraphs() {
        let lines = wrap_text("uno\n\ndos", 100.0, FontFace::Regular, 8.0);
        assert_eq!(lines, vec!["uno", "", "dos"]);
    }

    #[test]
    fn truncation_adds_ellipsis() {
        assert_eq!(truncate_chars("corto", 30), "corto");
        let long = "Lona impresa para valla publicitaria grande";
        let shortened = truncate_chars(long, 30);
        assert_eq!(shortened.chars().count(), 30);
        assert!(shortened.ends_with("..."));
    }
}
