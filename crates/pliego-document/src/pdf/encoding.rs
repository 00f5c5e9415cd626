// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// WinAnsiEncoding for the standard Helvetica faces.
//
// The core fonts are declared with `/Encoding /WinAnsiEncoding`, so every
// string shown with them must be single-byte Windows-1252. Latin-1 code
// points map to themselves; the 0x80-0x9F block holds typographic marks.
// Anything else is folded to its unaccented base letter or becomes `?`.

use unicode_normalization::UnicodeNormalization;

/// Code points placed in the 0x80-0x9F block of WinAnsiEncoding.
const HIGH_BLOCK: [(char, u8); 27] = [
    ('€', 0x80),
    ('‚', 0x82),
    ('ƒ', 0x83),
    ('„', 0x84),
    ('…', 0x85),
    ('†', 0x86),
    ('‡', 0x87),
    ('ˆ', 0x88),
    ('‰', 0x89),
    ('Š', 0x8A),
    ('‹', 0x8B),
    ('Œ', 0x8C),
    ('Ž', 0x8E),
    ('‘', 0x91),
    ('’', 0x92),
    ('“', 0x93),
    ('”', 0x94),
    ('•', 0x95),
    ('–', 0x96),
    ('—', 0x97),
    ('˜', 0x98),
    ('™', 0x99),
    ('š', 0x9A),
    ('›', 0x9B),
    ('œ', 0x9C),
    ('ž', 0x9E),
    ('Ÿ', 0x9F),
];

const REPLACEMENT: u8 = b'?';

/// WinAnsi byte for one character, if it has one.
fn win_ansi_byte(c: char) -> Option<u8> {
    let code = c as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => HIGH_BLOCK
            .iter()
            .find(|(mapped, _)| *mapped == c)
            .map(|(_, byte)| *byte),
    }
}

/// Encode `text` for a WinAnsi-encoded core font.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            win_ansi_byte(c).unwrap_or_else(|| {
                std::iter::once(c)
                    .nfd()
                    .next()
                    .and_then(win_ansi_byte)
                    .unwrap_or(REPLACEMENT)
            })
        })
        .collect()
}
