// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Format module — locale-specific amounts and Spanish amount-in-words.

pub mod number;
pub mod words;

pub use number::{format_amount, format_cents, format_signed, to_cents};
pub use words::{amount_in_words, to_words};
