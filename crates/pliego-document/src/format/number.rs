// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Amount formatting: two decimals, `.` thousands separator, `,` decimal mark.

use pliego_core::error::{PliegoError, Result};

/// Largest magnitude accepted, in currency units. Keeps the cent count well
/// inside `i128` and the `f64` integer-exact range.
const MAX_MAGNITUDE: f64 = 1e15;

/// Round an amount to whole cents, half away from zero.
///
/// Rounding works on the shortest decimal text that reads back as the same
/// `f64`, so `1.005` rounds up while `0.00499999999` stays at zero.
/// Non-finite or absurdly large input is an `InvalidAmount`.
pub fn to_cents(amount: f64) -> Result<i128> {
    let invalid = || {
        PliegoError::InvalidAmount(format!(
            "cannot format non-finite or out-of-range amount {amount}"
        ))
    };
    if !amount.is_finite() || amount.abs() > MAX_MAGNITUDE {
        return Err(invalid());
    }
    // `Display` for f64 never uses exponent notation.
    let text = amount.abs().to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let digit = |i: usize| {
        fraction
            .as_bytes()
            .get(i)
            .map_or(0, |b| i128::from(b.wrapping_sub(b'0')))
    };
    let whole: i128 = whole.parse().map_err(|_| invalid())?;
    let mut cents = whole * 100 + digit(0) * 10 + digit(1);
    if digit(2) >= 5 {
        cents += 1;
    }
    Ok(if amount.is_sign_negative() { -cents } else { cents })
}

/// Render a cent count as `1.234,50`, with a leading `-` when negative.
pub fn format_cents(cents: i128) -> String {
    let negative = cents < 0;
    let magnitude = cents.unsigned_abs();
    let whole = (magnitude / 100).to_string();
    let fraction = magnitude % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3 + 4);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    if negative {
        format!("-{grouped},{fraction:02}")
    } else {
        format!("{grouped},{fraction:02}")
    }
}

/// Format an amount for display: `format_amount(1234.5) == "1.234,50"`.
pub fn format_amount(amount: f64) -> Result<String> {
    Ok(format_cents(to_cents(amount)?))
}

/// Like [`format_amount`] but always signed; zero counts as positive.
pub fn format_signed(amount: f64) -> Result<String> {
    let cents = to_cents(amount)?;
    let body = format_cents(cents);
    if cents >= 0 {
        Ok(format!("+{body}"))
    } else {
        Ok(body)
    }
}
