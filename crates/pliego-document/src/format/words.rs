// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spanish number-to-words for the legal "Son:" line of vouchers.
//
// Groups of three digits are rendered independently and joined with the
// scale words Millón/Millones and Mil. Tens and units are joined with " y "
// for every ten from twenty upward ("Veinte y Uno").

use pliego_core::error::{PliegoError, Result};

use super::number::to_cents;

const UNITS: [&str; 10] = [
    "", "Uno", "Dos", "Tres", "Cuatro", "Cinco", "Seis", "Siete", "Ocho", "Nueve",
];

const TEENS: [&str; 10] = [
    "Diez",
    "Once",
    "Doce",
    "Trece",
    "Catorce",
    "Quince",
    "Dieciséis",
    "Diecisiete",
    "Dieciocho",
    "Diecinueve",
];

const TENS: [&str; 10] = [
    "", "", "Veinte", "Treinta", "Cuarenta", "Cincuenta", "Sesenta", "Setenta", "Ochenta",
    "Noventa",
];

const HUNDREDS: [&str; 10] = [
    "",
    "Ciento",
    "Doscientos",
    "Trescientos",
    "Cuatrocientos",
    "Quinientos",
    "Seiscientos",
    "Setecientos",
    "Ochocientos",
    "Novecientos",
];

/// Exclusive upper bound of the supported magnitude.
pub const WORDS_LIMIT: i64 = 1_000_000_000;

/// Spell out an integer in Spanish, title-cased per word.
///
/// Supports `|n| < 1_000_000_000`. Zero is "Cero"; negatives are prefixed
/// with "Menos".
pub fn to_words(n: i64) -> Result<String> {
    if n <= -WORDS_LIMIT || n >= WORDS_LIMIT {
        return Err(PliegoError::InvalidAmount(format!(
            "{n} is outside the amount-in-words range"
        )));
    }
    if n == 0 {
        return Ok("Cero".to_string());
    }
    if n < 0 {
        return Ok(format!("Menos {}", spell_positive(n.unsigned_abs())));
    }
    Ok(spell_positive(n as u64))
}

fn spell_positive(n: u64) -> String {
    let millions = n / 1_000_000;
    let thousands = (n / 1_000) % 1_000;
    let rest = n % 1_000;

    let mut parts: Vec<String> = Vec::with_capacity(3);
    match millions {
        0 => {}
        1 => parts.push("Un Millón".to_string()),
        m => parts.push(format!("{} Millones", render_hundreds(m))),
    }
    match thousands {
        0 => {}
        1 => parts.push("Mil".to_string()),
        t => parts.push(format!("{} Mil", render_hundreds(t))),
    }
    if rest > 0 {
        parts.push(render_hundreds(rest));
    }
    parts.join(" ")
}

/// Words for 0..=999. Zero renders as the empty string.
pub(crate) fn render_hundreds(n: u64) -> String {
    if n == 0 {
        return String::new();
    }
    if n == 100 {
        return "Cien".to_string();
    }

    let mut words: Vec<&str> = Vec::with_capacity(4);
    let hundreds = (n / 100) as usize;
    let below_hundred = (n % 100) as usize;
    if hundreds > 0 {
        words.push(HUNDREDS[hundreds]);
    }

    match below_hundred {
        0 => {}
        10..=19 => words.push(TEENS[below_hundred - 10]),
        _ => {
            let tens = below_hundred / 10;
            let units = below_hundred % 10;
            if tens > 0 {
                words.push(TENS[tens]);
                if units > 0 {
                    words.push("y");
                }
            }
            if units > 0 {
                words.push(UNITS[units]);
            }
        }
    }
    words.join(" ")
}

/// The legal amount line: `"<words> NN/100 <currency>"`.
///
/// Integer part and cents come from one rounding to whole cents, so 0.995
/// reads "Uno 00/100", never "Cero 100/100".
pub fn amount_in_words(amount: f64, currency: &str) -> Result<String> {
    let cents = to_cents(amount)?;
    let magnitude = cents.unsigned_abs();
    let whole = i64::try_from(magnitude / 100).map_err(|_| {
        PliegoError::InvalidAmount(format!("{amount} is outside the amount-in-words range"))
    })?;
    let fraction = magnitude % 100;

    let words = to_words(whole)?;
    let sign = if cents < 0 { "Menos " } else { "" };
    let line = format!("{sign}{words} {fraction:02}/100 {currency}");
    Ok(line.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_numbers() {
        assert_eq!(to_words(0).unwrap(), "Cero");
        assert_eq!(to_words(1).unwrap(), "Uno");
        assert_eq!(to_words(10).unwrap(), "Diez");
        assert_eq!(to_words(16).unwrap(), "Dieciséis");
        assert_eq!(to_words(20).unwrap(), "Veinte");
        assert_eq!(to_words(21).unwrap(), "Veinte y Uno");
        assert_eq!(to_words(99).unwrap(), "Noventa y Nueve");
    }

    #[test]
    fn hundreds() {
        assert_eq!(to_words(100).unwrap(), "Cien");
        assert_eq!(to_words(101).unwrap(), "Ciento Uno");
        assert_eq!(to_words(115).unwrap(), "Ciento Quince");
        assert_eq!(to_words(500).unwrap(), "Quinientos");
        assert_eq!(to_words(999).unwrap(), "Novecientos Noventa y Nueve");
    }

    #[test]
    fn thousands_and_millions() {
        assert_eq!(to_words(1000).unwrap(), "Mil");
        assert_eq!(to_words(1001).unwrap(), "Mil Uno");
        assert_eq!(to_words(2000).unwrap(), "Dos Mil");
        assert_eq!(to_words(100_000).unwrap(), "Cien Mil");
        assert_eq!(to_words(1_000_000).unwrap(), "Un Millón");
        assert_eq!(to_words(2_500_000).unwrap(), "Dos Millones Quinientos Mil");
        assert_eq!(
            to_words(999_999_999).unwrap(),
            "Novecientos Noventa y Nueve Millones Novecientos Noventa y Nueve Mil \
             Novecientos Noventa y Nueve"
        );
    }

    #[test]
    fn negatives_and_range() {
        assert_eq!(to_words(-15).unwrap(), "Menos Quince");
        assert!(matches!(
            to_words(1_000_000_000),
            Err(PliegoError::InvalidAmount(_))
        ));
        assert!(to_words(-1_000_000_000).is_err());
    }

    #[test]
    fn legal_line() {
        assert_eq!(
            amount_in_words(1234.5, "Bolivianos").unwrap(),
            "Mil Doscientos Treinta y Cuatro 50/100 Bolivianos"
        );
        assert_eq!(amount_in_words(300.0, "Bolivianos").unwrap(), "Trescientos 00/100 Bolivianos");
        assert_eq!(amount_in_words(0.995, "Bolivianos").unwrap(), "Uno 00/100 Bolivianos");
        assert_eq!(amount_in_words(-0.5, "Bs").unwrap(), "Menos Cero 50/100 Bs");
        assert!(amount_in_words(f64::NAN, "Bs").is_err());
    }
}
