//! Text normalization: name identity keys, date sort keys, money parsing.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Corporate suffixes that do not distinguish parties. Longer forms first
/// so that e.g. ` LTDA.` is consumed before ` LTDA`.
const CORPORATE_SUFFIXES: &[&str] = &[
    " LTDA.",
    " LTDA",
    " S/A",
    " S.A.",
    " S.A",
    " EPP",
    " ME",
    " EIRELI",
    " SOCIEDADE SIMPLES",
];

/// Normalize a party name into its identity key.
///
/// Strips diacritics, upper-cases, removes corporate suffixes and collapses
/// whitespace. The result is idempotent: normalizing a normalized name
/// changes nothing.
pub fn normalize_name(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }

    let stripped: String = name.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    let mut upper = stripped.to_uppercase();

    for suffix in CORPORATE_SUFFIXES {
        upper = upper.replace(suffix, "");
    }

    upper.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a `dd/mm/aaaa` display date into a sortable `(year, month, day)`
/// key. Empty or unparseable dates yield `(0, 0, 0)`, which sorts before
/// every real date.
pub fn date_key(date: &str) -> (u16, u8, u8) {
    let parts: Vec<&str> = date.trim().split('/').collect();
    if parts.len() != 3 {
        return (0, 0, 0);
    }

    match (
        parts[2].trim().parse::<u16>(),
        parts[1].trim().parse::<u8>(),
        parts[0].trim().parse::<u8>(),
    ) {
        (Ok(year), Ok(month), Ok(day)) => (year, month, day),
        _ => (0, 0, 0),
    }
}

/// Parse a Brazilian-format monetary display string into a numeric value.
///
/// Accepts both `R$ 10.000,00` and `R$10000.00`. Strings with no parseable
/// amount yield `0.0` so that deduplication keys never fail.
pub fn parse_brl_amount(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return 0.0;
    }

    let normalized = if cleaned.contains(',') {
        // Comma is the decimal separator, dots are grouping
        cleaned.replace('.', "").replace(',', ".")
    } else if let Some(pos) = cleaned.rfind('.') {
        if cleaned.len() - pos - 1 == 2 {
            // Trailing `.dd` is a decimal point, earlier dots are grouping
            let (int_part, frac) = cleaned.split_at(pos);
            format!("{}{}", int_part.replace('.', ""), frac)
        } else {
            cleaned.replace('.', "")
        }
    } else {
        cleaned
    };

    normalized.parse().unwrap_or(0.0)
}
