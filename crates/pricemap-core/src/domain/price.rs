use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// A harvested price cell: either a canonical decimal amount or the
/// explicit unavailable sentinel.
///
/// `Unavailable` is distinct from zero and from "not yet fetched" — the
/// latter is the absence of an entry in the matrix altogether.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Amount(f64),
    Unavailable,
}

impl Price {
    /// Normalize raw storefront price text into a canonical decimal.
    ///
    /// Total over any input: returns `Amount` or `Unavailable`, never panics.
    ///
    /// The cleaning pass keeps only digits, periods and commas. Two
    /// consecutive periods mean a missing markup delimiter collapsed two
    /// price fragments together, so the text is rejected outright. The
    /// trailing separator is then disambiguated positionally: a comma third
    /// from the end is the decimal separator (`1.234,56` → `1234.56`),
    /// otherwise any periods outside the final three characters are
    /// thousands separators. No locale inference happens beyond this rule;
    /// a three-or-more-digit final group parses as a grouped integer.
    pub fn parse(raw: &str) -> Self {
        let cleaned: String = raw
            .trim()
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
            .collect();

        if cleaned.contains("..") {
            return Self::Unavailable;
        }

        let mut normalized = cleaned;
        if normalized.len() >= 3 {
            let bytes = normalized.as_bytes();
            if bytes[normalized.len() - 3] == b',' {
                let head = normalized[..normalized.len() - 3].to_owned();
                let tail = normalized[normalized.len() - 2..].to_owned();
                normalized = format!("{head}.{tail}");
            }

            let split = normalized.len() - 3;
            let head: String = normalized[..split].chars().filter(|c| *c != '.').collect();
            normalized = format!("{head}{}", &normalized[split..]);
        }

        normalized.retain(|c| c != ',');
        match normalized.parse::<f64>() {
            Ok(value) if value.is_finite() => Self::Amount(value),
            _ => Self::Unavailable,
        }
    }

    pub const fn is_unavailable(self) -> bool {
        matches!(self, Self::Unavailable)
    }

    pub const fn amount(self) -> Option<f64> {
        match self {
            Self::Amount(value) => Some(value),
            Self::Unavailable => None,
        }
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Amount(value) => write!(f, "{value:.2}"),
            Self::Unavailable => f.write_str("NA"),
        }
    }
}

/// Round to two decimal places, the storefront's major-unit precision.
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
