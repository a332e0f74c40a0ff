//! Cell values and uploaded sheet shapes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single spreadsheet cell after parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Types a raw cell string the way spreadsheet parsers do.
    ///
    /// Blank cells become [`CellValue::Empty`], finite numbers become
    /// [`CellValue::Number`], everything else is kept as trimmed text.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => Self::Number(number),
            _ => Self::Text(trimmed.to_string()),
        }
    }

    /// True for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }

    /// True when the cell holds text rather than a number or flag.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Numeric view of the cell; numeric text is accepted.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) if number.is_finite() => Some(*number),
            Self::Text(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.as_number().is_some()
    }

    /// Display string, trimmed. Integral numbers drop the fraction.
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Bool(flag) => flag.to_string(),
            Self::Number(number) => format_number(*number),
            Self::Text(text) => text.trim().to_string(),
        }
    }

    /// Character count of the display string.
    pub fn display_len(&self) -> usize {
        self.to_display_string().chars().count()
    }
}

fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

/// One parsed source row keyed by header.
pub type SourceRow = BTreeMap<String, CellValue>;

/// Output of the file parser collaborator.
///
/// Headers are trimmed, non-empty and unique; the parser rejects anything
/// else before the sheet reaches the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadedSheet {
    pub headers: Vec<String>,
    pub rows: Vec<SourceRow>,
}

impl UploadedSheet {
    pub fn new(headers: Vec<String>, rows: Vec<SourceRow>) -> Self {
        Self { headers, rows }
    }
}

/// First `limit` non-empty values of `header`, in row order.
pub fn sample_values<'a>(rows: &'a [SourceRow], header: &str, limit: usize) -> Vec<&'a CellValue> {
    rows.iter()
        .filter_map(|row| row.get(header))
        .filter(|value| !value.is_blank())
        .take(limit)
        .collect()
}
