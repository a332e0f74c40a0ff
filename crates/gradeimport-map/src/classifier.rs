//! Content-based guesses for headers the matcher could not place.

use gradeimport_model::{CellValue, SourceRow, custom_key, sample_values};
use serde::{Deserialize, Serialize};

/// Number of non-empty values inspected per column.
pub const SAMPLE_SIZE: usize = 5;

const NAME_MAX_AVG_LEN: f64 = 10.0;
const NAME_CONFIDENCE: f64 = 0.4;
const TOTAL_RANGE: (f64, f64) = (50.0, 150.0);
const TOTAL_CONFIDENCE: f64 = 0.3;
const SUBJECT_RANGE: (f64, f64) = (30.0, 100.0);
const SUBJECT_CONFIDENCE: f64 = 0.3;

/// Outcome of [`classify`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub target: Option<String>,
    pub confidence: f64,
}

impl Classification {
    pub fn none() -> Self {
        Self {
            target: None,
            confidence: 0.0,
        }
    }

    fn guess(target: impl Into<String>, confidence: f64) -> Self {
        Self {
            target: Some(target.into()),
            confidence,
        }
    }
}

/// First [`SAMPLE_SIZE`] non-empty values of a column.
pub fn column_samples<'a>(rows: &'a [SourceRow], header: &str) -> Vec<&'a CellValue> {
    sample_values(rows, header, SAMPLE_SIZE)
}

/// Guess a target from a column's values.
///
/// Short text looks like a name; numbers peaking in `[50, 150]` look like
/// a total; numbers peaking in `[30, 100]` look like a subject score and
/// become a `custom_` target named after the header.
pub fn classify(header: &str, samples: &[&CellValue]) -> Classification {
    if samples.is_empty() {
        return Classification::none();
    }

    let all_text = samples.iter().all(|value| value.is_text());
    let numbers: Vec<f64> = samples.iter().filter_map(|value| value.as_number()).collect();
    let all_numeric = numbers.len() == samples.len();

    if all_text && !all_numeric {
        let total_len: usize = samples.iter().map(|value| value.display_len()).sum();
        let avg_len = total_len as f64 / samples.len() as f64;
        if avg_len <= NAME_MAX_AVG_LEN {
            return Classification::guess("name", NAME_CONFIDENCE);
        }
    }

    if all_numeric {
        let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if in_range(max, TOTAL_RANGE) {
            return Classification::guess("total_score", TOTAL_CONFIDENCE);
        }
        if in_range(max, SUBJECT_RANGE) {
            return Classification::guess(custom_key(header), SUBJECT_CONFIDENCE);
        }
    }

    Classification::none()
}

fn in_range(value: f64, (low, high): (f64, f64)) -> bool {
    value >= low && value <= high
}
