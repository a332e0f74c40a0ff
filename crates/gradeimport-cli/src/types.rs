use gradeimport_model::{ImportResult, ResolutionResult, ValidationReport};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Validated {
    pub resolution: ResolutionResult,
    pub report: ValidationReport,
}

impl Validated {
    pub fn has_errors(&self) -> bool {
        self.report.summary.has_errors()
    }
}

#[derive(Debug, Serialize)]
pub struct Imported {
    pub resolution: ResolutionResult,
    pub report: ValidationReport,
    pub result: ImportResult,
}
