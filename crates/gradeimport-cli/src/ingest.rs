//! CSV reading into an [`UploadedSheet`].

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use gradeimport_model::{CellValue, SourceRow, UploadedSheet};

const BOM: char = '\u{feff}';

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV: {source}")]
    Csv {
        #[source]
        source: csv::Error,
    },

    #[error("column {column} has a blank header")]
    BlankHeader { column: usize },

    #[error("duplicate header {header:?}")]
    DuplicateHeader { header: String },
}

impl IngestError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<csv::Error> for IngestError {
    fn from(source: csv::Error) -> Self {
        Self::Csv { source }
    }
}

pub fn read_sheet(path: &Path) -> Result<UploadedSheet, IngestError> {
    let file = File::open(path).map_err(|source| IngestError::io(path, source))?;
    read_sheet_from(file)
}

/// Parse CSV text with a header row.
///
/// Rows shorter than the header leave their trailing cells empty; rows
/// without any value are dropped.
pub fn read_sheet_from<R: Read>(reader: R) -> Result<UploadedSheet, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = clean_headers(reader.headers()?.iter())?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: SourceRow = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let value = record.get(idx).map_or(CellValue::Empty, CellValue::from_raw);
                (header.clone(), value)
            })
            .collect();
        if row.values().any(|value| !value.is_blank()) {
            rows.push(row);
        }
    }

    tracing::debug!(columns = headers.len(), rows = rows.len(), "sheet read");
    Ok(UploadedSheet::new(headers, rows))
}

fn clean_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Result<Vec<String>, IngestError> {
    let mut seen = BTreeSet::new();
    let mut headers = Vec::new();
    for (column, header) in raw.enumerate() {
        let header = header.trim_start_matches(BOM).trim();
        if header.is_empty() {
            return Err(IngestError::BlankHeader { column: column + 1 });
        }
        if !seen.insert(header.to_string()) {
            return Err(IngestError::DuplicateHeader {
                header: header.to_string(),
            });
        }
        headers.push(header.to_string());
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn types_cells() {
        let sheet = read_sheet_from("\u{feff}姓名 , 数学\n张三,95\n李四,\n".as_bytes()).unwrap();
        assert_eq!(sheet.headers, vec!["姓名", "数学"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0]["数学"], CellValue::Number(95.0));
        assert_eq!(sheet.rows[1]["数学"], CellValue::Empty);
    }

    #[test]
    fn drops_blank_rows_and_pads_short_ones() {
        let sheet = read_sheet_from("a,b,c\n1\n,,\n".as_bytes()).unwrap();
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0]["c"], CellValue::Empty);
    }

    #[test]
    fn rejects_bad_headers() {
        assert!(matches!(
            read_sheet_from("a,,c\n1,2,3\n".as_bytes()),
            Err(IngestError::BlankHeader { column: 2 })
        ));
        assert!(matches!(
            read_sheet_from("a, a\n1,2\n".as_bytes()),
            Err(IngestError::DuplicateHeader { .. })
        ));
    }
}
