//! Delimited-text adapter over the csv crate.

use crate::error::ImportError;
use crate::source::SourceAdapter;
use crate::value::Value;

/// Name of the single implicit sheet a delimited source exposes.
pub(crate) const DEFAULT_SHEET: &str = "default";

/// Separators considered when sniffing an unconfigured delimiter.
const SEPARATOR_CANDIDATES: [char; 4] = [',', ';', '\t', '|'];

/// Single-sheet text source with a configurable separator.
/// All cells are text; the sheet is always named `"default"`.
pub(crate) struct DelimitedSource {
    names: Vec<String>,
    records: Vec<Vec<String>>,
    columns: usize,
    col_sep: char,
}

impl DelimitedSource {
    /// Parses a delimited byte buffer.
    ///
    /// Without an explicit separator the first line is sniffed; a line
    /// carrying none of the candidate separators yields a single-column
    /// sheet with the comma default.
    pub(crate) fn open(bytes: Vec<u8>, col_sep: Option<char>) -> Result<Self, ImportError> {
        let col_sep = col_sep.unwrap_or_else(|| sniff_separator(&bytes));
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(col_sep as u8)
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes.as_slice());

        let mut records: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record?;
            records.push(record.iter().map(str::to_owned).collect());
        }
        let columns = records.iter().map(Vec::len).max().unwrap_or(0);

        Ok(Self {
            names: vec![DEFAULT_SHEET.to_owned()],
            records,
            columns,
            col_sep,
        })
    }
}

impl SourceAdapter for DelimitedSource {
    fn sheet_names(&self) -> &[String] {
        &self.names
    }

    fn select_sheet(&mut self, name: &str) -> Result<(), ImportError> {
        if name == DEFAULT_SHEET {
            Ok(())
        } else {
            Err(ImportError::SheetNotFound {
                sheet: name.to_owned(),
            })
        }
    }

    fn cell(&self, row: usize, column: usize) -> Value {
        self.records
            .get(row)
            .and_then(|record| record.get(column))
            .map(|text| Value::String(text.to_owned()))
            .unwrap_or(Value::Empty)
    }

    fn row_count(&self, _sheet: &str) -> usize {
        self.records.len()
    }

    fn col_count(&self, _sheet: &str) -> usize {
        self.columns
    }

    fn col_sep(&self) -> Option<char> {
        Some(self.col_sep)
    }
}

/// Picks the most frequent candidate separator on the first line,
/// ignoring quoted sections.
fn sniff_separator(bytes: &[u8]) -> char {
    let line = bytes.split(|byte| *byte == b'\n').next().unwrap_or(&[]);
    let mut counts = [0usize; SEPARATOR_CANDIDATES.len()];
    let mut in_quotes = false;
    for byte in line {
        match *byte {
            b'"' => in_quotes = !in_quotes,
            _ if in_quotes => (),
            byte => {
                for (index, candidate) in SEPARATOR_CANDIDATES.iter().enumerate() {
                    if byte == *candidate as u8 {
                        counts[index] += 1;
                    }
                }
            }
        }
    }
    counts
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .max_by_key(|(_, count)| **count)
        .map(|(index, _)| SEPARATOR_CANDIDATES[index])
        .unwrap_or(',')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_comma() {
        assert_eq!(sniff_separator(b"a,b,c\n1,2,3\n"), ',');
    }

    #[test]
    fn sniffs_semicolon() {
        assert_eq!(sniff_separator(b"a;b;c\n1;2;3\n"), ';');
    }

    #[test]
    fn sniffs_tab() {
        assert_eq!(sniff_separator(b"a\tb\tc\n"), '\t');
    }

    #[test]
    fn sniff_ignores_quoted_sections() {
        assert_eq!(sniff_separator(b"\"a;b;c;d\",x,y\n"), ',');
    }

    #[test]
    fn sniff_defaults_to_comma() {
        assert_eq!(sniff_separator(b"single column\n"), ',');
    }

    #[test]
    fn reads_records_and_bounds() {
        let source =
            DelimitedSource::open(b"Id,Name\n1,Dulce\n2,Mara\n".to_vec(), None).unwrap();

        assert_eq!(source.sheet_names(), ["default".to_owned()]);
        assert_eq!(source.row_count(DEFAULT_SHEET), 3);
        assert_eq!(source.col_count(DEFAULT_SHEET), 2);
        assert_eq!(source.col_sep(), Some(','));
        assert_eq!(source.cell(1, 1), Value::String("Dulce".to_owned()));
        assert_eq!(source.cell(9, 0), Value::Empty);
    }

    #[test]
    fn reads_with_explicit_tab() {
        let source =
            DelimitedSource::open(b"Id\tName\n1\tDulce\n".to_vec(), Some('\t')).unwrap();

        assert_eq!(source.col_count(DEFAULT_SHEET), 2);
        assert_eq!(source.cell(0, 1), Value::String("Name".to_owned()));
    }

    #[test]
    fn unknown_sheet_selection_fails() {
        let mut source = DelimitedSource::open(b"a,b\n".to_vec(), None).unwrap();

        assert!(source.select_sheet(DEFAULT_SHEET).is_ok());
        assert!(matches!(
            source.select_sheet("Sheet1"),
            Err(ImportError::SheetNotFound { .. })
        ));
    }
}
