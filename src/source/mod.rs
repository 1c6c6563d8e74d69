//! Source adapters normalizing heterogeneous tabular files into a single
//! row-iteration contract.
//!
//! Two variants implement the contract: [`SpreadsheetSource`] for workbook
//! formats read through calamine, and [`DelimitedSource`] for separator-based
//! text read through the csv crate. Everything above the adapters depends
//! only on the [`SourceAdapter`] trait, never on the variant.

pub(crate) mod delimited;
pub(crate) mod spreadsheet;

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

use crate::error::ImportError;
use crate::options::Format;
use crate::value::Value;

pub(crate) use delimited::DelimitedSource;
pub(crate) use spreadsheet::SpreadsheetSource;

/// Uniform access to one tabular source.
///
/// Rows and columns are 0-indexed physical positions; row 0 is the header
/// line of the sheet. Counts report physical bounds, bounds interpretation
/// belongs to the sheet registry.
pub(crate) trait SourceAdapter {
    /// Names of all sheets, in source order.
    fn sheet_names(&self) -> &[String];

    /// Makes the named sheet the target of subsequent `cell` calls.
    fn select_sheet(&mut self, name: &str) -> Result<(), ImportError>;

    /// Raw value of the cell at the given physical position on the active
    /// sheet. Out-of-bounds positions read as empty.
    fn cell(&self, row: usize, column: usize) -> Value;

    /// Physical row count of the named sheet.
    fn row_count(&self, sheet: &str) -> usize;

    /// Physical column count of the named sheet.
    fn col_count(&self, sheet: &str) -> usize;

    /// Effective column separator, reported by delimited variants after
    /// any sniffing.
    fn col_sep(&self) -> Option<char> {
        None
    }
}

/// Opens a file as the adapter matching the resolved format.
pub(crate) fn open_path(
    path: &Path,
    format: Format,
    col_sep: Option<char>,
) -> Result<Box<dyn SourceAdapter>, ImportError> {
    if format.is_delimited() {
        let bytes = std::fs::read(path)?;
        Ok(Box::new(DelimitedSource::open(bytes, col_sep)?))
    } else {
        let reader = BufReader::new(File::open(path)?);
        Ok(Box::new(SpreadsheetSource::open(reader, format)?))
    }
}

/// Opens an in-memory byte buffer as the adapter matching the format.
/// Spreadsheet readers require seeking, so stream input is buffered fully
/// before parsing.
pub(crate) fn open_bytes(
    bytes: Vec<u8>,
    format: Format,
    col_sep: Option<char>,
) -> Result<Box<dyn SourceAdapter>, ImportError> {
    if format.is_delimited() {
        Ok(Box::new(DelimitedSource::open(bytes, col_sep)?))
    } else {
        Ok(Box::new(SpreadsheetSource::open(Cursor::new(bytes), format)?))
    }
}
