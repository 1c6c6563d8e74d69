//! Workbook adapter over the calamine format readers.

use std::collections::HashMap;
use std::io::{Read, Seek};

use calamine::{Data, Ods, Range, Reader, Xls, Xlsb, Xlsx};
use chrono::DateTime;

use crate::error::ImportError;
use crate::options::Format;
use crate::source::SourceAdapter;
use crate::value::Value;

/// One sheet's cells materialized into a dense grid.
struct Grid {
    rows: Vec<Vec<Value>>,
    columns: usize,
}

impl Grid {
    fn from_range(range: &Range<Data>) -> Self {
        Self {
            rows: range
                .rows()
                .map(|row| row.iter().map(to_value).collect())
                .collect(),
            columns: range.width(),
        }
    }
}

/// Multi-sheet spreadsheet source with typed cells.
///
/// The underlying workbook is drained at open: every sheet's used range is
/// converted into a [`Value`] grid, so later cell access never touches the
/// file again.
pub(crate) struct SpreadsheetSource {
    names: Vec<String>,
    grids: HashMap<String, Grid>,
    current: String,
}

impl SpreadsheetSource {
    /// Opens a workbook in the given format from any seekable reader.
    pub(crate) fn open<R>(reader: R, format: Format) -> Result<Self, ImportError>
    where
        R: Read + Seek,
    {
        match format {
            Format::Xlsx | Format::Xlsm | Format::Xlam => Self::load(Xlsx::new(reader)?),
            Format::Xlsb => Self::load(Xlsb::new(reader)?),
            Format::Xls | Format::Xla => Self::load(Xls::new(reader)?),
            Format::Ods => Self::load(Ods::new(reader)?),
            Format::Csv | Format::Tsv => Err(ImportError::UnsupportedFileType {
                name: format.as_str().to_string(),
            }),
        }
    }

    fn load<RS, R>(mut workbook: R) -> Result<Self, ImportError>
    where
        RS: Read + Seek,
        R: Reader<RS>,
        ImportError: From<R::Error>,
    {
        let names: Vec<String> = workbook.sheet_names().to_vec();
        let mut grids = HashMap::new();
        for name in &names {
            let range = workbook.worksheet_range(name)?;
            grids.insert(name.to_owned(), Grid::from_range(&range));
        }
        let current = names.first().cloned().unwrap_or_default();
        Ok(Self {
            names,
            grids,
            current,
        })
    }
}

impl SourceAdapter for SpreadsheetSource {
    fn sheet_names(&self) -> &[String] {
        &self.names
    }

    fn select_sheet(&mut self, name: &str) -> Result<(), ImportError> {
        if self.grids.contains_key(name) {
            self.current = name.to_owned();
            Ok(())
        } else {
            Err(ImportError::SheetNotFound {
                sheet: name.to_owned(),
            })
        }
    }

    fn cell(&self, row: usize, column: usize) -> Value {
        self.grids
            .get(&self.current)
            .and_then(|grid| grid.rows.get(row))
            .and_then(|cells| cells.get(column))
            .cloned()
            .unwrap_or(Value::Empty)
    }

    fn row_count(&self, sheet: &str) -> usize {
        self.grids.get(sheet).map(|grid| grid.rows.len()).unwrap_or(0)
    }

    fn col_count(&self, sheet: &str) -> usize {
        self.grids.get(sheet).map(|grid| grid.columns).unwrap_or(0)
    }
}

/// Converts a calamine cell into a raw value.
///
/// Numeric serial date-times with no fractional day become dates; ISO
/// strings parse through RFC 3339 with a naive fallback.
fn to_value(data: &Data) -> Value {
    match data {
        Data::Empty => Value::Empty,
        Data::Bool(value) => Value::Bool(*value),
        Data::Int(value) => Value::Integer(*value),
        Data::Float(value) => Value::Float(*value),
        Data::String(value) => Value::String(value.to_owned()),
        Data::DateTime(value) => match value.as_datetime() {
            Some(datetime) if value.as_f64().fract() == 0.0 => Value::Date(datetime.date()),
            Some(datetime) => Value::DateTime(datetime),
            None => Value::Float(value.as_f64()),
        },
        Data::DateTimeIso(value) => DateTime::parse_from_rfc3339(value)
            .map(|datetime| Value::DateTime(datetime.naive_utc()))
            .or_else(|_| value.parse().map(Value::DateTime))
            .unwrap_or_else(|_| Value::String(value.to_owned())),
        Data::DurationIso(value) => Value::String(value.to_owned()),
        Data::Error(error) => Value::String(error.to_string()),
    }
}
