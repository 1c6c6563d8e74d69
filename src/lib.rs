//! # Table Import
//!
//! A library for reading tabular data files — Excel and OpenDocument
//! workbooks (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.xla`, `.xlam`, `.ods`)
//! and delimited text (`.csv`, `.tsv`) — behind one uniform [`Workbook`]
//! interface.
//!
//! ## Features
//!
//! - **Multi-format support**: workbook formats through calamine, delimited
//!   text through the csv crate, with delimiter sniffing
//! - **Sheet inspection**: per-sheet row and column bounds with
//!   spreadsheet-style column letters
//! - **Declarative mappings**: field-to-column specifications compiled into
//!   typed extraction rules
//! - **Type coercion**: string, integer, float, date, and date-time targets
//!   with strftime-controlled calendar rendering
//! - **Uniqueness tracking**: incremental duplicate bookkeeping per mapped
//!   field, observable mid-stream
//! - **Batch and streaming reads**: materialized row sequences or a per-row
//!   callback with identical semantics
//!
//! ## Example
//!
//! ```no_run
//! use table_import::{Mapping, MappingEntry, Options, ReadOptions, Workbook};
//!
//! # fn main() -> Result<(), table_import::ImportError> {
//! let mut workbook = Workbook::open("people.xls", Options::new())?;
//!
//! let mapping = Mapping::new()
//!     .field("Index", MappingEntry::new("A", "integer"))
//!     .field("Country", MappingEntry::new("E", "string").unique());
//! let rows = workbook.read(ReadOptions::new().mapping(mapping))?;
//!
//! let duplicates = &workbook.uniques()["Country"];
//! println!("{} rows, {} duplicate countries", rows.len(), duplicates.not_unique_count);
//! # Ok(())
//! # }
//! ```

mod error;
mod mapping;
mod options;
mod sheet;
mod source;
mod uniques;
mod value;
mod workbook;

pub use crate::error::ImportError;
pub use crate::mapping::{ColumnRef, Mapping, MappingEntry};
pub use crate::options::{CsvOptions, FileWarning, Format, Options, SheetSelector};
pub use crate::sheet::SheetInfo;
pub use crate::uniques::FieldUniques;
pub use crate::value::{FieldType, Value};
pub use crate::workbook::{
    MappingType, PreviewOptions, ReadOptions, Row, Workbook, WorkbookInfo,
};
