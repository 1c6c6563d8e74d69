use thiserror::Error;

/// Main error type for table imports.
/// Covers configuration and data errors raised by this crate as well as
/// failures forwarded from the underlying format libraries.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Source extension or content is not among the supported formats
    #[error("Unsupported file type '{name}'")]
    UnsupportedFileType { name: String },

    /// A stream source was given without the option required to handle it
    #[error("Missing required option '{name}'")]
    MissingRequiredOption { name: String },

    /// Requested sheet ordinal is out of range or the name is absent
    #[error("Sheet not found: {sheet}")]
    SheetNotFound { sheet: String },

    /// Mapping entry's type is not one of the supported kinds
    #[error("Unsupported mapping type '{kind}'")]
    UnsupportedType { kind: String },

    /// A cell's raw value cannot be coerced to the declared type
    #[error("Cannot cast '{value}' to {kind} for field '{field}' at {position}")]
    TypeCast {
        field: String,
        kind: &'static str,
        value: String,
        position: String,
    },

    /// A mapping column resolves outside the active sheet's bounds
    #[error("Column '{column}' out of range for sheet '{sheet}'")]
    ColumnOutOfRange { column: String, sheet: String },

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    // Format library errors
    #[error("Invalid xlsx file format: {0}")]
    XlsxError(#[from] calamine::XlsxError),

    #[error("Invalid xlsb file format: {0}")]
    XlsbError(#[from] calamine::XlsbError),

    #[error("Invalid xls file format: {0}")]
    XlsError(#[from] calamine::XlsError),

    #[error("Invalid ods file format: {0}")]
    OdsError(#[from] calamine::OdsError),

    #[error("Invalid delimited text: {0}")]
    CsvError(#[from] csv::Error),
}
