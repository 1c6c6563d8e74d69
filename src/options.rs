use std::path::Path;

use crate::error::ImportError;

/// Supported source formats.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Format {
    /// Excel 2007+ format
    Xlsx,
    /// Excel 2007+ macro-enabled format
    Xlsm,
    /// Excel add-in format
    Xlam,
    /// Excel Binary format
    Xlsb,
    /// Legacy Excel format
    Xls,
    /// Legacy Excel add-in format
    Xla,
    /// OpenDocument spreadsheet format
    Ods,
    /// Comma-separated (or sniffed-separator) text
    Csv,
    /// Tab-separated text
    Tsv,
}

impl Format {
    /// Returns the extension token for the format.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Xlsm => "xlsm",
            Self::Xlam => "xlam",
            Self::Xlsb => "xlsb",
            Self::Xls => "xls",
            Self::Xla => "xla",
            Self::Ods => "ods",
            Self::Csv => "csv",
            Self::Tsv => "tsv",
        }
    }

    /// Parses an extension token, case-insensitively.
    pub fn parse(token: &str) -> Result<Self, ImportError> {
        match token.to_ascii_lowercase().as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "xlsm" => Ok(Self::Xlsm),
            "xlam" => Ok(Self::Xlam),
            "xlsb" => Ok(Self::Xlsb),
            "xls" => Ok(Self::Xls),
            "xla" => Ok(Self::Xla),
            "ods" => Ok(Self::Ods),
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            _ => Err(ImportError::UnsupportedFileType {
                name: token.to_string(),
            }),
        }
    }

    /// Detects a format from a file path's extension.
    pub(crate) fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|extension| extension.to_str())
            .and_then(|extension| Self::parse(extension).ok())
    }

    /// True for separator-based text formats.
    pub(crate) fn is_delimited(&self) -> bool {
        matches!(self, Self::Csv | Self::Tsv)
    }
}

/// Identifies a sheet by 1-based ordinal or by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SheetSelector {
    Ordinal(usize),
    Name(String),
}

impl From<usize> for SheetSelector {
    fn from(ordinal: usize) -> Self {
        Self::Ordinal(ordinal)
    }
}

impl From<&str> for SheetSelector {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for SheetSelector {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl std::fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ordinal(ordinal) => write!(f, "{}", ordinal),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// Policy applied when an explicit `extension` option disagrees with the
/// source path's own extension.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FileWarning {
    /// Fail with `UnsupportedFileType`
    Error,
    /// Log through the `log` facade and keep the explicit extension
    Warn,
    /// Keep the explicit extension silently
    #[default]
    Ignore,
}

/// Text-parsing knobs forwarded to the delimited-text adapter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CsvOptions {
    /// Column separator. Left unset, the separator is sniffed from the
    /// first line; the resolved options expose the effective value.
    pub col_sep: Option<char>,
}

impl CsvOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn col_sep(mut self, separator: char) -> Self {
        self.col_sep = Some(separator);
        self
    }
}

/// Workbook configuration. Built through the chained setters, resolved and
/// frozen when the workbook opens.
#[derive(Clone, Debug, Default)]
pub struct Options {
    pub default_sheet: Option<SheetSelector>,
    pub extension: Option<Format>,
    pub csv_options: CsvOptions,
    pub file_warning: FileWarning,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_sheet(mut self, sheet: impl Into<SheetSelector>) -> Self {
        self.default_sheet = Some(sheet.into());
        self
    }

    pub fn extension(mut self, format: Format) -> Self {
        self.extension = Some(format);
        self
    }

    pub fn csv_options(mut self, csv_options: CsvOptions) -> Self {
        self.csv_options = csv_options;
        self
    }

    pub fn file_warning(mut self, policy: FileWarning) -> Self {
        self.file_warning = policy;
        self
    }
}

/// Resolves the effective format from the source path and the options.
///
/// An explicit `extension` option wins; a disagreement with the path's own
/// extension goes through the `file_warning` policy. A pathless source
/// requires the explicit option.
pub(crate) fn resolve_format(
    path: Option<&Path>,
    options: &Options,
) -> Result<Format, ImportError> {
    let detected = path.and_then(Format::from_path);
    match (options.extension, detected) {
        (Some(explicit), Some(detected)) if explicit != detected => {
            match options.file_warning {
                FileWarning::Error => Err(ImportError::UnsupportedFileType {
                    name: path
                        .map(|path| path.display().to_string())
                        .unwrap_or_else(|| explicit.as_str().to_string()),
                }),
                FileWarning::Warn => {
                    log::warn!(
                        "extension option '{}' overrides detected '{}'",
                        explicit.as_str(),
                        detected.as_str()
                    );
                    Ok(explicit)
                }
                FileWarning::Ignore => Ok(explicit),
            }
        }
        (Some(explicit), _) => Ok(explicit),
        (None, Some(detected)) => Ok(detected),
        (None, None) => match path {
            Some(path) => Err(ImportError::UnsupportedFileType {
                name: path.display().to_string(),
            }),
            None => Err(ImportError::MissingRequiredOption {
                name: "extension".to_string(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_tokens() {
        assert_eq!(Format::parse("csv").unwrap(), Format::Csv);
        assert_eq!(Format::parse("XLSX").unwrap(), Format::Xlsx);
        assert!(matches!(
            Format::parse("png"),
            Err(ImportError::UnsupportedFileType { .. })
        ));
    }

    #[test]
    fn format_from_path() {
        assert_eq!(Format::from_path(Path::new("data/file.xls")), Some(Format::Xls));
        assert_eq!(Format::from_path(Path::new("file.TSV")), Some(Format::Tsv));
        assert_eq!(Format::from_path(Path::new("notes.rtf")), None);
        assert_eq!(Format::from_path(Path::new("bare")), None);
    }

    #[test]
    fn resolve_prefers_explicit_extension() {
        let options = Options::new().extension(Format::Csv);
        let format = resolve_format(Some(Path::new("upload.bin")), &options).unwrap();
        assert_eq!(format, Format::Csv);
    }

    #[test]
    fn resolve_requires_extension_for_streams() {
        assert!(matches!(
            resolve_format(None, &Options::new()),
            Err(ImportError::MissingRequiredOption { .. })
        ));
        assert_eq!(
            resolve_format(None, &Options::new().extension(Format::Csv)).unwrap(),
            Format::Csv
        );
    }

    #[test]
    fn resolve_rejects_unknown_path_extension() {
        assert!(matches!(
            resolve_format(Some(Path::new("document.rtf")), &Options::new()),
            Err(ImportError::UnsupportedFileType { .. })
        ));
    }

    #[test]
    fn mismatch_policy() {
        let base = Options::new().extension(Format::Csv);
        let path = Some(Path::new("table.xls"));

        assert!(matches!(
            resolve_format(path, &base.clone().file_warning(FileWarning::Error)),
            Err(ImportError::UnsupportedFileType { .. })
        ));
        assert_eq!(resolve_format(path, &base).unwrap(), Format::Csv);
    }
}
