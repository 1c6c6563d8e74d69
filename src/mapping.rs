use crate::error::ImportError;
use crate::sheet::{cell_position, letter_to_index, SheetInfo};
use crate::value::{coerce, DateFormat, FieldType, Value};

/// Column designator of a mapping entry: a spreadsheet letter or a 0-based
/// index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnRef {
    Letter(String),
    Index(usize),
}

impl From<&str> for ColumnRef {
    fn from(letter: &str) -> Self {
        Self::Letter(letter.to_owned())
    }
}

impl From<String> for ColumnRef {
    fn from(letter: String) -> Self {
        Self::Letter(letter)
    }
}

impl From<usize> for ColumnRef {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Letter(letter) => f.write_str(letter),
            Self::Index(index) => write!(f, "{}", index),
        }
    }
}

impl ColumnRef {
    /// Resolves the designator to a 0-based index within the sheet bounds.
    fn resolve(&self, sheet_name: &str, sheet: &SheetInfo) -> Result<usize, ImportError> {
        let index = match self {
            Self::Letter(letter) => letter_to_index(letter),
            Self::Index(index) => Some(*index),
        };
        index
            .filter(|index| (sheet.first_column..=sheet.last_column).contains(index))
            .ok_or_else(|| ImportError::ColumnOutOfRange {
                column: self.to_string(),
                sheet: sheet_name.to_owned(),
            })
    }
}

/// One field declaration: the column to read, the target type, and the
/// optional calendar rendering and uniqueness flag.
#[derive(Clone, Debug)]
pub struct MappingEntry {
    column: ColumnRef,
    kind: String,
    format: Option<String>,
    strftime: Option<String>,
    unique: bool,
}

impl MappingEntry {
    /// Declares an entry reading `column` as `kind`.
    /// Type tokens are validated when the mapping is compiled.
    pub fn new(column: impl Into<ColumnRef>, kind: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            kind: kind.into(),
            format: None,
            strftime: None,
            unique: false,
        }
    }

    /// Renders a `string` field through a calendar parse
    /// (`"date"` or `"date_time"`).
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Overrides the strftime pattern used by `format`.
    pub fn strftime(mut self, pattern: impl Into<String>) -> Self {
        self.strftime = Some(pattern.into());
        self
    }

    /// Tracks duplicate values of this field during reads.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// Declarative field-to-column specification.
/// Field declaration order is preserved and becomes array-mode output order.
#[derive(Clone, Debug, Default)]
pub struct Mapping {
    fields: Vec<(String, MappingEntry)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field declaration.
    pub fn field(mut self, name: impl Into<String>, entry: MappingEntry) -> Self {
        self.fields.push((name.into(), entry));
        self
    }
}

/// A compiled extraction rule with everything resolved.
#[derive(Clone, Debug)]
pub(crate) struct ResolvedRule {
    pub(crate) field: String,
    pub(crate) column: usize,
    pub(crate) kind: FieldType,
    pub(crate) format: Option<DateFormat>,
    pub(crate) strftime: Option<String>,
    pub(crate) unique: bool,
}

impl ResolvedRule {
    /// Coerces a raw cell for this rule, naming the field, position, and
    /// raw text on failure. `row` is the 0-based physical row index.
    pub(crate) fn apply(&self, raw: &Value, row: usize) -> Result<Value, ImportError> {
        coerce(raw, self.kind, self.format, self.strftime.as_deref()).ok_or_else(|| {
            ImportError::TypeCast {
                field: self.field.to_owned(),
                kind: self.kind.as_str(),
                value: raw.to_string(),
                position: cell_position(row, self.column),
            }
        })
    }
}

/// Compiles a mapping against the active sheet's bounds.
///
/// Every entry resolves its column (out of bounds or unresolvable letters
/// fail here, not at read time) and its type and format tokens. Rule order
/// follows the declaration order.
pub(crate) fn compile(
    mapping: &Mapping,
    sheet_name: &str,
    sheet: &SheetInfo,
) -> Result<Vec<ResolvedRule>, ImportError> {
    mapping
        .fields
        .iter()
        .map(|(name, entry)| {
            Ok(ResolvedRule {
                field: name.to_owned(),
                column: entry.column.resolve(sheet_name, sheet)?,
                kind: FieldType::parse(&entry.kind)?,
                format: entry
                    .format
                    .as_deref()
                    .map(DateFormat::parse)
                    .transpose()?,
                strftime: entry.strftime.clone(),
                unique: entry.unique,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> SheetInfo {
        SheetInfo::from_counts(10, 8)
    }

    #[test]
    fn compiles_in_declaration_order() {
        let mapping = Mapping::new()
            .field("Index", MappingEntry::new("A", "integer"))
            .field("Age", MappingEntry::new(5, "integer"))
            .field("Country", MappingEntry::new("E", "string").unique());
        let rules = compile(&mapping, "Sheet1", &sheet()).unwrap();

        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].field, "Index");
        assert_eq!(rules[0].column, 0);
        assert_eq!(rules[0].kind, FieldType::Integer);
        assert_eq!(rules[1].column, 5);
        assert_eq!(rules[2].column, 4);
        assert!(rules[2].unique);
        assert!(!rules[1].unique);
    }

    #[test]
    fn compiles_formats() {
        let mapping = Mapping::new().field(
            "Date",
            MappingEntry::new(6, "string")
                .format("date_time")
                .strftime("%Y-%m-%d %H:%M:%S"),
        );
        let rules = compile(&mapping, "Sheet1", &sheet()).unwrap();

        assert_eq!(rules[0].format, Some(DateFormat::DateTime));
        assert_eq!(rules[0].strftime.as_deref(), Some("%Y-%m-%d %H:%M:%S"));
    }

    #[test]
    fn rejects_unknown_type() {
        let mapping = Mapping::new().field("Id", MappingEntry::new("A", "decimal"));

        assert!(matches!(
            compile(&mapping, "Sheet1", &sheet()),
            Err(ImportError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn rejects_out_of_range_column() {
        let mapping = Mapping::new().field("Id", MappingEntry::new("Z", "integer"));

        assert!(matches!(
            compile(&mapping, "Sheet1", &sheet()),
            Err(ImportError::ColumnOutOfRange { .. })
        ));

        let mapping = Mapping::new().field("Id", MappingEntry::new(8, "integer"));
        assert!(matches!(
            compile(&mapping, "Sheet1", &sheet()),
            Err(ImportError::ColumnOutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_unresolvable_letter() {
        let mapping = Mapping::new().field("Id", MappingEntry::new("A1", "integer"));

        assert!(matches!(
            compile(&mapping, "Sheet1", &sheet()),
            Err(ImportError::ColumnOutOfRange { .. })
        ));
    }

    #[test]
    fn cast_error_names_field_and_position() {
        let mapping = Mapping::new().field("Age", MappingEntry::new("F", "integer"));
        let rules = compile(&mapping, "Sheet1", &sheet()).unwrap();

        let error = rules[0]
            .apply(&Value::String("unknown".to_owned()), 3)
            .unwrap_err();
        match error {
            ImportError::TypeCast {
                field,
                kind,
                value,
                position,
            } => {
                assert_eq!(field, "Age");
                assert_eq!(kind, "integer");
                assert_eq!(value, "unknown");
                assert_eq!(position, "F4");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
