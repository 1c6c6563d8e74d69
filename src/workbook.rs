use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::ImportError;
use crate::mapping::{compile, Mapping, ResolvedRule};
use crate::options::{resolve_format, Options, SheetSelector};
use crate::sheet::{build_registry, SheetInfo};
use crate::source::{open_bytes, open_path, SourceAdapter};
use crate::uniques::{FieldUniques, UniquenessTracker};
use crate::value::Value;

/// Shape of mapped read results.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum MappingType {
    /// Values in declared field order
    #[default]
    Array,
    /// Field-name-keyed records
    Hash,
}

/// One emitted row: a cell array or a field-keyed record.
#[derive(Clone, Debug, PartialEq)]
pub enum Row {
    Cells(Vec<Value>),
    Record(HashMap<String, Value>),
}

impl Row {
    /// The cell array, if this row carries one.
    pub fn into_cells(self) -> Option<Vec<Value>> {
        match self {
            Self::Cells(cells) => Some(cells),
            Self::Record(_) => None,
        }
    }

    /// The field-keyed record, if this row carries one.
    pub fn into_record(self) -> Option<HashMap<String, Value>> {
        match self {
            Self::Cells(_) => None,
            Self::Record(record) => Some(record),
        }
    }
}

/// Configuration of one read pass.
#[derive(Clone, Debug, Default)]
pub struct ReadOptions {
    mapping: Option<Mapping>,
    mapping_type: MappingType,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a field mapping; without one, rows come back as raw cell
    /// arrays spanning the sheet's column bounds.
    pub fn mapping(mut self, mapping: Mapping) -> Self {
        self.mapping = Some(mapping);
        self
    }

    pub fn mapping_type(mut self, mapping_type: MappingType) -> Self {
        self.mapping_type = mapping_type;
        self
    }
}

/// Configuration of a preview.
#[derive(Clone, Debug, Default)]
pub struct PreviewOptions {
    sheet: Option<SheetSelector>,
    last_row: Option<usize>,
}

impl PreviewOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches the active sheet before previewing.
    pub fn sheet(mut self, sheet: impl Into<SheetSelector>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    /// Stops after the given data row; values past the sheet's actual
    /// last row clamp instead of failing.
    pub fn last_row(mut self, last_row: usize) -> Self {
        self.last_row = Some(last_row);
        self
    }
}

/// Snapshot of the workbook's sheet metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkbookInfo {
    pub default_sheet: Option<String>,
    pub sheets_count: usize,
    pub sheets_name: Vec<String>,
    pub sheet_current: String,
    pub sheets: HashMap<String, SheetInfo>,
}

/// A tabular source opened behind one uniform interface.
///
/// Construction resolves the source format, loads the sheet registry, and
/// pins the active sheet. `preview` and `read` then work against the active
/// sheet; mapped reads additionally maintain the uniqueness records exposed
/// by [`Workbook::uniques`].
pub struct Workbook {
    source: Box<dyn SourceAdapter>,
    registry: Vec<(String, SheetInfo)>,
    current_sheet: String,
    default_sheet: Option<String>,
    options: Options,
    uniques: UniquenessTracker,
}

impl Workbook {
    /// Opens a file. The format comes from the path extension unless the
    /// `extension` option overrides it.
    pub fn open(path: impl AsRef<Path>, options: Options) -> Result<Self, ImportError> {
        let path = path.as_ref();
        let format = resolve_format(Some(path), &options)?;
        let source = open_path(path, format, options.csv_options.col_sep)?;
        Self::assemble(source, options)
    }

    /// Opens an in-memory stream. Streams carry no filename to sniff, so
    /// the `extension` option is required.
    pub fn from_reader(mut reader: impl Read, options: Options) -> Result<Self, ImportError> {
        let format = resolve_format(None, &options)?;
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let source = open_bytes(bytes, format, options.csv_options.col_sep)?;
        Self::assemble(source, options)
    }

    #[cfg(test)]
    pub(crate) fn from_source(
        source: Box<dyn SourceAdapter>,
        options: Options,
    ) -> Result<Self, ImportError> {
        Self::assemble(source, options)
    }

    fn assemble(
        source: Box<dyn SourceAdapter>,
        mut options: Options,
    ) -> Result<Self, ImportError> {
        let registry = build_registry(source.as_ref());
        if let Some(col_sep) = source.col_sep() {
            options.csv_options.col_sep = Some(col_sep);
        }
        let default_sheet = options
            .default_sheet
            .as_ref()
            .map(|selector| resolve_selector(&registry, selector))
            .transpose()?;
        let current_sheet = default_sheet
            .clone()
            .or_else(|| registry.first().map(|(name, _)| name.to_owned()))
            .ok_or_else(|| ImportError::SheetNotFound {
                sheet: "1".to_string(),
            })?;
        let mut workbook = Self {
            source,
            registry,
            current_sheet,
            default_sheet,
            options,
            uniques: UniquenessTracker::default(),
        };
        workbook.source.select_sheet(&workbook.current_sheet)?;
        Ok(workbook)
    }

    /// The resolved configuration, with effective values filled in.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Sheet metadata. A configured default sheet restricts the view to
    /// that single sheet.
    pub fn info(&self) -> WorkbookInfo {
        let sheets = self
            .registry
            .iter()
            .filter(|(name, _)| {
                self.default_sheet
                    .as_deref()
                    .map(|default| default == name)
                    .unwrap_or(true)
            })
            .map(|(name, info)| (name.to_owned(), info.clone()))
            .collect();
        WorkbookInfo {
            default_sheet: self.default_sheet.clone(),
            sheets_count: self.registry.len(),
            sheets_name: self
                .registry
                .iter()
                .map(|(name, _)| name.to_owned())
                .collect(),
            sheet_current: self.current_sheet.to_owned(),
            sheets,
        }
    }

    /// Uniqueness records of the current or last mapped read pass,
    /// keyed by field name.
    pub fn uniques(&self) -> &HashMap<String, FieldUniques> {
        self.uniques.fields()
    }

    /// Raw rows of the active sheet, without coercion.
    pub fn preview(&mut self, options: PreviewOptions) -> Result<Vec<Vec<Value>>, ImportError> {
        if let Some(selector) = &options.sheet {
            let name = resolve_selector(&self.registry, selector)?;
            self.source.select_sheet(&name)?;
            self.current_sheet = name;
        }
        let info = self.active_info()?.clone();
        let last_row = options
            .last_row
            .map(|last_row| last_row.min(info.last_row))
            .unwrap_or(info.last_row);

        let mut rows = Vec::new();
        for row in info.first_row..=last_row {
            rows.push(
                (info.first_column..=info.last_column)
                    .map(|column| self.source.cell(row, column))
                    .collect(),
            );
        }
        Ok(rows)
    }

    /// Reads the active sheet into a materialized row sequence.
    ///
    /// With a mapping, each row passes through the compiled rules (coercion
    /// plus uniqueness bookkeeping); without one, rows are raw cell arrays
    /// with numbers widened to floats. An error mid-scan aborts the pass.
    pub fn read(&mut self, options: ReadOptions) -> Result<Vec<Row>, ImportError> {
        let mut rows = Vec::new();
        self.scan(&options, &mut |row, _uniques| {
            rows.push(row);
            Ok(())
        })?;
        Ok(rows)
    }

    /// Streams the active sheet through a per-row handler, in row order.
    ///
    /// The handler also receives the uniqueness records, already updated
    /// for the delivered row; bookkeeping matches batch `read` exactly.
    /// A handler error halts the scan, leaving already-delivered rows with
    /// the caller.
    pub fn read_each(
        &mut self,
        options: ReadOptions,
        mut handler: impl FnMut(Row, &HashMap<String, FieldUniques>) -> Result<(), ImportError>,
    ) -> Result<(), ImportError> {
        self.scan(&options, &mut handler)
    }

    fn scan(
        &mut self,
        options: &ReadOptions,
        sink: &mut dyn FnMut(Row, &HashMap<String, FieldUniques>) -> Result<(), ImportError>,
    ) -> Result<(), ImportError> {
        let info = self.active_info()?.clone();
        match &options.mapping {
            None => {
                for row in info.first_row..=info.last_row {
                    let cells = (info.first_column..=info.last_column)
                        .map(|column| widen_number(self.source.cell(row, column)))
                        .collect();
                    sink(Row::Cells(cells), self.uniques.fields())?;
                }
            }
            Some(mapping) => {
                let rules = compile(mapping, &self.current_sheet, &info)?;
                self.uniques = UniquenessTracker::new(&rules);
                for row in info.first_row..=info.last_row {
                    let emitted = self.emit_row(&rules, row, options.mapping_type)?;
                    sink(emitted, self.uniques.fields())?;
                }
            }
        }
        Ok(())
    }

    /// Applies every rule to one row, in declared order, updating the
    /// uniqueness records field by field.
    fn emit_row(
        &mut self,
        rules: &[ResolvedRule],
        row: usize,
        mapping_type: MappingType,
    ) -> Result<Row, ImportError> {
        let mut values = Vec::with_capacity(rules.len());
        for rule in rules {
            let value = rule.apply(&self.source.cell(row, rule.column), row)?;
            self.uniques.record(&rule.field, &value, row);
            values.push((rule.field.to_owned(), value));
        }
        Ok(match mapping_type {
            MappingType::Array => Row::Cells(values.into_iter().map(|(_, value)| value).collect()),
            MappingType::Hash => Row::Record(values.into_iter().collect()),
        })
    }

    fn active_info(&self) -> Result<&SheetInfo, ImportError> {
        self.registry
            .iter()
            .find(|(name, _)| name == &self.current_sheet)
            .map(|(_, info)| info)
            .ok_or_else(|| ImportError::SheetNotFound {
                sheet: self.current_sheet.to_owned(),
            })
    }
}

/// Resolves a sheet selector against the registry: 1-based ordinals must
/// fall inside `[1, sheets_count]`, names must be present.
fn resolve_selector(
    registry: &[(String, SheetInfo)],
    selector: &SheetSelector,
) -> Result<String, ImportError> {
    let resolved = match selector {
        SheetSelector::Ordinal(ordinal) => (1..=registry.len())
            .contains(ordinal)
            .then(|| registry[ordinal - 1].0.to_owned()),
        SheetSelector::Name(name) => registry
            .iter()
            .any(|(sheet, _)| sheet == name)
            .then(|| name.to_owned()),
    };
    resolved.ok_or_else(|| ImportError::SheetNotFound {
        sheet: selector.to_string(),
    })
}

/// Best-effort primitive for unmapped reads: numbers come back as floats.
fn widen_number(value: Value) -> Value {
    match value {
        Value::Integer(number) => Value::Float(number as f64),
        other => other,
    }
}
