use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt::{self, Display};

use crate::error::ImportError;

/// A single cell value, both as read from a source and after coercion.
///
/// Source adapters produce raw values (delimited text yields only `String`
/// cells, spreadsheets yield typed cells); the coercion engine maps raw
/// values into the kind declared by a mapping rule.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Absent or blank cell
    Empty,
    /// Boolean values (true/false)
    Bool(bool),
    /// 64-bit signed integers
    Integer(i64),
    /// Double precision floating point numbers
    Float(f64),
    /// Text values
    String(String),
    /// Date without time component
    Date(NaiveDate),
    /// Date and time values
    DateTime(NaiveDateTime),
}

/// Datetime patterns tried in order when parsing text cells.
const DATETIME_PATTERNS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Date patterns tried in order when parsing text cells.
/// Day-first forms follow the conventions of the supported sources.
const DATE_PATTERNS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y"];

/// Parses a text cell as a calendar date.
pub(crate) fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_PATTERNS
        .iter()
        .find_map(|pattern| NaiveDate::parse_from_str(text, pattern).ok())
}

/// Parses a text cell as a date-time, falling back to a date at midnight.
pub(crate) fn parse_datetime_text(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(datetime) = DateTime::parse_from_rfc3339(text) {
        return Some(datetime.naive_utc());
    }
    DATETIME_PATTERNS
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(text, pattern).ok())
        .or_else(|| parse_date_text(text).map(|date| date.and_time(NaiveTime::MIN)))
}

impl Value {
    /// Checks if the cell is empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Extracts a whole number from the cell.
    /// Numeric cells truncate; text parses as an integer, or as a number
    /// truncated toward zero.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Float(value) => Some(*value as i64),
            Self::String(value) => {
                let value = value.trim();
                value
                    .parse::<i64>()
                    .ok()
                    .or_else(|| value.parse::<f64>().ok().map(|number| number as i64))
            }
            _ => None,
        }
    }

    /// Extracts a floating point number from the cell.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::String(value) => value.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Extracts a calendar date from the cell.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(value) => Some(*value),
            Self::DateTime(value) => Some(value.date()),
            Self::String(value) => parse_date_text(value),
            _ => None,
        }
    }

    /// Extracts a date-time from the cell.
    /// Date-only values resolve to midnight.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Date(value) => Some(value.and_time(NaiveTime::MIN)),
            Self::DateTime(value) => Some(*value),
            Self::String(value) => parse_datetime_text(value),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Bool(value) => write!(f, "{}", value),
            Self::Integer(value) => write!(f, "{}", value),
            Self::Float(value) => write!(f, "{}", value),
            Self::String(value) => f.write_str(value),
            Self::Date(value) => write!(f, "{}", value),
            Self::DateTime(value) => write!(f, "{}", value),
        }
    }
}

/// Target types a mapped field can declare.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FieldType {
    String,
    Integer,
    Float,
    Date,
    DateTime,
}

impl FieldType {
    /// Returns the canonical token for the field type.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Date => "date",
            Self::DateTime => "date_time",
        }
    }

    /// Parses a field type from its token, case-insensitively.
    pub fn parse(name: &str) -> Result<Self, ImportError> {
        match name.to_ascii_uppercase().as_str() {
            "STRING" => Ok(Self::String),
            "INTEGER" => Ok(Self::Integer),
            "FLOAT" => Ok(Self::Float),
            "DATE" => Ok(Self::Date),
            "DATE_TIME" | "DATETIME" => Ok(Self::DateTime),
            _ => Err(ImportError::UnsupportedType {
                kind: name.to_string(),
            }),
        }
    }
}

/// Calendar rendering applied to `string` fields.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum DateFormat {
    Date,
    DateTime,
}

impl DateFormat {
    /// Default strftime pattern for the rendering.
    /// The date-time default follows RFC 3339 with a UTC suffix.
    pub(crate) const fn default_pattern(&self) -> &'static str {
        match self {
            Self::Date => "%Y-%m-%d",
            Self::DateTime => "%Y-%m-%dT%H:%M:%SZ",
        }
    }

    /// Parses a format token, case-insensitively.
    pub(crate) fn parse(name: &str) -> Result<Self, ImportError> {
        match name.to_ascii_uppercase().as_str() {
            "DATE" => Ok(Self::Date),
            "DATE_TIME" | "DATETIME" => Ok(Self::DateTime),
            _ => Err(ImportError::UnsupportedType {
                kind: name.to_string(),
            }),
        }
    }
}

/// Coerces a raw cell value into the declared target type.
///
/// Pure and stateless; returns `None` when the raw value cannot represent
/// the target type, leaving error context to the caller.
pub(crate) fn coerce(
    raw: &Value,
    kind: FieldType,
    format: Option<DateFormat>,
    strftime: Option<&str>,
) -> Option<Value> {
    match kind {
        FieldType::String => match format {
            None => Some(Value::String(raw.to_string())),
            Some(DateFormat::Date) => {
                let pattern = strftime.unwrap_or(DateFormat::Date.default_pattern());
                raw.as_date()
                    .map(|date| Value::String(date.format(pattern).to_string()))
            }
            Some(DateFormat::DateTime) => {
                let pattern = strftime.unwrap_or(DateFormat::DateTime.default_pattern());
                raw.as_datetime()
                    .map(|datetime| Value::String(datetime.format(pattern).to_string()))
            }
        },
        FieldType::Integer => raw.as_integer().map(Value::Integer),
        FieldType::Float => raw.as_float().map(Value::Float),
        FieldType::Date => raw.as_date().map(Value::Date),
        FieldType::DateTime => raw.as_datetime().map(Value::DateTime),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_as_integer() {
        assert_eq!(Value::Integer(7).as_integer(), Some(7));
        assert_eq!(Value::Float(9.0).as_integer(), Some(9));
        assert_eq!(Value::Float(9.7).as_integer(), Some(9));
        assert_eq!(Value::String("32".to_owned()).as_integer(), Some(32));
        assert_eq!(Value::String("32.5".to_owned()).as_integer(), Some(32));
        assert_eq!(Value::String("many".to_owned()).as_integer(), None);
        assert_eq!(Value::Empty.as_integer(), None);
    }

    #[test]
    fn value_as_float() {
        assert_eq!(Value::Integer(7).as_float(), Some(7.0));
        assert_eq!(Value::String("25.5".to_owned()).as_float(), Some(25.5));
        assert_eq!(Value::String("-".to_owned()).as_float(), None);
    }

    #[test]
    fn value_display() {
        assert_eq!(Value::Empty.to_string(), "");
        assert_eq!(Value::Integer(1).to_string(), "1");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::String("a".to_owned()).to_string(), "a");
    }

    #[test]
    fn parse_date_day_first() {
        let date = parse_date_text("21/05/2015").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2015, 5, 21).unwrap());

        let date = parse_date_text("2017-10-15").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2017, 10, 15).unwrap());
    }

    #[test]
    fn parse_datetime_promotes_date() {
        let datetime = parse_datetime_text("21/05/2015").unwrap();
        assert_eq!(datetime.to_string(), "2015-05-21 00:00:00");
    }

    #[test]
    fn field_type_tokens() {
        assert_eq!(FieldType::parse("integer").unwrap(), FieldType::Integer);
        assert_eq!(FieldType::parse("STRING").unwrap(), FieldType::String);
        assert_eq!(FieldType::parse("Date_Time").unwrap(), FieldType::DateTime);
        assert!(matches!(
            FieldType::parse("decimal"),
            Err(ImportError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn coerce_string_with_date_formats() {
        let raw = Value::String("21/05/2015".to_owned());

        let plain = coerce(&raw, FieldType::String, None, None).unwrap();
        assert_eq!(plain, Value::String("21/05/2015".to_owned()));

        let date = coerce(&raw, FieldType::String, Some(DateFormat::Date), None).unwrap();
        assert_eq!(date, Value::String("2015-05-21".to_owned()));

        let datetime = coerce(&raw, FieldType::String, Some(DateFormat::DateTime), None).unwrap();
        assert_eq!(datetime, Value::String("2015-05-21T00:00:00Z".to_owned()));

        let manual = coerce(
            &raw,
            FieldType::String,
            Some(DateFormat::DateTime),
            Some("%Y-%m-%d %H:%M:%S"),
        )
        .unwrap();
        assert_eq!(manual, Value::String("2015-05-21 00:00:00".to_owned()));

        let dotted = coerce(
            &raw,
            FieldType::String,
            Some(DateFormat::Date),
            Some("%Y.%m.%d"),
        )
        .unwrap();
        assert_eq!(dotted, Value::String("2015.05.21".to_owned()));
    }

    #[test]
    fn coerce_failures() {
        assert_eq!(
            coerce(&Value::String("x".to_owned()), FieldType::Integer, None, None),
            None
        );
        assert_eq!(
            coerce(
                &Value::String("not a date".to_owned()),
                FieldType::String,
                Some(DateFormat::Date),
                None
            ),
            None
        );
        assert_eq!(coerce(&Value::Bool(true), FieldType::Float, None, None), None);
    }

    #[test]
    fn coerce_calendar_kinds() {
        let raw = Value::String("16/08/2016".to_owned());
        let date = NaiveDate::from_ymd_opt(2016, 8, 16).unwrap();

        assert_eq!(coerce(&raw, FieldType::Date, None, None), Some(Value::Date(date)));
        assert_eq!(
            coerce(&raw, FieldType::DateTime, None, None),
            Some(Value::DateTime(date.and_time(NaiveTime::MIN)))
        );
        assert_eq!(
            coerce(&Value::Date(date), FieldType::DateTime, None, None),
            Some(Value::DateTime(date.and_time(NaiveTime::MIN)))
        );
    }
}
