//! Column types and nullable scalar values.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A SQL Server column type.
///
/// Only the types record mappings need are modelled. Lengths of `None`
/// mean `MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    /// `BIT`
    Bit,
    /// `TINYINT` (0..=255)
    TinyInt,
    /// `SMALLINT`
    SmallInt,
    /// `INT`
    Int,
    /// `BIGINT`
    BigInt,
    /// `FLOAT`
    Float,
    /// `DECIMAL(precision, scale)`
    Decimal {
        /// Total number of digits.
        precision: u8,
        /// Digits after the decimal point.
        scale: u8,
    },
    /// `NVARCHAR(n)` or `NVARCHAR(MAX)`
    NVarChar(Option<u32>),
    /// `VARBINARY(n)` or `VARBINARY(MAX)`
    VarBinary(Option<u32>),
    /// `DATE`
    Date,
    /// `DATETIME2`
    DateTime2,
    /// `UNIQUEIDENTIFIER`
    UniqueIdentifier,
}

impl SqlType {
    /// Returns true for the integer family (`TINYINT` through `BIGINT`).
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            SqlType::TinyInt | SqlType::SmallInt | SqlType::Int | SqlType::BigInt
        )
    }

    fn integer_range(&self) -> Option<(i64, i64)> {
        match self {
            SqlType::TinyInt => Some((0, i64::from(u8::MAX))),
            SqlType::SmallInt => Some((i64::from(i16::MIN), i64::from(i16::MAX))),
            SqlType::Int => Some((i64::from(i32::MIN), i64::from(i32::MAX))),
            SqlType::BigInt => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn length(f: &mut fmt::Formatter<'_>, name: &str, len: Option<u32>) -> fmt::Result {
            match len {
                Some(n) => write!(f, "{name}({n})"),
                None => write!(f, "{name}(MAX)"),
            }
        }

        match self {
            SqlType::Bit => f.write_str("BIT"),
            SqlType::TinyInt => f.write_str("TINYINT"),
            SqlType::SmallInt => f.write_str("SMALLINT"),
            SqlType::Int => f.write_str("INT"),
            SqlType::BigInt => f.write_str("BIGINT"),
            SqlType::Float => f.write_str("FLOAT"),
            SqlType::Decimal { precision, scale } => write!(f, "DECIMAL({precision},{scale})"),
            SqlType::NVarChar(len) => length(f, "NVARCHAR", *len),
            SqlType::VarBinary(len) => length(f, "VARBINARY", *len),
            SqlType::Date => f.write_str("DATE"),
            SqlType::DateTime2 => f.write_str("DATETIME2"),
            SqlType::UniqueIdentifier => f.write_str("UNIQUEIDENTIFIER"),
        }
    }
}

/// A nullable scalar stored in a transfer buffer or table row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL `NULL`.
    Null,
    /// Boolean (`BIT`).
    Bool(bool),
    /// Any integer column.
    Int(i64),
    /// Floating point.
    Float(f64),
    /// Decimal in canonical text form, e.g. `"12.50"`.
    Decimal(String),
    /// Unicode text.
    Text(String),
    /// Binary data.
    Bytes(Vec<u8>),
    /// GUID.
    Uuid(Uuid),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time without offset.
    DateTime(NaiveDateTime),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get this value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Uuid(_) => "uuid",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
        }
    }

    /// Returns true if this value may be stored in a column of `sql_type`.
    ///
    /// `Null` is compatible with every type; nullability is checked
    /// separately by whoever owns the column.
    pub fn is_compatible_with(&self, sql_type: SqlType) -> bool {
        match (self, sql_type) {
            (Value::Null, _) => true,
            (Value::Bool(_), SqlType::Bit) => true,
            (Value::Int(n), SqlType::Bit) => *n == 0 || *n == 1,
            (Value::Int(n), t) if t.is_integer() => t
                .integer_range()
                .is_some_and(|(min, max)| (min..=max).contains(n)),
            (Value::Int(_), SqlType::Float) => true,
            (Value::Int(n), SqlType::Decimal { precision, scale }) => {
                decimal_fits(&n.to_string(), precision, scale)
            }
            (Value::Float(_), SqlType::Float | SqlType::Decimal { .. }) => true,
            (Value::Decimal(d), SqlType::Decimal { precision, scale }) => {
                decimal_fits(d, precision, scale)
            }
            (Value::Text(s), SqlType::NVarChar(len)) => {
                len.map_or(true, |max| s.chars().count() <= max as usize)
            }
            (Value::Bytes(b), SqlType::VarBinary(len)) => {
                len.map_or(true, |max| b.len() <= max as usize)
            }
            (Value::Uuid(_), SqlType::UniqueIdentifier) => true,
            (Value::Date(_), SqlType::Date) => true,
            (Value::Date(_) | Value::DateTime(_), SqlType::DateTime2) => true,
            _ => false,
        }
    }
}

/// Checks `[+-]digits[.digits]` against `DECIMAL(precision, scale)`.
fn decimal_fits(text: &str, precision: u8, scale: u8) -> bool {
    let unsigned = text.strip_prefix(&['-', '+'][..]).unwrap_or(text);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return false;
    }

    let whole_digits = whole.trim_start_matches('0').len();
    whole_digits <= usize::from(precision.saturating_sub(scale))
        && fraction.len() <= usize::from(scale)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{}", u8::from(*b)),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Decimal(d) => f.write_str(d),
            Value::Text(s) => write!(f, "N'{}'", s.replace('\'', "''")),
            Value::Bytes(b) => {
                f.write_str("0x")?;
                for byte in b {
                    write!(f, "{byte:02X}")?;
                }
                Ok(())
            }
            Value::Uuid(u) => write!(f, "'{u}'"),
            Value::Date(d) => write!(f, "'{}'", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "'{}'", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
        }
    }
}

macro_rules! int_from {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Int(i64::from(n))
            }
        })*
    };
}

int_from!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(f64::from(x))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Value::Uuid(u)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}
