//! Mapping from language-level logical types to Oracle column types.
//!
//! The static table holds one template per logical type. Templates carry
//! `{0}` and `{1}` placeholders which are filled with `(max_length,
//! min_length)` after the Oracle-specific overrides in [`column_type`] have
//! adjusted them.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// RAW columns longer than this become BLOB.
pub const MAX_RAW_LENGTH: i32 = 2000;

/// NVARCHAR2 columns longer than this become NCLOB.
pub const MAX_NVARCHAR_LENGTH: i32 = 1024;

/// Length used for strings declared without one.
pub const DEFAULT_STRING_LENGTH: i32 = 50;

/// Precision and scale used for decimals declared without either.
pub const DEFAULT_DECIMAL_PRECISION: i32 = 18;
pub const DEFAULT_DECIMAL_SCALE: i32 = 7;

/// Precision used for decimals declared with a scale only.
pub const MAX_DECIMAL_PRECISION: i32 = 38;

/// Language-native scalar kinds a model column can be declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalType {
    #[serde(alias = "int", alias = "i32")]
    Int32,
    #[serde(alias = "long", alias = "i64")]
    Int64,
    #[serde(alias = "short", alias = "i16")]
    Int16,
    #[serde(alias = "u8")]
    Byte,
    #[serde(alias = "boolean")]
    Bool,
    Char,
    CharArray,
    Decimal,
    #[serde(alias = "float", alias = "f32")]
    Float32,
    #[serde(alias = "double", alias = "f64")]
    Float64,
    #[serde(alias = "datetime")]
    DateTime,
    #[serde(alias = "datetimeoffset")]
    DateTimeOffset,
    #[serde(alias = "timespan")]
    TimeSpan,
    #[serde(alias = "uuid")]
    Guid,
    String,
    #[serde(alias = "binary")]
    Bytes,
    #[serde(alias = "isize")]
    IntPtr,
    Enum,
}

impl LogicalType {
    /// Every logical type, in declaration order.
    pub const ALL: [LogicalType; 18] = [
        LogicalType::Int32,
        LogicalType::Int64,
        LogicalType::Int16,
        LogicalType::Byte,
        LogicalType::Bool,
        LogicalType::Char,
        LogicalType::CharArray,
        LogicalType::Decimal,
        LogicalType::Float32,
        LogicalType::Float64,
        LogicalType::DateTime,
        LogicalType::DateTimeOffset,
        LogicalType::TimeSpan,
        LogicalType::Guid,
        LogicalType::String,
        LogicalType::Bytes,
        LogicalType::IntPtr,
        LogicalType::Enum,
    ];

    /// Snake-case name as used in model files.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalType::Int32 => "int32",
            LogicalType::Int64 => "int64",
            LogicalType::Int16 => "int16",
            LogicalType::Byte => "byte",
            LogicalType::Bool => "bool",
            LogicalType::Char => "char",
            LogicalType::CharArray => "char_array",
            LogicalType::Decimal => "decimal",
            LogicalType::Float32 => "float32",
            LogicalType::Float64 => "float64",
            LogicalType::DateTime => "date_time",
            LogicalType::DateTimeOffset => "date_time_offset",
            LogicalType::TimeSpan => "time_span",
            LogicalType::Guid => "guid",
            LogicalType::String => "string",
            LogicalType::Bytes => "bytes",
            LogicalType::IntPtr => "int_ptr",
            LogicalType::Enum => "enum",
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicalType {
    type Err = SchemaError;

    /// Accepts the same spellings as model files, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        serde_yaml::from_str::<LogicalType>(&normalized)
            .map_err(|_| SchemaError::Config(format!("unknown logical type: {}", s)))
    }
}

/// The static logical type → Oracle template table, built on first use.
static TYPE_MAP: LazyLock<HashMap<LogicalType, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        (LogicalType::Int32, "NUMBER(11, 0)"),
        (LogicalType::IntPtr, "NUMBER(11, 0)"),
        (LogicalType::Int64, "NUMBER(19, 0)"),
        (LogicalType::Int16, "NUMBER(5, 0)"),
        (LogicalType::Byte, "NUMBER(3, 0)"),
        (LogicalType::Bool, "NUMBER(1,0)"),
        (LogicalType::Char, "CHAR(1)"),
        (LogicalType::CharArray, "CHAR({0})"),
        (LogicalType::Decimal, "NUMBER({0},{1})"),
        (LogicalType::Float32, "BINARY_FLOAT"),
        (LogicalType::Float64, "BINARY_DOUBLE"),
        (LogicalType::DateTime, "TIMESTAMP(6)"),
        (LogicalType::TimeSpan, "TIMESTAMP(6)"),
        (LogicalType::DateTimeOffset, "TIMESTAMP (7) WITH TIME ZONE"),
        (LogicalType::Guid, "VARCHAR2(50)"),
        (LogicalType::String, "NVARCHAR2({0})"),
        (LogicalType::Bytes, "RAW({0})"),
    ])
});

/// Raw template for a logical type, without overrides applied.
pub fn template(logical: LogicalType) -> Option<&'static str> {
    TYPE_MAP.get(&logical).copied()
}

/// Map a logical type to an Oracle column type.
///
/// Returns `None` when the type has no Oracle representation; callers decide
/// whether that is fatal.
pub fn column_type(logical: LogicalType, max_length: i32, min_length: i32) -> Option<String> {
    let mut logical = logical;
    let mut max_length = max_length;
    let mut min_length = min_length;
    let mut template_override: Option<&'static str> = None;

    match logical {
        LogicalType::Enum => logical = LogicalType::Int32,
        LogicalType::Bytes => {
            if max_length <= 0 || max_length > MAX_RAW_LENGTH {
                template_override = Some("BLOB");
            }
        }
        LogicalType::String => {
            if max_length > MAX_NVARCHAR_LENGTH {
                template_override = Some("NCLOB");
            } else if max_length <= 0 {
                max_length = DEFAULT_STRING_LENGTH;
            }
        }
        LogicalType::Decimal => {
            if max_length == 0 && min_length == 0 {
                max_length = DEFAULT_DECIMAL_PRECISION;
                min_length = DEFAULT_DECIMAL_SCALE;
            }
            if max_length <= 0 {
                max_length = MAX_DECIMAL_PRECISION;
            }
            if min_length > max_length {
                min_length = max_length - 1;
            }
        }
        _ => {}
    }

    let template = template_override.or_else(|| template(logical))?;
    Some(fill_template(template, max_length, min_length))
}

fn fill_template(template: &str, max_length: i32, min_length: i32) -> String {
    template
        .replace("{0}", &max_length.to_string())
        .replace("{1}", &min_length.to_string())
}

/// Rust types with a logical column type.
///
/// # Examples
///
/// ```
/// use ora_schema::typemap::{HasLogicalType, LogicalType};
///
/// assert_eq!(<Option<i64>>::logical_type(), LogicalType::Int64);
/// assert_eq!(String::logical_type(), LogicalType::String);
/// ```
pub trait HasLogicalType {
    fn logical_type() -> LogicalType;
}

macro_rules! impl_logical_type {
    ($($ty:ty => $logical:ident),* $(,)?) => {
        $(
            impl HasLogicalType for $ty {
                fn logical_type() -> LogicalType {
                    LogicalType::$logical
                }
            }
        )*
    };
}

impl_logical_type! {
    i32 => Int32,
    i64 => Int64,
    i16 => Int16,
    u8 => Byte,
    bool => Bool,
    char => Char,
    f32 => Float32,
    f64 => Float64,
    String => String,
    &str => String,
    Vec<u8> => Bytes,
    Vec<char> => CharArray,
    isize => IntPtr,
    chrono::NaiveDateTime => DateTime,
    chrono::DateTime<chrono::FixedOffset> => DateTimeOffset,
    chrono::Duration => TimeSpan,
    uuid::Uuid => Guid,
    rust_decimal::Decimal => Decimal,
}

impl<T: HasLogicalType> HasLogicalType for Option<T> {
    fn logical_type() -> LogicalType {
        T::logical_type()
    }
}
