use super::{SqlType, Warning};
use crate::{Error, Result};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// A typed operand or bind value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean value
    Bool(bool),

    /// Signed 16-bit integer
    I16(i16),

    /// Signed 32-bit integer
    I32(i32),

    /// Signed 64-bit integer
    I64(i64),

    /// Double-precision float
    F64(f64),

    /// String value
    String(String),

    /// Timestamp without time zone
    Timestamp(NaiveDateTime),

    /// Civil date
    Date(NaiveDate),

    /// JSON document, kept as text until it reaches the database
    Json(String),

    /// Geometry in WKT form
    Geometry(String),

    /// Null value
    Null,
}

impl Value {
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) | Value::Json(v) | Value::Geometry(v) => Some(v),
            _ => None,
        }
    }

    /// Coerces a textual operand to an attribute's declared type.
    ///
    /// Fails fast on a type mismatch. Timestamps outside the representable
    /// range are clamped to the nearest bound and reported through
    /// `warnings` instead of failing.
    pub fn coerce(raw: &str, ty: &SqlType, warnings: &mut Vec<Warning>) -> Result<Value> {
        let raw = raw.trim();
        match ty {
            SqlType::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" | "t" | "1" => Ok(Value::Bool(true)),
                "false" | "f" | "0" => Ok(Value::Bool(false)),
                _ => Err(coerce_error(raw, ty)),
            },
            SqlType::I16 => raw.parse().map(Value::I16).map_err(|_| coerce_error(raw, ty)),
            SqlType::I32 => raw.parse().map(Value::I32).map_err(|_| coerce_error(raw, ty)),
            SqlType::I64 => raw.parse().map(Value::I64).map_err(|_| coerce_error(raw, ty)),
            SqlType::F64 => raw.parse().map(Value::F64).map_err(|_| coerce_error(raw, ty)),
            SqlType::Text => Ok(Value::String(raw.to_string())),
            SqlType::Timestamp => parse_timestamp(raw, warnings),
            SqlType::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| coerce_error(raw, ty)),
            SqlType::Json => Ok(Value::Json(raw.to_string())),
            SqlType::Geometry => Ok(Value::Geometry(raw.to_string())),
            SqlType::Bytes => Ok(Value::String(raw.to_string())),
            SqlType::Other(name) => Err(Error::filter(format!(
                "column type >{name}< is not supported in filters"
            ))),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::String(v) | Value::Json(v) | Value::Geometry(v) => f.write_str(v),
            Value::Timestamp(v) => write!(f, "{v}"),
            Value::Date(v) => write!(f, "{v}"),
            Value::Null => f.write_str("null"),
        }
    }
}

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

fn parse_timestamp(raw: &str, warnings: &mut Vec<Warning>) -> Result<Value> {
    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Value::Timestamp(ts));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Value::Timestamp(date.and_time(NaiveTime::MIN)));
    }
    if let Some(clamped) = clamp_out_of_range(raw) {
        warnings.push(Warning::TimestampClamped {
            raw: raw.to_string(),
        });
        return Ok(Value::Timestamp(clamped));
    }
    Err(coerce_error(raw, &SqlType::Timestamp))
}

/// Detects a date whose year falls outside the representable range and maps
/// it to the nearest bound.
fn clamp_out_of_range(raw: &str) -> Option<NaiveDateTime> {
    let (negative, rest) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() || !rest[digits.len()..].starts_with('-') {
        return None;
    }
    let year: i64 = digits.parse().ok()?;

    let out_of_range =
        year > i32::MAX as i64 || NaiveDate::from_ymd_opt(year as i32 * if negative { -1 } else { 1 }, 1, 1).is_none();
    if !out_of_range {
        return None;
    }
    Some(if negative {
        NaiveDateTime::MIN
    } else {
        NaiveDateTime::MAX
    })
}

fn coerce_error(raw: &str, ty: &SqlType) -> Error {
    Error::filter(format!("cannot coerce >{raw}< to type >{ty}<"))
}
