use griddle_core::stmt::Value as CoreValue;
use griddle_core::{Error, Result};

use chrono::{NaiveDate, NaiveDateTime};
use postgres_types::{private::BytesMut, IsNull, ToSql, Type};
use tokio_postgres::Row;

/// Binds a [`griddle_core::stmt::Value`] as a statement parameter.
///
/// Placeholder types are inferred by the server from the statement context,
/// so a single value variant may meet several wire types; integer variants
/// widen as needed. NULL satisfies any inferred type.
#[derive(Debug)]
pub(crate) struct BindValue<'a>(pub &'a CoreValue);

impl ToSql for BindValue<'_> {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> std::result::Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self.0 {
            CoreValue::Null => Ok(IsNull::Yes),
            CoreValue::Bool(value) => value.to_sql(ty, out),
            CoreValue::I16(value) => match *ty {
                Type::INT2 => value.to_sql(ty, out),
                Type::INT4 => (*value as i32).to_sql(ty, out),
                Type::INT8 => (*value as i64).to_sql(ty, out),
                _ => Err(mismatch(self.0, ty)),
            },
            CoreValue::I32(value) => match *ty {
                Type::INT4 => value.to_sql(ty, out),
                Type::INT8 => (*value as i64).to_sql(ty, out),
                _ => Err(mismatch(self.0, ty)),
            },
            CoreValue::I64(value) => match *ty {
                Type::INT8 => value.to_sql(ty, out),
                Type::INT4 => i32::try_from(*value)
                    .map_err(|_| mismatch(self.0, ty))?
                    .to_sql(ty, out),
                _ => Err(mismatch(self.0, ty)),
            },
            CoreValue::F64(value) => match *ty {
                Type::FLOAT8 => value.to_sql(ty, out),
                Type::FLOAT4 => (*value as f32).to_sql(ty, out),
                _ => Err(mismatch(self.0, ty)),
            },
            CoreValue::String(value) => value.to_sql(ty, out),
            CoreValue::Geometry(value) => value.to_sql(ty, out),
            CoreValue::Timestamp(value) => value.to_sql(ty, out),
            CoreValue::Date(value) => value.to_sql(ty, out),
            CoreValue::Json(value) => match *ty {
                // json is raw text on the wire; jsonb adds a version byte
                Type::JSON => {
                    out.extend_from_slice(value.as_bytes());
                    Ok(IsNull::No)
                }
                Type::JSONB => {
                    out.extend_from_slice(&[1]);
                    out.extend_from_slice(value.as_bytes());
                    Ok(IsNull::No)
                }
                _ => value.to_sql(ty, out),
            },
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // NULL must bind against whatever type the server inferred; the
        // per-variant match reports real mismatches.
        true
    }

    postgres_types::to_sql_checked!();
}

fn mismatch(value: &CoreValue, ty: &Type) -> Box<dyn std::error::Error + Sync + Send> {
    format!("cannot bind value {value:?} as {ty}").into()
}

/// Converts one column of a result row back into a core value. Covers the
/// types that can appear in identity columns and introspection queries.
pub(crate) fn from_row(row: &Row, index: usize) -> Result<CoreValue> {
    let ty = row.columns()[index].type_();

    let value = if *ty == Type::BOOL {
        row.get::<_, Option<bool>>(index)
            .map_or(CoreValue::Null, CoreValue::Bool)
    } else if *ty == Type::INT2 {
        row.get::<_, Option<i16>>(index)
            .map_or(CoreValue::Null, CoreValue::I16)
    } else if *ty == Type::INT4 {
        row.get::<_, Option<i32>>(index)
            .map_or(CoreValue::Null, CoreValue::I32)
    } else if *ty == Type::INT8 {
        row.get::<_, Option<i64>>(index)
            .map_or(CoreValue::Null, CoreValue::I64)
    } else if *ty == Type::FLOAT4 {
        row.get::<_, Option<f32>>(index)
            .map_or(CoreValue::Null, |v| CoreValue::F64(v as f64))
    } else if *ty == Type::FLOAT8 {
        row.get::<_, Option<f64>>(index)
            .map_or(CoreValue::Null, CoreValue::F64)
    } else if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::BPCHAR || *ty == Type::NAME
    {
        row.get::<_, Option<String>>(index)
            .map_or(CoreValue::Null, CoreValue::String)
    } else if *ty == Type::TIMESTAMP {
        row.get::<_, Option<NaiveDateTime>>(index)
            .map_or(CoreValue::Null, CoreValue::Timestamp)
    } else if *ty == Type::DATE {
        row.get::<_, Option<NaiveDate>>(index)
            .map_or(CoreValue::Null, CoreValue::Date)
    } else {
        return Err(Error::execution(format!(
            "unsupported result column type >{ty}<"
        )));
    };

    Ok(value)
}
