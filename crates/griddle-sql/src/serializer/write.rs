use super::ident::{Ident, Qualified};
use super::{Formatter, Params, ToSql};

use crate::stmt::{Delete, Insert, Update, WriteColumn};

use griddle_core::stmt::{SqlType, Value};

impl ToSql for &Insert {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        fmt!(
            f,
            "INSERT INTO ",
            Qualified(&self.schema, &self.collection),
            " (",
        );
        for (index, column) in self.columns.iter().enumerate() {
            if index > 0 {
                fmt!(f, ", ");
            }
            fmt!(f, Ident(&column.name));
        }
        fmt!(f, ") VALUES (");
        for (index, column) in self.columns.iter().enumerate() {
            if index > 0 {
                fmt!(f, ", ");
            }
            write_placeholder(f, column);
        }
        fmt!(f, ")");
    }
}

impl ToSql for &Update {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        fmt!(f, "UPDATE ", Qualified(&self.schema, &self.collection), " SET ");
        for (index, column) in self.assignments.iter().enumerate() {
            if index > 0 {
                fmt!(f, ", ");
            }
            fmt!(f, Ident(&column.name), " = ");
            write_placeholder(f, column);
        }
        // The identity placeholder is always the last bound parameter.
        fmt!(f, " WHERE ", Ident(&self.identity.name), " = ");
        let placeholder = f.push(&Value::Null);
        f.record(&self.identity.name, &placeholder);
        fmt!(f, placeholder);
    }
}

impl ToSql for &Delete {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        fmt!(
            f,
            "DELETE FROM ",
            Qualified(&self.schema, &self.collection),
            " WHERE ",
            Ident(&self.identity.name),
            " IN (",
        );
        for index in 0..self.id_count {
            if index > 0 {
                fmt!(f, ", ");
            }
            let placeholder = f.push(&Value::Null);
            if index == 0 {
                f.record(&self.identity.name, &placeholder);
            }
            fmt!(f, placeholder);
        }
        fmt!(f, ")");
    }
}

/// A value placeholder wrapped for the column's type: JSON documents are
/// cast on the way in, geometries arrive as WKT.
fn write_placeholder<T: Params>(f: &mut Formatter<'_, T>, column: &WriteColumn) {
    let placeholder = f.push(&Value::Null);
    f.record(&column.name, &placeholder);
    match column.ty {
        SqlType::Json => fmt!(f, "to_json(", placeholder, "::json)"),
        SqlType::Geometry => fmt!(f, "ST_GeomFromText(", placeholder, ")"),
        SqlType::F64 => fmt!(f, placeholder, "::float8"),
        _ => fmt!(f, placeholder),
    }
}
