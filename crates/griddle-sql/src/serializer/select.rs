use super::filter::Predicate;
use super::ident::{Column, Ident, Qualified};
use super::join::join_node;
use super::{Formatter, Params, ToSql};

use crate::stmt::{GeoJson, Output, Projection, Select};

use griddle_core::stmt::Value;

impl ToSql for &Select {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        match &self.output {
            Output::GeoJson(geo) => feature_collection(f, self, geo),
            Output::Unique(column) => {
                fmt!(
                    f,
                    "SELECT json_strip_nulls(array_to_json(array_agg(row_to_json(t)))) AS json FROM (",
                    "SELECT DISTINCT ",
                    Ident(column),
                    " FROM (",
                );
                inner_select(f, self);
                from_where(f, self);
                fmt!(f, ") AS u) t");
            }
            _ => {
                fmt!(
                    f,
                    "SELECT json_strip_nulls(array_to_json(array_agg(row_to_json(t)))) AS json FROM (",
                );
                inner_select(f, self);
                from_where(f, self);
                fmt!(f, ") t");
            }
        }
    }
}

/// The projection list: base columns, then one JSON value per join path.
/// Aggregated paths fold NULL (no matching rows) into an empty array.
fn inner_select<T: Params>(f: &mut Formatter<'_, T>, select: &Select) {
    if matches!(select.output, Output::Count) {
        fmt!(f, "SELECT COUNT(*) AS count");
        return;
    }

    fmt!(f, "SELECT ");
    let mut first = true;
    for projection in &select.projections {
        if !first {
            fmt!(f, ", ");
        }
        render_projection(f, select, projection);
        first = false;
    }

    for tree in &select.joins {
        let root = &tree.root;
        if !first {
            fmt!(f, ", ");
        }
        if root.aggregated {
            fmt!(
                f,
                "coalesce(",
                Ident(&root.collection),
                ", '[]'::json) AS ",
                Ident(&root.collection),
            );
        } else {
            fmt!(f, Ident(&root.collection), " AS ", Ident(&root.json_key));
        }
        first = false;
    }
}

fn render_projection<T: Params>(f: &mut Formatter<'_, T>, select: &Select, projection: &Projection) {
    match projection {
        Projection::Column { name } => {
            fmt!(f, Column(&select.base, name));
        }
        Projection::Base64 { name } => {
            fmt!(
                f,
                "ENCODE(",
                Column(&select.base, name),
                ", 'BASE64') AS ",
                Ident(name),
            );
        }
        Projection::LatLon { name } => {
            let lon = format!("{name}_lon");
            let lat = format!("{name}_lat");
            fmt!(
                f,
                "ST_X(ST_Transform(",
                Column(&select.base, name),
                ", 4674)) AS ",
                Ident(&lon),
                ", ST_Y(ST_Transform(",
                Column(&select.base, name),
                ", 4674)) AS ",
                Ident(&lat),
            );
        }
        Projection::Transform { name, code } => {
            fmt!(
                f,
                "ST_Transform(",
                Column(&select.base, name),
                ", ",
                *code,
                ") AS ",
                Ident(name),
            );
        }
    }
}

/// `FROM` through `LIMIT`. Filter placeholders are assigned left to right in
/// filter order; `offset` and `limit` always come last, in that order.
fn from_where<T: Params>(f: &mut Formatter<'_, T>, select: &Select) {
    fmt!(f, " FROM ", Qualified(&select.schema, &select.base));

    for tree in &select.joins {
        join_node(f, &select.schema, &select.base, &tree.root);
    }

    for (index, filter) in select.filters.iter().enumerate() {
        fmt!(f, if index == 0 { " WHERE " } else { " AND " });
        let predicate = Predicate {
            filter,
            base: &select.base,
        };
        fmt!(f, &predicate);
    }

    if !matches!(select.output, Output::Count) {
        if let Some(order) = &select.order {
            fmt!(
                f,
                " ORDER BY ",
                Ident(&order.attribute),
                " ",
                order.direction.as_sql(),
            );
        }
    }

    if select.paged {
        let placeholder = f.push(&Value::Null);
        f.record("offset", &placeholder);
        fmt!(f, " OFFSET ", placeholder);
    }
    if select.limited {
        let placeholder = f.push(&Value::Null);
        f.record("limit", &placeholder);
        fmt!(f, " LIMIT ", placeholder);
    }
}

/// The GeoJSON wrapper factors the filtered/ordered/paginated `FROM` clause
/// once: it feeds both the geometry projection and the correlated properties
/// subselect, which carries no `FROM` of its own.
fn feature_collection<T: Params>(f: &mut Formatter<'_, T>, select: &Select, geo: &GeoJson) {
    let target_srid = match geo.dimension {
        3 => 4979,
        _ => 4326,
    };
    let transform = geo.srid != target_srid;

    fmt!(
        f,
        "SELECT row_to_json(fc) AS json FROM (",
        "SELECT 'FeatureCollection' AS type, array_to_json(array_agg(f)) AS features FROM (",
        "SELECT 'Feature' AS type, ST_AsGeoJSON(",
    );
    if transform {
        fmt!(f, "ST_Transform(");
    }
    fmt!(f, Column(&select.base, &geo.attribute));
    if transform {
        fmt!(f, ", ", target_srid, ")");
    }
    fmt!(
        f,
        ")::json AS geometry, (SELECT json_strip_nulls(row_to_json(t)) FROM (",
    );
    inner_select(f, select);
    fmt!(f, ") AS t) AS properties");
    from_where(f, select);
    fmt!(f, ") AS f) AS fc");
}
