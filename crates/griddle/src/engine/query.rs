use crate::db::{Griddle, QueryOutput};
use crate::engine::cache::{self, CompiledQuery};
use crate::engine::deflatten::deflatten;
use crate::request::QueryRequest;

use griddle_core::schema::{JoinTree, Link};
use griddle_core::stmt::{
    Filter, FilterParser, OrderBy, Page, SqlType, Value, Warning, DEFAULT_PAGE_SIZE,
};
use griddle_core::{Catalog, Error, Result};
use griddle_sql::stmt::{GeoJson, Output, Projection, Select, Statement};
use griddle_sql::{ParamCounter, Serializer};

use std::collections::HashSet;
use tracing::debug;

impl Griddle {
    /// Serves one read request: resolve the schema, compile or reuse the
    /// statement, bind, execute, and post-process.
    pub async fn query(&mut self, collection: &str, request: &QueryRequest) -> Result<QueryOutput> {
        self.ensure_open().await?;
        let mut warnings = vec![];

        // effective page size; a page spec may carry its own size
        let page = match &request.page {
            Some(raw) => Some(Page::parse(raw)?),
            None => None,
        };
        let mut size = page.and_then(|p| p.size).unwrap_or(request.size);
        if page.is_some() && size < 1 {
            size = DEFAULT_PAGE_SIZE;
        }
        if let Some(limit) = self.config.hard_limit {
            if size > limit {
                warnings.push(Warning::SizeClamped {
                    requested: size,
                    limit,
                });
            }
            if size <= 0 || size > limit {
                size = limit;
            }
        }

        let catalog = self.catalog().await?;
        catalog.collection(collection)?;

        let mut joins = vec![];
        for chain in &request.joins {
            let path: Vec<String> = chain
                .split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect();
            joins.push(JoinTree::resolve(&catalog, collection, &path)?);
        }

        // dotted filter references may name any collection on a join path
        let scope: Vec<String> = joins
            .iter()
            .flat_map(JoinTree::collections)
            .map(str::to_string)
            .collect();
        let parser = FilterParser::new(&catalog, collection).with_scope(scope);
        let mut filters = vec![];
        for code in &request.filters {
            let mut filter = parser.parse(code)?;
            warnings.append(&mut filter.warnings);
            filters.push(filter);
        }

        let key = cache::cache_key(&self.config.schema, collection, request, &filters, size);
        let paged = page.is_some();
        let limited = size > 0;
        let compiled = self.cache.get_or_compile(&key, || {
            compile_select(
                &catalog,
                &self.config.schema,
                collection,
                request,
                &filters,
                &joins,
                paged,
                limited,
            )
        })?;
        warnings.extend(compiled.warnings.iter().cloned());

        // bind left to right: filters in list order, then offset, then limit
        let mut values = vec![];
        let mut position = 1;
        let mut seen = HashSet::new();
        for filter in &mut filters {
            filter.first_placeholder = Some(position);
            if filter.placeholders() > 0 && seen.insert(filter.code.clone()) {
                verify_position(&compiled, &filter.code, position)?;
            }
            position += filter.placeholders();
            values.extend(filter.values.iter().cloned());
        }
        if let Some(page) = page {
            verify_position(&compiled, "offset", position)?;
            values.push(Value::I64(page.offset(size)));
            position += 1;
        }
        if limited {
            verify_position(&compiled, "limit", position)?;
            values.push(Value::I64(size));
        }

        let json = self.connection.query_json(&compiled.sql, &values).await?;
        let mut records = match json {
            Some(text) => serde_json::from_str(&text).map_err(|err| {
                Error::execution(format!("backend returned malformed JSON: {err}"))
            })?,
            None => serde_json::json!({}),
        };
        if request.deflatten {
            records = deflatten(records);
        }

        Ok(QueryOutput { records, warnings })
    }
}

fn verify_position(compiled: &CompiledQuery, name: &str, position: usize) -> Result<()> {
    match compiled.placeholders.get(name) {
        Some(&recorded) if recorded == position => Ok(()),
        Some(&recorded) => Err(Error::compile(format!(
            "placeholder drift for >{name}<: compiled at {recorded}, bound at {position}"
        ))),
        None => Err(Error::compile(format!(
            "no placeholder recorded for >{name}<"
        ))),
    }
}

/// Coordinate transform requested for geometry columns.
enum GeoTransform {
    LatLon,
    Epsg(i32),
}

fn parse_geotransform(raw: &str) -> Result<GeoTransform> {
    if raw.eq_ignore_ascii_case("latlon") {
        Ok(GeoTransform::LatLon)
    } else {
        raw.trim()
            .parse()
            .map(GeoTransform::Epsg)
            .map_err(|_| {
                Error::filter(format!(
                    "invalid geotransform >{raw}<; expected `latlon` or an EPSG code"
                ))
            })
    }
}

#[allow(clippy::too_many_arguments)]
fn compile_select(
    catalog: &Catalog,
    schema: &str,
    collection: &str,
    request: &QueryRequest,
    filters: &[Filter],
    joins: &[JoinTree],
    paged: bool,
    limited: bool,
) -> Result<CompiledQuery> {
    let mut warnings = vec![];
    let base = catalog.collection(collection)?;

    // an unavailable order column degrades to unordered with a warning
    let mut order = request.order.as_deref().map(OrderBy::parse);
    if let Some(parsed) = &order {
        if base.attribute(&parsed.attribute).is_none() {
            warnings.push(Warning::UnorderableColumn {
                column: parsed.attribute.clone(),
            });
            order = None;
        }
    }

    let output = select_output(catalog, collection, request)?;

    let transform = match request.geotransform.as_deref() {
        Some(raw) => Some(parse_geotransform(raw)?),
        None => None,
    };

    // requested attribute set; identity and order-by attributes are always
    // delivered
    let mut requested: Vec<String> = request
        .includes
        .as_deref()
        .map(|raw| {
            raw.split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect()
        })
        .unwrap_or_default();
    let selective = !requested.is_empty();

    let mut projections = vec![];
    for attribute in base.attributes.values() {
        let name = &attribute.name;
        let always = attribute.identity
            || order.as_ref().is_some_and(|order| &order.attribute == name);
        if selective && !always && !requested.iter().any(|r| r == name) {
            continue;
        }
        requested.retain(|r| r != name);

        // the geometry carrier is delivered as the feature geometry, not as
        // a property
        if request.geojson_attr.as_deref() == Some(name.as_str()) {
            continue;
        }
        // raw foreign keys feeding a join path are replaced by the join
        // payload
        if joins.iter().any(|tree| {
            matches!(&tree.root.link, Link::ForeignKeyOnParent { fk, .. } if fk == name)
        }) {
            continue;
        }

        projections.push(match (&attribute.ty, &transform) {
            (SqlType::Bytes, _) => Projection::Base64 { name: name.clone() },
            (SqlType::Geometry, Some(GeoTransform::LatLon)) => {
                Projection::LatLon { name: name.clone() }
            }
            (SqlType::Geometry, Some(GeoTransform::Epsg(code))) => Projection::Transform {
                name: name.clone(),
                code: *code,
            },
            _ => Projection::Column { name: name.clone() },
        });
    }
    if !requested.is_empty() {
        warnings.push(Warning::UnknownAttributes {
            attributes: requested,
        });
    }

    let select = Select {
        schema: schema.to_string(),
        base: collection.to_string(),
        projections,
        joins: joins.to_vec(),
        filters: filters.to_vec(),
        order,
        paged,
        limited,
        output,
    };

    let mut params = ParamCounter::default();
    let (sql, placeholders) =
        Serializer::postgresql().serialize(&Statement::from(select), &mut params);
    debug!(sql, "compiled select");

    Ok(CompiledQuery {
        sql,
        placeholders,
        warnings,
    })
}

fn select_output(catalog: &Catalog, collection: &str, request: &QueryRequest) -> Result<Output> {
    if request.count_only {
        return Ok(Output::Count);
    }

    if let Some(geo) = &request.geojson_attr {
        let base = catalog.collection(collection)?;
        let attribute = base.attribute(geo).ok_or_else(|| {
            Error::schema(format!(
                "geometry attribute >{geo}< does not exist on >{collection}<"
            ))
        })?;
        let info = attribute.geometry.as_ref();
        return Ok(Output::GeoJson(GeoJson {
            attribute: geo.clone(),
            srid: info.map_or(4326, |info| info.srid),
            dimension: info.map_or(2, |info| info.dimension),
        }));
    }

    if let Some(unique) = &request.unique {
        let base = catalog.collection(collection)?;
        if base.attribute(unique).is_none() {
            return Err(Error::schema(format!(
                "unique attribute >{unique}< does not exist on >{collection}<"
            )));
        }
        return Ok(Output::Unique(unique.clone()));
    }

    Ok(Output::Records)
}
