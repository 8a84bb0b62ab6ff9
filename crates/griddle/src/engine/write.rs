use crate::db::{value_to_json, CreateOutput, Griddle, UpdateOutput};
use crate::engine::cache::CompiledQuery;

use griddle_core::schema::Collection;
use griddle_core::stmt::{SqlType, Value, Warning};
use griddle_core::{Catalog, Error, Result};
use griddle_sql::stmt::{Delete, Insert, Statement, Update, WriteColumn};
use griddle_sql::{ParamCounter, Serializer};

use serde_json::{Map, Value as JsonValue};
use tracing::{debug, warn};

impl Griddle {
    /// Creates one record or a batch.
    ///
    /// Accepts a single object, a bare array, `{"records": [...]}`, or a
    /// GeoJSON `FeatureCollection`. Batch elements are written
    /// independently; a failing element becomes a warning instead of
    /// aborting the rest.
    pub async fn create(&mut self, collection: &str, body: &str) -> Result<CreateOutput> {
        self.ensure_open().await?;
        let mut warnings = vec![];
        let catalog = self.catalog().await?;
        catalog.collection(collection)?;

        let json: JsonValue = serde_json::from_str(body)
            .map_err(|err| Error::filter(format!("invalid JSON body: {err}")))?;

        let (records, batch, geojson) = match &json {
            JsonValue::Object(object)
                if object.get("type").and_then(JsonValue::as_str) == Some("FeatureCollection") =>
            {
                let features = object
                    .get("features")
                    .and_then(JsonValue::as_array)
                    .cloned()
                    .unwrap_or_default();
                (features, true, true)
            }
            JsonValue::Object(object) if object.contains_key("records") => {
                let records = object
                    .get("records")
                    .and_then(JsonValue::as_array)
                    .cloned()
                    .unwrap_or_default();
                (records, true, false)
            }
            JsonValue::Array(elements) => (elements.clone(), true, false),
            _ => (vec![json.clone()], false, false),
        };

        let mut ids = vec![];
        for (index, record) in records.iter().enumerate() {
            let prepared = if geojson {
                self.feature_to_record(&catalog, collection, record, &mut warnings)
                    .await
            } else {
                record
                    .as_object()
                    .cloned()
                    .ok_or_else(|| Error::filter("record must be a JSON object"))
            };

            let result = match prepared {
                Ok(object) => {
                    self.create_one(&catalog, collection, &object, &mut warnings)
                        .await
                }
                Err(err) => Err(err),
            };

            match result {
                Ok(id) => ids.push(id.map_or(JsonValue::Null, value_to_json)),
                Err(err) if batch => warnings.push(Warning::WriteFailed {
                    index,
                    message: err.to_string(),
                }),
                Err(err) => return Err(err),
            }
        }

        Ok(CreateOutput { ids, warnings })
    }

    async fn create_one(
        &mut self,
        catalog: &Catalog,
        collection: &str,
        object: &Map<String, JsonValue>,
        warnings: &mut Vec<Warning>,
    ) -> Result<Option<Value>> {
        let base = catalog.collection(collection)?;

        let mut columns = vec![];
        let mut values = vec![];
        let mut unknown = vec![];
        for (key, value) in object {
            match base.attribute(key) {
                Some(attribute) => {
                    columns.push(WriteColumn::new(key.clone(), attribute.ty.clone()));
                    values.push(json_to_value(value, &attribute.ty, warnings)?);
                }
                None => unknown.push(key.clone()),
            }
        }
        if columns.is_empty() {
            return Err(Error::schema(format!(
                "there is no data to insert into >{collection}<"
            )));
        }
        if !unknown.is_empty() {
            warnings.push(Warning::UnknownWriteFields {
                collection: collection.to_string(),
                fields: unknown,
            });
        }

        let schema = self.config.schema.clone();
        let key = format!(
            "insert_{schema}_{collection}_{}",
            columns
                .iter()
                .map(|column| column.name.as_str())
                .collect::<Vec<_>>()
                .join("_")
        );
        let insert = Insert {
            schema: schema.clone(),
            collection: collection.to_string(),
            columns,
        };
        let compiled = self.cache.get_or_compile(&key, || {
            let mut params = ParamCounter::default();
            let (sql, placeholders) =
                Serializer::postgresql().serialize(&Statement::from(insert), &mut params);
            debug!(sql, "compiled insert");
            Ok(CompiledQuery {
                sql,
                placeholders,
                warnings: vec![],
            })
        })?;

        let identity_sql = identity_fetch_sql(&schema, base);

        // one insert and its identity fetch share one explicit transaction
        self.connection.begin().await?;
        if let Err(err) = self.connection.execute(&compiled.sql, &values).await {
            self.try_rollback().await;
            return Err(err);
        }
        let id = match &identity_sql {
            Some(sql) => match self.connection.query_value(sql).await {
                Ok(id) => id,
                Err(err) => {
                    self.try_rollback().await;
                    return Err(err);
                }
            },
            None => {
                warnings.push(Warning::MissingIdentity {
                    collection: collection.to_string(),
                });
                None
            }
        };
        self.connection.commit().await?;

        Ok(id)
    }

    async fn try_rollback(&mut self) {
        if let Err(err) = self.connection.rollback().await {
            warn!("rollback failed: {err}");
        }
    }

    /// Converts a GeoJSON feature into one flat record: properties become
    /// columns and each geometry is matched to a geometry attribute by
    /// subtype, converted to SRID-prefixed WKT on the server.
    async fn feature_to_record(
        &mut self,
        catalog: &Catalog,
        collection: &str,
        feature: &JsonValue,
        warnings: &mut Vec<Warning>,
    ) -> Result<Map<String, JsonValue>> {
        let object = feature
            .as_object()
            .ok_or_else(|| Error::filter("GeoJSON feature must be an object"))?;
        if object.get("type").and_then(JsonValue::as_str) != Some("Feature") {
            return Err(Error::filter("given JSON is not a valid GeoJSON feature"));
        }
        let geometry = object
            .get("geometry")
            .and_then(JsonValue::as_object)
            .ok_or_else(|| Error::filter("GeoJSON feature has no geometry"))?;
        let geometry_type = geometry
            .get("type")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::filter("GeoJSON geometry has no type"))?;

        let geometries: Vec<&Map<String, JsonValue>> = if geometry_type == "GeometryCollection" {
            geometry
                .get("geometries")
                .and_then(JsonValue::as_array)
                .map(|geometries| {
                    geometries
                        .iter()
                        .filter_map(JsonValue::as_object)
                        .collect()
                })
                .unwrap_or_default()
        } else {
            vec![geometry]
        };

        let base = catalog.collection(collection)?;
        let mut record = Map::new();

        // geometries fill matching geometry attributes in order; GeoJSON
        // has no naming mechanism of its own
        for geometry in &geometries {
            let Some(subtype) = geometry.get("type").and_then(JsonValue::as_str) else {
                continue;
            };
            for attribute in base.geometry_attributes() {
                let Some(info) = &attribute.geometry else {
                    continue;
                };
                if !info.subtype.eq_ignore_ascii_case(subtype)
                    || record.contains_key(&attribute.name)
                {
                    continue;
                }
                let text = serde_json::to_string(geometry)
                    .map_err(|err| Error::filter(format!("unserializable geometry: {err}")))?;
                match self.connection.geojson_to_wkt(&text, info.srid).await {
                    Ok(Some(wkt)) => {
                        record.insert(attribute.name.clone(), JsonValue::String(wkt));
                    }
                    Ok(None) => continue,
                    Err(err) => {
                        warnings.push(Warning::GeometryConversion {
                            message: err.to_string(),
                        });
                        continue;
                    }
                }
                break;
            }
        }

        if let Some(properties) = object.get("properties").and_then(JsonValue::as_object) {
            for (key, value) in properties {
                record.insert(key.clone(), value.clone());
            }
        }

        Ok(record)
    }

    /// Updates one record or a batch (bare array, `{"records": [...]}`, or
    /// `{"list": [...]}`). The explicit id applies to single updates only;
    /// batch elements must carry their identity attribute themselves.
    pub async fn update(
        &mut self,
        collection: &str,
        body: &str,
        id: Option<i64>,
    ) -> Result<UpdateOutput> {
        self.ensure_open().await?;
        let mut warnings = vec![];
        let catalog = self.catalog().await?;
        catalog.collection(collection)?;

        let json: JsonValue = serde_json::from_str(body)
            .map_err(|err| Error::filter(format!("invalid JSON body: {err}")))?;

        let (records, batch) = match &json {
            JsonValue::Array(elements) => (elements.clone(), true),
            JsonValue::Object(object) if object.contains_key("records") => (
                object
                    .get("records")
                    .and_then(JsonValue::as_array)
                    .cloned()
                    .unwrap_or_default(),
                true,
            ),
            JsonValue::Object(object) if object.contains_key("list") => (
                object
                    .get("list")
                    .and_then(JsonValue::as_array)
                    .cloned()
                    .unwrap_or_default(),
                true,
            ),
            _ => (vec![json.clone()], false),
        };

        let mut last_id = None;
        for (index, record) in records.iter().enumerate() {
            let explicit = if batch { None } else { id };
            let result = match record.as_object() {
                Some(object) => {
                    self.update_one(&catalog, collection, object, explicit, &mut warnings)
                        .await
                }
                None => Err(Error::filter("record must be a JSON object")),
            };
            match result {
                Ok(value) => last_id = Some(value_to_json(value)),
                Err(err) if batch => warnings.push(Warning::WriteFailed {
                    index,
                    message: err.to_string(),
                }),
                Err(err) => return Err(err),
            }
        }

        Ok(UpdateOutput { last_id, warnings })
    }

    async fn update_one(
        &mut self,
        catalog: &Catalog,
        collection: &str,
        object: &Map<String, JsonValue>,
        explicit_id: Option<i64>,
        warnings: &mut Vec<Warning>,
    ) -> Result<Value> {
        let base = catalog.collection(collection)?;

        // a JSON key that is itself declared identity wins; otherwise the
        // first identity attribute targets the explicitly supplied id
        let json_identity = object
            .keys()
            .find(|key| base.attribute(key).is_some_and(|a| a.identity))
            .cloned();
        let (identity, id_value) = match &json_identity {
            Some(key) => {
                let attribute = base
                    .attribute(key)
                    .ok_or_else(|| Error::schema(format!("attribute >{key}< disappeared")))?;
                (
                    attribute,
                    json_to_value(&object[key], &attribute.ty, warnings)?,
                )
            }
            None => match explicit_id {
                Some(id) => {
                    let attribute = base.default_identity().ok_or_else(|| {
                        Error::schema(format!(
                            "there is no identity column in >{collection}<; could not update"
                        ))
                    })?;
                    (
                        attribute,
                        json_to_value(&JsonValue::from(id), &attribute.ty, warnings)?,
                    )
                }
                None => {
                    return Err(Error::schema(
                        "there was no identity attribute given to identify the record to update",
                    ))
                }
            },
        };

        let mut assignments = vec![];
        let mut values = vec![];
        let mut unknown = vec![];
        for (key, value) in object {
            if Some(key) == json_identity.as_ref() {
                continue;
            }
            match base.attribute(key) {
                Some(attribute) => {
                    assignments.push(WriteColumn::new(key.clone(), attribute.ty.clone()));
                    values.push(json_to_value(value, &attribute.ty, warnings)?);
                }
                None => unknown.push(key.clone()),
            }
        }
        if assignments.is_empty() {
            return Err(Error::schema(format!(
                "there is no data to update in >{collection}<"
            )));
        }
        if !unknown.is_empty() {
            warnings.push(Warning::UnknownWriteFields {
                collection: collection.to_string(),
                fields: unknown,
            });
        }

        let schema = self.config.schema.clone();
        let key = format!(
            "update_{schema}_{collection}_{}_{}",
            assignments
                .iter()
                .map(|column| column.name.as_str())
                .collect::<Vec<_>>()
                .join("_"),
            identity.name
        );
        let update = Update {
            schema,
            collection: collection.to_string(),
            assignments,
            identity: WriteColumn::new(identity.name.clone(), identity.ty.clone()),
        };
        let compiled = self.cache.get_or_compile(&key, || {
            let mut params = ParamCounter::default();
            let (sql, placeholders) =
                Serializer::postgresql().serialize(&Statement::from(update), &mut params);
            debug!(sql, "compiled update");
            Ok(CompiledQuery {
                sql,
                placeholders,
                warnings: vec![],
            })
        })?;

        // the identity value is always the last bound parameter
        values.push(id_value.clone());
        let affected = self.connection.execute(&compiled.sql, &values).await?;
        if affected == 0 {
            return Err(Error::execution(format!(
                "record with id >{id_value}< not found"
            )));
        }

        Ok(id_value)
    }

    /// Deletes the records named by a comma-separated id list, targeting
    /// the collection's first identity column.
    pub async fn delete(&mut self, collection: &str, ids: &str) -> Result<()> {
        self.ensure_open().await?;
        let catalog = self.catalog().await?;
        let base = catalog.collection(collection)?;

        let identity = base.default_identity().ok_or_else(|| {
            Error::schema(format!(
                "could not delete from >{collection}< because there is no identity column"
            ))
        })?;

        let mut scratch = vec![];
        let values: Vec<Value> = ids
            .split(',')
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| Value::coerce(raw, &identity.ty, &mut scratch))
            .collect::<Result<_>>()?;
        if values.is_empty() {
            return Err(Error::filter("no ids given to delete"));
        }

        let schema = self.config.schema.clone();
        let key = format!("delete_{schema}_{collection}_{}_{}", identity.name, values.len());
        let delete = Delete {
            schema,
            collection: collection.to_string(),
            identity: WriteColumn::new(identity.name.clone(), identity.ty.clone()),
            id_count: values.len(),
        };
        let compiled = self.cache.get_or_compile(&key, || {
            let mut params = ParamCounter::default();
            let (sql, placeholders) =
                Serializer::postgresql().serialize(&Statement::from(delete), &mut params);
            debug!(sql, "compiled delete");
            Ok(CompiledQuery {
                sql,
                placeholders,
                warnings: vec![],
            })
        })?;

        self.connection.execute(&compiled.sql, &values).await?;
        Ok(())
    }
}

/// Identity columns of a collection, newest row first. Prepared alongside
/// inserts to report the generated identity.
fn identity_fetch_sql(schema: &str, collection: &Collection) -> Option<String> {
    let identities = collection.identity_attributes();
    let first = identities.first()?;

    let columns = identities
        .iter()
        .map(|attribute| quote_ident(&attribute.name))
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!(
        "SELECT {columns} FROM {}.{} ORDER BY {} DESC LIMIT 1",
        quote_ident(schema),
        quote_ident(&collection.name),
        quote_ident(&first.name)
    ))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Coerces a JSON write value to the column's declared type. Empty strings
/// become NULL for non-textual columns.
fn json_to_value(
    value: &JsonValue,
    ty: &SqlType,
    warnings: &mut Vec<Warning>,
) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    if let Some(text) = value.as_str() {
        if text.is_empty() && !matches!(ty, SqlType::Text | SqlType::Json) {
            return Ok(Value::Null);
        }
    }

    match ty {
        SqlType::Bool => match value {
            JsonValue::Bool(v) => Ok(Value::Bool(*v)),
            JsonValue::String(raw) => Value::coerce(raw, ty, warnings),
            _ => Err(write_type_error(value, ty)),
        },
        SqlType::I16 | SqlType::I32 | SqlType::I64 => match value {
            JsonValue::Number(number) => {
                let wide = number
                    .as_i64()
                    .ok_or_else(|| write_type_error(value, ty))?;
                match ty {
                    SqlType::I16 => i16::try_from(wide)
                        .map(Value::I16)
                        .map_err(|_| write_type_error(value, ty)),
                    SqlType::I32 => i32::try_from(wide)
                        .map(Value::I32)
                        .map_err(|_| write_type_error(value, ty)),
                    _ => Ok(Value::I64(wide)),
                }
            }
            JsonValue::String(raw) => Value::coerce(raw, ty, warnings),
            _ => Err(write_type_error(value, ty)),
        },
        SqlType::F64 => match value {
            JsonValue::Number(number) => number
                .as_f64()
                .map(Value::F64)
                .ok_or_else(|| write_type_error(value, ty)),
            JsonValue::String(raw) => Value::coerce(raw, ty, warnings),
            _ => Err(write_type_error(value, ty)),
        },
        SqlType::Text => match value {
            JsonValue::String(raw) => Ok(Value::String(raw.clone())),
            JsonValue::Number(_) | JsonValue::Bool(_) => Ok(Value::String(value.to_string())),
            _ => Err(write_type_error(value, ty)),
        },
        SqlType::Timestamp | SqlType::Date => match value {
            JsonValue::String(raw) => Value::coerce(raw, ty, warnings),
            _ => Err(write_type_error(value, ty)),
        },
        SqlType::Json => match value {
            JsonValue::String(raw) => Ok(Value::Json(raw.clone())),
            _ => Ok(Value::Json(value.to_string())),
        },
        SqlType::Geometry => match value {
            JsonValue::String(raw) => Ok(Value::Geometry(raw.clone())),
            _ => Err(write_type_error(value, ty)),
        },
        SqlType::Bytes => match value {
            JsonValue::String(raw) => Ok(Value::String(raw.clone())),
            _ => Err(write_type_error(value, ty)),
        },
        SqlType::Other(name) => Err(Error::schema(format!(
            "column type >{name}< is not writable"
        ))),
    }
}

fn write_type_error(value: &JsonValue, ty: &SqlType) -> Error {
    Error::filter(format!("cannot convert >{value}< to column type >{ty}<"))
}
