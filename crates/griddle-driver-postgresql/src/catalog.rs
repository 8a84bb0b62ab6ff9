use crate::Connection;

use griddle_core::schema::{Attribute, Collection, GeometryInfo, Reference};
use griddle_core::stmt::SqlType;
use griddle_core::{Catalog, Error, Result};

use tracing::debug;

const COLUMNS_SQL: &str = "\
    SELECT table_name, column_name, column_default, udt_name, is_nullable, is_identity \
    FROM information_schema.columns \
    WHERE table_schema = $1 \
    ORDER BY table_name, ordinal_position";

const PRIMARY_KEYS_SQL: &str = "\
    SELECT k.table_name, k.column_name \
    FROM information_schema.table_constraints AS c \
    JOIN information_schema.key_column_usage AS k \
      ON c.constraint_name = k.constraint_name \
     AND c.constraint_schema = k.constraint_schema \
     AND c.table_name = k.table_name \
    WHERE c.constraint_type = 'PRIMARY KEY' AND k.table_schema = $1";

const FOREIGN_KEYS_SQL: &str = "\
    SELECT tc.table_name, kcu.column_name, \
           ccu.table_name AS foreign_table, ccu.column_name AS foreign_column \
    FROM information_schema.table_constraints AS tc \
    JOIN information_schema.key_column_usage AS kcu \
      ON tc.constraint_name = kcu.constraint_name \
     AND tc.constraint_schema = kcu.constraint_schema \
    JOIN information_schema.constraint_column_usage AS ccu \
      ON tc.constraint_name = ccu.constraint_name \
     AND tc.constraint_schema = ccu.constraint_schema \
    WHERE tc.constraint_type = 'FOREIGN KEY' AND tc.table_schema = $1";

const GEOMETRY_SQL: &str = "\
    SELECT f_table_name, f_geometry_column, type, srid, coord_dimension \
    FROM geometry_columns \
    WHERE f_table_schema = $1";

impl Connection {
    /// Takes a catalog snapshot of one database schema.
    ///
    /// Every collection of the schema is loaded, so relationship
    /// classification and junction discovery run against the snapshot
    /// without further round trips.
    pub async fn introspect(&self, schema: &str) -> Result<Catalog> {
        let rows = self
            .client
            .query(COLUMNS_SQL, &[&schema])
            .await
            .map_err(|err| Error::execution_from("could not introspect columns", err))?;

        let mut collections: Vec<Collection> = vec![];
        for row in &rows {
            let table: String = row.get("table_name");
            let name: String = row.get("column_name");
            let default: Option<String> = row.get("column_default");
            let udt: String = row.get("udt_name");
            let nullable: String = row.get("is_nullable");
            let identity: String = row.get("is_identity");

            let mut attribute = Attribute::new(name, SqlType::from_catalog(&udt));
            attribute.nullable = nullable == "YES";
            attribute.identity = identity == "YES";
            attribute.auto_increment = default.as_deref().is_some_and(|d| d.starts_with("nextval("));

            match collections.last_mut() {
                Some(collection) if collection.name == table => {
                    collection
                        .attributes
                        .insert(attribute.name.clone(), attribute);
                }
                _ => collections.push(Collection::new(table).with_attribute(attribute)),
            }
        }

        let mut catalog = Catalog::new(schema);
        for collection in collections {
            catalog = catalog.with_collection(collection);
        }

        self.load_primary_keys(schema, &mut catalog).await?;
        self.load_foreign_keys(schema, &mut catalog).await?;
        self.load_geometry(schema, &mut catalog).await;
        Ok(catalog)
    }

    async fn load_primary_keys(&self, schema: &str, catalog: &mut Catalog) -> Result<()> {
        let rows = self
            .client
            .query(PRIMARY_KEYS_SQL, &[&schema])
            .await
            .map_err(|err| Error::execution_from("could not introspect primary keys", err))?;

        for row in &rows {
            let table: String = row.get("table_name");
            let column: String = row.get("column_name");
            catalog.map_attribute(&table, &column, |attribute| {
                attribute.identity = true;
            });
        }
        Ok(())
    }

    async fn load_foreign_keys(&self, schema: &str, catalog: &mut Catalog) -> Result<()> {
        let rows = self
            .client
            .query(FOREIGN_KEYS_SQL, &[&schema])
            .await
            .map_err(|err| Error::execution_from("could not introspect foreign keys", err))?;

        for row in &rows {
            let table: String = row.get("table_name");
            let column: String = row.get("column_name");
            let foreign_table: String = row.get("foreign_table");
            let foreign_column: String = row.get("foreign_column");
            catalog.map_attribute(&table, &column, |attribute| {
                attribute.reference = Some(Reference {
                    collection: foreign_table,
                    attribute: foreign_column,
                });
            });
        }
        Ok(())
    }

    /// Geometry metadata lives in the PostGIS `geometry_columns` view, which
    /// is absent on plain installations; missing metadata is not an error.
    async fn load_geometry(&self, schema: &str, catalog: &mut Catalog) {
        let rows = match self.client.query(GEOMETRY_SQL, &[&schema]).await {
            Ok(rows) => rows,
            Err(err) => {
                debug!("geometry_columns unavailable: {err}");
                return;
            }
        };

        for row in &rows {
            let table: String = row.get("f_table_name");
            let column: String = row.get("f_geometry_column");
            let subtype: String = row.get("type");
            let srid: i32 = row.get("srid");
            let dimension: i32 = row.get("coord_dimension");
            catalog.map_attribute(&table, &column, |attribute| {
                attribute.geometry = Some(GeometryInfo {
                    subtype,
                    srid,
                    dimension,
                });
            });
        }
    }
}
