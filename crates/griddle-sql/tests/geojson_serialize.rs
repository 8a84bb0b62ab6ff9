use griddle_core::schema::{Attribute, Collection};
use griddle_core::stmt::{FilterParser, SqlType, Value};
use griddle_core::Catalog;
use griddle_sql::stmt::{GeoJson, Output, Projection, Select};
use griddle_sql::{Serializer, Statement};

use pretty_assertions::assert_eq;

fn catalog() -> Catalog {
    Catalog::new("public").with_collection(
        Collection::new("poi")
            .with_attribute(Attribute::new("id", SqlType::I64).identity())
            .with_attribute(Attribute::new("name", SqlType::Text))
            .with_attribute(Attribute::new("geom", SqlType::Geometry).with_geometry(
                "POINT",
                25832,
                2,
            )),
    )
}

fn select(geo: GeoJson) -> Select {
    Select {
        schema: "public".to_string(),
        base: "poi".to_string(),
        // the geometry carrier is not part of the properties projection
        projections: vec![
            Projection::Column {
                name: "id".to_string(),
            },
            Projection::Column {
                name: "name".to_string(),
            },
        ],
        joins: vec![],
        filters: vec![],
        order: None,
        paged: false,
        limited: false,
        output: Output::GeoJson(geo),
    }
}

fn serialize(select: Select) -> (String, griddle_sql::PlaceholderMap) {
    let mut params: Vec<Value> = vec![];
    Serializer::postgresql().serialize(&Statement::from(select), &mut params)
}

#[test]
fn feature_collection_shares_the_from_clause() {
    let (sql, _) = serialize(select(GeoJson {
        attribute: "geom".to_string(),
        srid: 25832,
        dimension: 2,
    }));

    assert_eq!(
        sql,
        "SELECT row_to_json(fc) AS json FROM (\
         SELECT 'FeatureCollection' AS type, \
         array_to_json(array_agg(f)) AS features FROM (\
         SELECT 'Feature' AS type, \
         ST_AsGeoJSON(ST_Transform(\"poi\".\"geom\", 4326))::json AS geometry, \
         (SELECT json_strip_nulls(row_to_json(t)) FROM (\
         SELECT \"poi\".\"id\", \"poi\".\"name\") AS t) AS properties \
         FROM \"public\".\"poi\") AS f) AS fc"
    );
}

#[test]
fn native_srid_needs_no_transform() {
    let (sql, _) = serialize(select(GeoJson {
        attribute: "geom".to_string(),
        srid: 4326,
        dimension: 2,
    }));

    assert!(
        sql.contains("ST_AsGeoJSON(\"poi\".\"geom\")::json AS geometry"),
        "unexpected sql: {sql}"
    );
}

#[test]
fn three_dimensional_geometries_transform_to_4979() {
    let (sql, _) = serialize(select(GeoJson {
        attribute: "geom".to_string(),
        srid: 25832,
        dimension: 3,
    }));

    assert!(
        sql.contains("ST_Transform(\"poi\".\"geom\", 4979)"),
        "unexpected sql: {sql}"
    );
}

#[test]
fn filters_and_pagination_bind_after_the_properties_subselect() {
    let catalog = catalog();
    let parser = FilterParser::new(&catalog, "poi");

    let mut stmt = select(GeoJson {
        attribute: "geom".to_string(),
        srid: 4326,
        dimension: 2,
    });
    stmt.filters = vec![parser.parse("name,eq,tower").unwrap()];
    stmt.paged = true;
    stmt.limited = true;

    let (sql, positions) = serialize(stmt);
    assert!(
        sql.contains("WHERE \"poi\".\"name\" = $1 OFFSET $2 LIMIT $3"),
        "unexpected sql: {sql}"
    );
    assert_eq!(positions.get("name,eq,tower"), Some(&1));
    assert_eq!(positions.get("offset"), Some(&2));
    assert_eq!(positions.get("limit"), Some(&3));
}
