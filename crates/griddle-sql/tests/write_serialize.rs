use griddle_core::stmt::{SqlType, Value};
use griddle_sql::stmt::{Delete, Insert, Update, WriteColumn};
use griddle_sql::{Serializer, Statement};

use pretty_assertions::assert_eq;

fn serialize(statement: impl Into<Statement>) -> (String, griddle_sql::PlaceholderMap) {
    let mut params: Vec<Value> = vec![];
    Serializer::postgresql().serialize(&statement.into(), &mut params)
}

#[test]
fn insert_wraps_placeholders_by_column_type() {
    let insert = Insert {
        schema: "public".to_string(),
        collection: "measurement".to_string(),
        columns: vec![
            WriteColumn::new("name", SqlType::Text),
            WriteColumn::new("payload", SqlType::Json),
            WriteColumn::new("location", SqlType::Geometry),
            WriteColumn::new("value", SqlType::F64),
        ],
    };

    let (sql, positions) = serialize(insert);
    assert_eq!(
        sql,
        "INSERT INTO \"public\".\"measurement\" \
         (\"name\", \"payload\", \"location\", \"value\") \
         VALUES ($1, to_json($2::json), ST_GeomFromText($3), $4::float8)"
    );
    assert_eq!(positions.get("name"), Some(&1));
    assert_eq!(positions.get("payload"), Some(&2));
    assert_eq!(positions.get("location"), Some(&3));
    assert_eq!(positions.get("value"), Some(&4));
}

#[test]
fn update_binds_the_identity_last() {
    let update = Update {
        schema: "public".to_string(),
        collection: "measurement".to_string(),
        assignments: vec![
            WriteColumn::new("name", SqlType::Text),
            WriteColumn::new("value", SqlType::F64),
        ],
        identity: WriteColumn::new("id", SqlType::I64),
    };

    let (sql, positions) = serialize(update);
    assert_eq!(
        sql,
        "UPDATE \"public\".\"measurement\" \
         SET \"name\" = $1, \"value\" = $2::float8 \
         WHERE \"id\" = $3"
    );
    assert_eq!(positions.get("id"), Some(&3));
}

#[test]
fn delete_compiles_a_typed_in_list() {
    let delete = Delete {
        schema: "public".to_string(),
        collection: "measurement".to_string(),
        identity: WriteColumn::new("id", SqlType::I64),
        id_count: 3,
    };

    let (sql, positions) = serialize(delete);
    assert_eq!(
        sql,
        "DELETE FROM \"public\".\"measurement\" WHERE \"id\" IN ($1, $2, $3)"
    );
    assert_eq!(positions.get("id"), Some(&1));
}

#[test]
fn identifiers_with_quotes_are_escaped() {
    let insert = Insert {
        schema: "public".to_string(),
        collection: "odd\"name".to_string(),
        columns: vec![WriteColumn::new("col", SqlType::Text)],
    };

    let (sql, _) = serialize(insert);
    assert!(sql.contains("\"odd\"\"name\""), "unexpected sql: {sql}");
}
