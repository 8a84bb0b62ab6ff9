use griddle_core::schema::{Attribute, Collection, JoinTree};
use griddle_core::stmt::SqlType;
use griddle_core::Catalog;
use griddle_sql::stmt::{Output, Projection, Select};
use griddle_sql::{Serializer, Statement};

use pretty_assertions::assert_eq;

const WRAPPER: &str = "SELECT json_strip_nulls(array_to_json(array_agg(row_to_json(t)))) AS json FROM (";

fn catalog() -> Catalog {
    Catalog::new("public")
        .with_collection(
            Collection::new("student")
                .with_attribute(Attribute::new("id", SqlType::I64).identity())
                .with_attribute(Attribute::new("name", SqlType::Text))
                .with_attribute(Attribute::new("club_id", SqlType::I64).references("club", "id")),
        )
        .with_collection(
            Collection::new("club")
                .with_attribute(Attribute::new("id", SqlType::I64).identity())
                .with_attribute(Attribute::new("name", SqlType::Text)),
        )
        .with_collection(
            Collection::new("grade")
                .with_attribute(Attribute::new("id", SqlType::I64).identity())
                .with_attribute(
                    Attribute::new("student_id", SqlType::I64).references("student", "id"),
                )
                .with_attribute(
                    Attribute::new("course_id", SqlType::I64).references("course", "id"),
                )
                .with_attribute(Attribute::new("value", SqlType::F64)),
        )
        .with_collection(
            Collection::new("course")
                .with_attribute(Attribute::new("id", SqlType::I64).identity())
                .with_attribute(Attribute::new("name", SqlType::Text)),
        )
        .with_collection(
            Collection::new("enrollment")
                .with_attribute(
                    Attribute::new("student_id", SqlType::I64).references("student", "id"),
                )
                .with_attribute(
                    Attribute::new("course_id", SqlType::I64).references("course", "id"),
                )
                .with_attribute(Attribute::new("grade", SqlType::F64)),
        )
        // both grade and enrollment structurally qualify as junctions
        .with_junction_override("student", "course", "enrollment")
}

fn serialize(select: Select) -> String {
    let mut params: Vec<griddle_core::stmt::Value> = vec![];
    Serializer::postgresql()
        .serialize(&Statement::from(select), &mut params)
        .0
}

fn select(catalog: &Catalog, projections: &[&str], path: &[&str]) -> Select {
    let path: Vec<String> = path.iter().map(|name| name.to_string()).collect();
    Select {
        schema: "public".to_string(),
        base: "student".to_string(),
        projections: projections
            .iter()
            .map(|name| Projection::Column {
                name: name.to_string(),
            })
            .collect(),
        joins: vec![JoinTree::resolve(catalog, "student", &path).unwrap()],
        filters: vec![],
        order: None,
        paged: false,
        limited: false,
        output: Output::Records,
    }
}

#[test]
fn one_to_many_aggregates_and_groups_at_the_leaf() {
    let catalog = catalog();
    let sql = serialize(select(&catalog, &["id", "name"], &["grade"]));

    assert_eq!(
        sql,
        format!(
            "{WRAPPER}SELECT \"student\".\"id\", \"student\".\"name\", \
             coalesce(\"grade\", '[]'::json) AS \"grade\" \
             FROM \"public\".\"student\" \
             LEFT JOIN (SELECT \"grade\".\"student_id\", \
             json_agg(json_build_object(\
             'id', \"grade\".\"id\", \
             'student_id', \"grade\".\"student_id\", \
             'course_id', \"grade\".\"course_id\", \
             'value', \"grade\".\"value\")) AS \"grade\" \
             FROM \"public\".\"grade\" \
             GROUP BY \"grade\".\"student_id\") AS \"grade\" \
             ON \"grade\".\"student_id\" = \"student\".\"id\") t"
        )
    );
}

#[test]
fn many_to_one_builds_a_single_object_without_grouping() {
    let catalog = catalog();
    let sql = serialize(select(&catalog, &["id", "name"], &["club"]));

    assert_eq!(
        sql,
        format!(
            "{WRAPPER}SELECT \"student\".\"id\", \"student\".\"name\", \
             \"club\" AS \"club\" \
             FROM \"public\".\"student\" \
             LEFT JOIN (SELECT \"club\".\"id\", \
             json_build_object('id', \"club\".\"id\", 'name', \"club\".\"name\") AS \"club\" \
             FROM \"public\".\"club\") AS \"club\" \
             ON \"student\".\"club_id\" = \"club\".\"id\") t"
        )
    );
}

#[test]
fn many_to_many_joins_through_the_junction() {
    let catalog = catalog();
    let sql = serialize(select(&catalog, &["id", "name"], &["course"]));

    // course attributes plus the junction's own payload (the grade), with
    // neither raw foreign key surfacing
    assert_eq!(
        sql,
        format!(
            "{WRAPPER}SELECT \"student\".\"id\", \"student\".\"name\", \
             coalesce(\"course\", '[]'::json) AS \"course\" \
             FROM \"public\".\"student\" \
             LEFT JOIN (SELECT \"enrollment\".\"student_id\", \
             json_agg(json_build_object(\
             'id', \"course\".\"id\", \
             'name', \"course\".\"name\", \
             'grade', \"enrollment\".\"grade\")) AS \"course\" \
             FROM \"public\".\"enrollment\" \
             LEFT JOIN \"public\".\"course\" \
             ON \"enrollment\".\"course_id\" = \"course\".\"id\" \
             GROUP BY \"enrollment\".\"student_id\") AS \"enrollment\" \
             ON \"enrollment\".\"student_id\" = \"student\".\"id\") t"
        )
    );
}

#[test]
fn nested_chain_drops_the_attaching_foreign_key() {
    let catalog = catalog();
    let sql = serialize(select(&catalog, &["id"], &["grade", "course"]));

    assert_eq!(
        sql,
        format!(
            "{WRAPPER}SELECT \"student\".\"id\", \
             coalesce(\"grade\", '[]'::json) AS \"grade\" \
             FROM \"public\".\"student\" \
             LEFT JOIN (SELECT \"grade\".\"student_id\", \
             json_agg(json_build_object(\
             'id', \"grade\".\"id\", \
             'student_id', \"grade\".\"student_id\", \
             'value', \"grade\".\"value\", \
             'course', \"course\")) AS \"grade\" \
             FROM \"public\".\"grade\" \
             LEFT JOIN (SELECT \"course\".\"id\", \
             json_build_object('id', \"course\".\"id\", 'name', \"course\".\"name\") AS \"course\" \
             FROM \"public\".\"course\") AS \"course\" \
             ON \"grade\".\"course_id\" = \"course\".\"id\" \
             GROUP BY \"grade\".\"student_id\") AS \"grade\" \
             ON \"grade\".\"student_id\" = \"student\".\"id\") t"
        )
    );
}
