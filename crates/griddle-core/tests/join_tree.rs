use griddle_core::schema::{Attribute, Collection, JoinTree, Link, Relationship, MAX_JOIN_DEPTH};
use griddle_core::stmt::SqlType;
use griddle_core::Catalog;

use pretty_assertions::assert_eq;

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
                .with_attribute(Attribute::new("name", SqlType::Text))
                .with_attribute(Attribute::new("year_id", SqlType::I64).references("year", "id")),
        )
        .with_collection(
            Collection::new("year")
                .with_attribute(Attribute::new("id", SqlType::I64).identity())
                .with_attribute(Attribute::new("label", SqlType::Text)),
        )
}

fn path(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[test]
fn one_to_many_step() {
    let tree = JoinTree::resolve(&catalog(), "student", &path(&["grade"])).unwrap();
    let root = &tree.root;

    assert_eq!(root.collection, "grade");
    assert_eq!(root.relationship, Relationship::OneToMany);
    assert!(root.aggregated);
    assert_eq!(root.json_key, "grade");
    assert_eq!(
        root.link,
        Link::ForeignKeyOnJoined {
            fk: "student_id".to_string(),
            referenced: "id".to_string(),
        }
    );
    // the grade's own foreign key back to student stays in the payload
    assert_eq!(root.attributes, ["id", "student_id", "course_id", "value"]);
    assert!(root.child.is_none());
}

#[test]
fn many_to_one_step() {
    let tree = JoinTree::resolve(&catalog(), "student", &path(&["club"])).unwrap();
    let root = &tree.root;

    assert_eq!(root.relationship, Relationship::ManyToOne);
    assert!(!root.aggregated);
    assert_eq!(root.json_key, "club");
    assert_eq!(
        root.link,
        Link::ForeignKeyOnParent {
            fk: "club_id".to_string(),
            referenced: "id".to_string(),
        }
    );
}

#[test]
fn nested_step_drops_the_attaching_foreign_key() {
    let tree = JoinTree::resolve(&catalog(), "student", &path(&["grade", "course"])).unwrap();
    let root = &tree.root;
    let child = root.child.as_deref().unwrap();

    // grade -> course is many-to-one through course_id, which is replaced
    // by the nested payload
    assert_eq!(child.relationship, Relationship::ManyToOne);
    assert_eq!(root.attributes, ["id", "student_id", "value"]);
    assert_eq!(child.json_key, "course");
}

#[test]
fn three_step_chain_mixing_cardinalities() {
    let tree =
        JoinTree::resolve(&catalog(), "student", &path(&["grade", "course", "year"])).unwrap();

    let grade = &tree.root;
    let course = grade.child.as_deref().unwrap();
    let year = course.child.as_deref().unwrap();

    assert_eq!(grade.relationship, Relationship::OneToMany);
    assert_eq!(course.relationship, Relationship::ManyToOne);
    assert_eq!(year.relationship, Relationship::ManyToOne);
    // course_id on grade and year_id on course both give way to the nested
    // payloads
    assert_eq!(grade.attributes, ["id", "student_id", "value"]);
    assert_eq!(course.attributes, ["id", "name"]);
    assert_eq!(year.attributes, ["id", "label"]);
}

#[test]
fn many_to_many_resolves_the_junction() {
    let tree = JoinTree::resolve(&catalog(), "student", &path(&["course"])).unwrap();
    let root = &tree.root;

    assert_eq!(root.relationship, Relationship::ManyToMany);
    let Link::ViaJunction(junction) = &root.link else {
        panic!("expected a junction link, got {:?}", root.link);
    };
    assert_eq!(junction.collection, "grade");
    assert_eq!(junction.to_parent.fk_attribute, "student_id");
    assert_eq!(junction.to_joined.fk_attribute, "course_id");
    // the junction's own payload: neither foreign keys nor identity
    assert_eq!(junction.attributes, ["value"]);
}

#[test]
fn join_scope_includes_junctions() {
    let tree = JoinTree::resolve(&catalog(), "student", &path(&["course"])).unwrap();

    assert_eq!(tree.collections(), ["course", "grade"]);
}

#[test]
fn depth_is_capped() {
    let long: Vec<String> = (0..MAX_JOIN_DEPTH + 1).map(|i| format!("c{i}")).collect();

    let err = JoinTree::resolve(&catalog(), "student", &long).unwrap_err();
    assert!(err.is_schema(), "{err}");
}

#[test]
fn empty_path_fails() {
    assert!(JoinTree::resolve(&catalog(), "student", &[]).is_err());
}
