use griddle_core::schema::{Attribute, Collection};
use griddle_core::stmt::{FilterOp, FilterParser, SqlType, Value, Warning};
use griddle_core::Catalog;

use pretty_assertions::assert_eq;

fn catalog() -> Catalog {
    Catalog::new("public")
        .with_collection(
            Collection::new("measurement")
                .with_attribute(Attribute::new("id", SqlType::I64).identity())
                .with_attribute(Attribute::new("name", SqlType::Text))
                .with_attribute(Attribute::new("value", SqlType::F64))
                .with_attribute(Attribute::new("count", SqlType::I32))
                .with_attribute(Attribute::new("taken_at", SqlType::Timestamp))
                .with_attribute(
                    Attribute::new("location", SqlType::Geometry).with_geometry("POINT", 25832, 2),
                ),
        )
        .with_collection(
            Collection::new("sensor")
                .with_attribute(Attribute::new("id", SqlType::I64).identity())
                .with_attribute(Attribute::new("serial", SqlType::Text)),
        )
}

fn parser(catalog: &Catalog) -> FilterParser<'_> {
    FilterParser::new(catalog, "measurement")
}

#[test]
fn parses_equality() {
    let catalog = catalog();
    let filter = parser(&catalog).parse("count,eq,42").unwrap();

    assert_eq!(filter.op, FilterOp::Eq);
    assert!(!filter.negated);
    assert_eq!(filter.values, [Value::I32(42)]);
    assert_eq!(filter.placeholders(), 1);
    assert_eq!(filter.first_placeholder, None);
}

#[test]
fn leading_n_negates() {
    let catalog = catalog();

    let filter = parser(&catalog).parse("count,nin,1,2,3").unwrap();
    assert_eq!(filter.op, FilterOp::In);
    assert!(filter.negated);
    assert_eq!(filter.placeholders(), 3);

    let filter = parser(&catalog).parse("value,nbt,1.5,2.5").unwrap();
    assert_eq!(filter.op, FilterOp::Bt);
    assert!(filter.negated);
    assert_eq!(filter.values, [Value::F64(1.5), Value::F64(2.5)]);
}

#[test]
fn null_test_takes_no_operands() {
    let catalog = catalog();

    let filter = parser(&catalog).parse("name,is").unwrap();
    assert_eq!(filter.op, FilterOp::Is);
    assert_eq!(filter.placeholders(), 0);

    assert!(parser(&catalog).parse("name,is,null").is_err());
}

#[test]
fn substring_operators_wrap_the_pattern() {
    let catalog = catalog();

    let contains = parser(&catalog).parse("name,cs,abc").unwrap();
    assert_eq!(contains.values, [Value::String("%abc%".to_string())]);

    let starts = parser(&catalog).parse("name,sw,abc").unwrap();
    assert_eq!(starts.values, [Value::String("abc%".to_string())]);

    let ends = parser(&catalog).parse("name,new,abc").unwrap();
    assert_eq!(ends.op, FilterOp::Ew);
    assert!(ends.negated);
    assert_eq!(ends.values, [Value::String("%abc".to_string())]);
}

#[test]
fn substring_operators_require_text() {
    let catalog = catalog();

    assert!(parser(&catalog).parse("count,cs,1").unwrap_err().is_filter());
}

#[test]
fn unknown_attribute_fails() {
    let catalog = catalog();

    let err = parser(&catalog).parse("pressure,eq,1").unwrap_err();
    assert!(err.is_filter(), "{err}");
}

#[test]
fn unknown_opcode_fails() {
    let catalog = catalog();

    assert!(parser(&catalog).parse("count,zz,1").unwrap_err().is_filter());
}

#[test]
fn wrong_operand_count_fails() {
    let catalog = catalog();

    assert!(parser(&catalog).parse("value,bt,1").is_err());
    assert!(parser(&catalog).parse("value,bt,1,2,3").is_err());
    assert!(parser(&catalog).parse("count,eq").is_err());
}

#[test]
fn coercion_failure_fails_fast() {
    let catalog = catalog();

    let err = parser(&catalog).parse("count,eq,notanumber").unwrap_err();
    assert!(err.is_filter(), "{err}");
}

#[test]
fn dotted_reference_needs_the_join_scope() {
    let catalog = catalog();

    let err = parser(&catalog).parse("sensor.serial,eq,a1").unwrap_err();
    assert!(err.is_filter(), "{err}");

    let filter = FilterParser::new(&catalog, "measurement")
        .with_scope(["sensor".to_string()])
        .parse("sensor.serial,eq,a1")
        .unwrap();
    assert_eq!(filter.qualifier.as_deref(), Some("sensor"));
    assert_eq!(filter.attribute, "serial");
}

#[test]
fn base_collection_may_qualify_itself() {
    let catalog = catalog();

    let filter = parser(&catalog).parse("measurement.count,gt,1").unwrap();
    assert_eq!(filter.qualifier.as_deref(), Some("measurement"));
}

#[test]
fn radius_search_reorders_operands_for_binding() {
    let catalog = catalog();

    let filter = parser(&catalog)
        .parse("location,sir,471000.5,5758000.25,250,25832,25832")
        .unwrap();
    assert_eq!(filter.op, FilterOp::Sir);
    assert_eq!(filter.placeholders(), 5);
    // bind order: x, y, srid, table srid, radius
    assert_eq!(
        filter.values,
        [
            Value::F64(471000.5),
            Value::F64(5758000.25),
            Value::I32(25832),
            Value::I32(25832),
            Value::F64(250.0),
        ]
    );
}

#[test]
fn bounding_box_takes_six_operands() {
    let catalog = catalog();

    let filter = parser(&catalog)
        .parse("location,sib,1.0,2.0,3.0,4.0,4326,25832")
        .unwrap();
    assert_eq!(filter.placeholders(), 6);
}

#[test]
fn topology_operators_take_one_geometry_literal() {
    let catalog = catalog();

    let filter = parser(&catalog)
        .parse("location,swi,POLYGON((0 0,0 1,1 1,0 0))")
        .unwrap();
    assert_eq!(filter.op, FilterOp::Swi);
    assert_eq!(filter.srid, Some(25832));
    // the literal's own commas survive: the remainder is one operand
    assert_eq!(
        filter.values,
        [Value::Geometry("POLYGON((0 0,0 1,1 1,0 0))".to_string())]
    );
    assert_eq!(filter.placeholders(), 1);
}

#[test]
fn validity_operators_are_unary() {
    let catalog = catalog();

    let filter = parser(&catalog).parse("location,siv").unwrap();
    assert_eq!(filter.op, FilterOp::Siv);
    assert_eq!(filter.placeholders(), 0);

    let negated = parser(&catalog).parse("location,nsiv").unwrap();
    assert!(negated.negated);
}

#[test]
fn spatial_operators_require_geometry() {
    let catalog = catalog();

    assert!(parser(&catalog).parse("count,siv").unwrap_err().is_filter());
}

#[test]
fn out_of_range_timestamp_clamps_with_a_warning() {
    let catalog = catalog();

    let filter = parser(&catalog)
        .parse("taken_at,gt,999999-01-01T00:00:00")
        .unwrap();
    assert_eq!(filter.warnings.len(), 1);
    assert!(matches!(
        filter.warnings[0],
        Warning::TimestampClamped { .. }
    ));
}
