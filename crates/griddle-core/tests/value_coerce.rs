use griddle_core::stmt::{SqlType, Value, Warning};

use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;

fn coerce(raw: &str, ty: SqlType) -> griddle_core::Result<(Value, Vec<Warning>)> {
    let mut warnings = vec![];
    let value = Value::coerce(raw, &ty, &mut warnings)?;
    Ok((value, warnings))
}

#[test]
fn integers_dispatch_on_declared_width() {
    assert_eq!(coerce("7", SqlType::I16).unwrap().0, Value::I16(7));
    assert_eq!(coerce("7", SqlType::I32).unwrap().0, Value::I32(7));
    assert_eq!(coerce(" 7 ", SqlType::I64).unwrap().0, Value::I64(7));
}

#[test]
fn floats_cover_numeric_columns() {
    assert_eq!(coerce("2.5", SqlType::F64).unwrap().0, Value::F64(2.5));
    assert_eq!(coerce("-1", SqlType::F64).unwrap().0, Value::F64(-1.0));
}

#[test]
fn type_mismatch_fails_fast() {
    assert!(coerce("abc", SqlType::I32).is_err());
    assert!(coerce("1.5", SqlType::I32).is_err());
    assert!(coerce("abc", SqlType::F64).is_err());
    assert!(coerce("maybe", SqlType::Bool).is_err());
}

#[test]
fn booleans_accept_common_spellings() {
    assert_eq!(coerce("true", SqlType::Bool).unwrap().0, Value::Bool(true));
    assert_eq!(coerce("T", SqlType::Bool).unwrap().0, Value::Bool(true));
    assert_eq!(coerce("0", SqlType::Bool).unwrap().0, Value::Bool(false));
}

#[test]
fn timestamps_accept_iso_variants() {
    let expected = Value::Timestamp(
        NaiveDateTime::parse_from_str("2024-05-01T12:30:00", "%Y-%m-%dT%H:%M:%S").unwrap(),
    );
    assert_eq!(
        coerce("2024-05-01T12:30:00", SqlType::Timestamp).unwrap().0,
        expected
    );
    assert_eq!(
        coerce("2024-05-01 12:30:00", SqlType::Timestamp).unwrap().0,
        expected
    );
}

#[test]
fn date_only_timestamps_start_at_midnight() {
    let (value, warnings) = coerce("2024-05-01", SqlType::Timestamp).unwrap();
    assert_eq!(
        value,
        Value::Timestamp(
            NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        )
    );
    assert!(warnings.is_empty());
}

#[test]
fn out_of_range_timestamps_clamp_with_a_warning() {
    let (value, warnings) = coerce("999999-01-01T00:00:00", SqlType::Timestamp).unwrap();
    assert_eq!(value, Value::Timestamp(NaiveDateTime::MAX));
    assert_eq!(warnings.len(), 1);

    let (value, warnings) = coerce("-999999-01-01T00:00:00", SqlType::Timestamp).unwrap();
    assert_eq!(value, Value::Timestamp(NaiveDateTime::MIN));
    assert_eq!(warnings.len(), 1);
}

#[test]
fn garbage_timestamps_still_fail() {
    assert!(coerce("not-a-date", SqlType::Timestamp).is_err());
}

#[test]
fn text_passes_through() {
    assert_eq!(
        coerce("hello", SqlType::Text).unwrap().0,
        Value::String("hello".to_string())
    );
}

#[test]
fn unsupported_types_fail() {
    assert!(coerce("x", SqlType::Other("tsvector".to_string())).is_err());
}

#[test]
fn catalog_names_fold_into_the_closed_type_set() {
    assert_eq!(SqlType::from_catalog("int2"), SqlType::I16);
    assert_eq!(SqlType::from_catalog("int4"), SqlType::I32);
    assert_eq!(SqlType::from_catalog("int8"), SqlType::I64);
    assert_eq!(SqlType::from_catalog("float4"), SqlType::F64);
    assert_eq!(SqlType::from_catalog("double precision"), SqlType::F64);
    assert_eq!(SqlType::from_catalog("numeric"), SqlType::F64);
    assert_eq!(SqlType::from_catalog("varchar"), SqlType::Text);
    assert_eq!(SqlType::from_catalog("timestamptz"), SqlType::Timestamp);
    assert_eq!(SqlType::from_catalog("jsonb"), SqlType::Json);
    assert_eq!(SqlType::from_catalog("geometry"), SqlType::Geometry);
    assert_eq!(SqlType::from_catalog("bytea"), SqlType::Bytes);
    assert_eq!(
        SqlType::from_catalog("tsvector"),
        SqlType::Other("tsvector".to_string())
    );
}
