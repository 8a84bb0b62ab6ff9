use serde_json::{Map, Value};

use std::collections::BTreeMap;

/// Reverses the flattening suffix-encoding.
///
/// Keys carrying a trailing digit run (`grade0`, `grade1`, ...) are grouped
/// by that run into one record per synthetic id, each carrying its
/// stripped-name attributes plus an `id` field. Keys without a digit suffix
/// belong to no nested record and are dropped. Anything that is not an
/// array of objects passes through untouched.
pub(crate) fn deflatten(json: Value) -> Value {
    let Value::Array(rows) = json else {
        return json;
    };

    let mut records: BTreeMap<i64, Map<String, Value>> = BTreeMap::new();
    for row in &rows {
        let Value::Object(fields) = row else {
            continue;
        };
        for (key, value) in fields {
            let stripped = key.trim_end_matches(|c: char| c.is_ascii_digit());
            if stripped.len() == key.len() {
                continue;
            }
            let Ok(id) = key[stripped.len()..].parse::<i64>() else {
                continue;
            };
            records
                .entry(id)
                .or_default()
                .insert(stripped.to_string(), value.clone());
        }
    }

    Value::Array(
        records
            .into_iter()
            .map(|(id, mut fields)| {
                fields.insert("id".to_string(), Value::from(id));
                Value::Object(fields)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn groups_by_digit_suffix() {
        let flat = json!([
            {"grade0": 1.3, "credits0": 5, "grade1": 2.0, "credits1": 10}
        ]);
        let expected = json!([
            {"id": 0, "grade": 1.3, "credits": 5},
            {"id": 1, "grade": 2.0, "credits": 10}
        ]);
        assert_eq!(deflatten(flat), expected);
    }

    #[test]
    fn unsuffixed_keys_are_dropped() {
        let flat = json!([{"name": "ada", "grade0": 1.0}]);
        assert_eq!(deflatten(flat), json!([{"id": 0, "grade": 1.0}]));
    }

    #[test]
    fn later_rows_overwrite_earlier_values() {
        let flat = json!([{"grade0": 1.0}, {"grade0": 2.0}]);
        assert_eq!(deflatten(flat), json!([{"id": 0, "grade": 2.0}]));
    }

    #[test]
    fn non_array_input_passes_through() {
        assert_eq!(deflatten(json!({"a": 1})), json!({"a": 1}));
    }

    #[test]
    fn round_trips_the_flattening_encoding() {
        // flatten three nested records the way the encoding defines it,
        // then reverse it
        let records = json!([
            {"id": 0, "grade": 1.0},
            {"id": 1, "grade": 1.7},
            {"id": 2, "grade": 3.0}
        ]);
        let flat = json!([
            {"grade0": 1.0, "grade1": 1.7, "grade2": 3.0}
        ]);
        assert_eq!(deflatten(flat), records);
    }
}
