// canonical.rs — Deterministic JSON serialization for certificate digests
//
// Canonical JSON: sorted object keys at every level, compact format (no
// whitespace), standard JSON string escaping. Arrays keep their order, so
// the order of `additionalData` pairs is part of the hashed content while
// the order in which top-level fields are supplied is not.
//
// RULE: absent optional fields (gpa, verifiedBy) are written as "" and never
// omitted. Issuance and verification both go through `hashable_field_map`,
// so the two sides can never disagree on this.

use serde_json::{Map, Value};

use crate::cert::model::{HashableFields, MetadataPair};

/// Build the field-name → value mapping covered by the digest.
pub fn hashable_field_map(fields: &HashableFields) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("id".into(), Value::String(fields.id.clone()));
    map.insert("studentName".into(), Value::String(fields.student_name.clone()));
    map.insert("university".into(), Value::String(fields.university.clone()));
    map.insert("degree".into(), Value::String(fields.degree.clone()));
    map.insert("program".into(), Value::String(fields.program.clone()));
    map.insert(
        "graduationDate".into(),
        Value::String(fields.graduation_date.clone()),
    );
    map.insert("gpa".into(), optional(&fields.gpa));
    map.insert("issueDate".into(), Value::String(fields.issue_date.clone()));
    map.insert("verifiedBy".into(), optional(&fields.verified_by));
    map.insert(
        "additionalData".into(),
        Value::Array(fields.additional_data.iter().map(pair_value).collect()),
    );
    map
}

/// Canonical bytes of the hashable field set.
pub fn canonical_bytes(fields: &HashableFields) -> Vec<u8> {
    canonical_map_bytes(&hashable_field_map(fields))
}

/// Canonical bytes of an arbitrary field mapping.
pub fn canonical_map_bytes(map: &Map<String, Value>) -> Vec<u8> {
    let mut out = String::new();
    write_object(map, &mut out);
    out.into_bytes()
}

#[cfg(test)]
fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn optional(value: &Option<String>) -> Value {
    Value::String(value.clone().unwrap_or_default())
}

fn pair_value(pair: &MetadataPair) -> Value {
    let mut obj = Map::new();
    obj.insert("key".into(), Value::String(pair.key.clone()));
    obj.insert("value".into(), Value::String(pair.value.clone()));
    Value::Object(obj)
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_string(s, out),
        Value::Array(arr) => {
            out.push('[');
            for (i, v) in arr.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(v, out);
            }
            out.push(']');
        }
        Value::Object(map) => write_object(map, out),
    }
}

fn write_object(map: &Map<String, Value>, out: &mut String) {
    // serde_json::Map ordering depends on crate features; sort explicitly.
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();

    out.push('{');
    for (i, key) in keys.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_string(key, out);
        out.push(':');
        write_canonical(&map[*key], out);
    }
    out.push('}');
}

fn write_string(s: &str, out: &mut String) {
    // Display on a string Value is its JSON encoding and cannot fail.
    out.push_str(&Value::String(s.to_owned()).to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> HashableFields {
        HashableFields {
            id: "CERT-2024-1".into(),
            student_name: "Jane Doe".into(),
            university: "Tech U".into(),
            degree: "BSc".into(),
            program: "CS".into(),
            graduation_date: "2024-05-01".into(),
            gpa: Some("3.8".into()),
            issue_date: "2024-05-02".into(),
            verified_by: Some("Registrar".into()),
            additional_data: vec![],
        }
    }

    #[test]
    fn canonical_form_is_sorted_and_compact() {
        let bytes = canonical_bytes(&jane());
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"additionalData":[],"degree":"BSc","gpa":"3.8","graduationDate":"2024-05-01","id":"CERT-2024-1","issueDate":"2024-05-02","program":"CS","studentName":"Jane Doe","university":"Tech U","verifiedBy":"Registrar"}"#
        );
    }

    #[test]
    fn absent_optionals_are_written_as_empty_strings() {
        let mut f = jane();
        f.gpa = None;
        f.verified_by = None;
        let json = String::from_utf8(canonical_bytes(&f)).unwrap();
        assert!(json.contains(r#""gpa":"""#));
        assert!(json.contains(r#""verifiedBy":"""#));
    }

    #[test]
    fn metadata_pairs_keep_supplied_order() {
        let mut f = jane();
        f.additional_data = vec![
            MetadataPair::new("Minor", "Mathematics"),
            MetadataPair::new("Honors", "Summa Cum Laude"),
        ];
        let json = String::from_utf8(canonical_bytes(&f)).unwrap();
        assert!(json.contains(
            r#""additionalData":[{"key":"Minor","value":"Mathematics"},{"key":"Honors","value":"Summa Cum Laude"}]"#
        ));
    }

    #[test]
    fn insertion_order_does_not_matter() {
        let forward = hashable_field_map(&jane());
        let mut reversed = Map::new();
        let mut entries: Vec<_> = forward.iter().collect();
        entries.reverse();
        for (k, v) in entries {
            reversed.insert(k.clone(), v.clone());
        }
        assert_eq!(canonical_map_bytes(&forward), canonical_map_bytes(&reversed));
    }

    #[test]
    fn canonical_sorts_object_keys() {
        let value: Value = serde_json::from_str(r#"{"z":1,"a":2,"m":3}"#).unwrap();
        assert_eq!(canonical_json(&value), r#"{"a":2,"m":3,"z":1}"#);
    }

    #[test]
    fn canonical_handles_nested_objects() {
        let value: Value = serde_json::from_str(r#"{"b":{"z":1,"a":2},"a":true}"#).unwrap();
        assert_eq!(canonical_json(&value), r#"{"a":true,"b":{"a":2,"z":1}}"#);
    }

    #[test]
    fn canonical_escapes_strings() {
        let value: Value =
            serde_json::from_str(r#"{"key":"hello \"world\"\nnewline"}"#).unwrap();
        assert_eq!(
            canonical_json(&value),
            r#"{"key":"hello \"world\"\nnewline"}"#
        );
    }

    #[test]
    fn keys_sort_by_ordinal_not_case_folded() {
        let value: Value = serde_json::from_str(r#"{"b":1,"B":2,"a":3}"#).unwrap();
        assert_eq!(canonical_json(&value), r#"{"B":2,"a":3,"b":1}"#);
    }
}
