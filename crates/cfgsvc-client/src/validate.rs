//! # Document Validation
//!
//! Checks a [`ConfigDocument`] against a [`Schema`] and returns every
//! violation as a human-readable message.
//!
//! ## Rules
//!
//! 1. Every name in `required` must be present.
//! 2. For every field of the document that the schema declares, in order:
//!    type, string length, numeric bounds, enum membership.
//! 3. Fields the schema does not declare are ignored; schemas are open.
//!
//! `pattern` is carried on [`crate::PropertyRule`] but not enforced.
//!
//! Validation is a pure function of its inputs. Error order is stable:
//! required-field errors in declared order, then per-field errors in the
//! sorted key order of the document.

use serde_json::Value;

use crate::schema::{PropertyRule, Schema};
use crate::types::{ConfigDocument, ValidationResult};

/// Validate `data` against `schema`.
pub fn validate_document(data: &ConfigDocument, schema: &Schema) -> ValidationResult {
    let mut errors = Vec::new();

    for field in &schema.required {
        if !data.contains_key(field) {
            errors.push(format!("required field {field} is missing"));
        }
    }

    let mut fields: Vec<(&String, &Value)> = data.iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in fields {
        if let Some(rule) = schema.property(key) {
            validate_field(key, value, rule, &mut errors);
        }
    }

    ValidationResult::from_errors(errors)
}

fn validate_field(key: &str, value: &Value, rule: &PropertyRule, errors: &mut Vec<String>) {
    if let Some(expected) = rule.kind.as_deref() {
        if !matches_type(value, expected) {
            errors.push(format!("field {key}: expected {expected}"));
        }
    }

    if let Value::String(s) = value {
        let len = s.chars().count() as f64;
        if let Some(min) = rule.min_length {
            if len < min {
                errors.push(format!("field {key}: minimum length is {min}"));
            }
        }
        if let Some(max) = rule.max_length {
            if len > max {
                errors.push(format!("field {key}: maximum length is {max}"));
            }
        }
    }

    if let Some(n) = value.as_f64() {
        if let Some(min) = rule.minimum {
            if n < min {
                errors.push(format!("field {key}: minimum value is {min}"));
            }
        }
        if let Some(max) = rule.maximum {
            if n > max {
                errors.push(format!("field {key}: maximum value is {max}"));
            }
        }
    }

    if let Some(allowed) = &rule.allowed {
        if !allowed.iter().any(|candidate| json_eq(candidate, value)) {
            errors.push(format!("field {key}: value not in allowed enum"));
        }
    }
}

/// Whether `value` has the JSON type named by `expected`.
///
/// `integer` accepts any number with a zero fractional part, so `2.0`
/// passes and `1.5` does not. Unknown type names pass.
pub fn matches_type(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => match value {
            Value::Number(n) => {
                n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            _ => false,
        },
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        _ => true,
    }
}

/// Deep equality where numbers compare by value (`1 == 1.0`).
pub fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                x == y
            } else {
                x.as_f64() == y.as_f64()
            }
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| json_eq(x, y)))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: Value) -> Schema {
        Schema::from_value(value).unwrap()
    }

    fn doc(value: Value) -> ConfigDocument {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn missing_required_field_is_reported() {
        let result = validate_document(&doc(json!({})), &schema(json!({"required": ["a"]})));
        assert!(!result.valid);
        assert_eq!(result.errors, vec!["required field a is missing"]);
    }

    #[test]
    fn required_errors_follow_declared_order() {
        let result = validate_document(
            &doc(json!({})),
            &schema(json!({"required": ["zeta", "alpha"]})),
        );
        assert_eq!(
            result.errors,
            vec!["required field zeta is missing", "required field alpha is missing"]
        );
    }

    #[test]
    fn null_counts_as_present() {
        let s = schema(json!({"required": ["a"]}));
        let result = validate_document(&doc(json!({"a": null})), &s);
        assert!(result.valid);
    }

    #[test]
    fn fractional_integer_is_rejected() {
        let s = schema(json!({"properties": {"n": {"type": "integer"}}}));
        let bad = validate_document(&doc(json!({"n": 1.5})), &s);
        assert_eq!(bad.errors, vec!["field n: expected integer"]);
        assert!(validate_document(&doc(json!({"n": 2})), &s).valid);
        assert!(validate_document(&doc(json!({"n": 2.0})), &s).valid);
        assert!(validate_document(&doc(json!({"n": -7})), &s).valid);
        assert!(!validate_document(&doc(json!({"n": "2"})), &s).valid);
    }

    #[test]
    fn each_declared_type_is_checked() {
        let s = schema(json!({"properties": {
            "s": {"type": "string"},
            "n": {"type": "number"},
            "b": {"type": "boolean"},
            "a": {"type": "array"},
            "o": {"type": "object"}
        }}));
        let ok = doc(json!({"s": "x", "n": 1.25, "b": false, "a": [], "o": {}}));
        assert!(validate_document(&ok, &s).valid);

        let wrong = doc(json!({"s": 1, "n": "1", "b": "no", "a": {}, "o": []}));
        let result = validate_document(&wrong, &s);
        assert_eq!(
            result.errors,
            vec![
                "field a: expected array",
                "field b: expected boolean",
                "field n: expected number",
                "field o: expected object",
                "field s: expected string",
            ]
        );
    }

    #[test]
    fn unknown_or_missing_type_passes() {
        let s = schema(json!({"properties": {"x": {"type": "uuid"}, "y": {}}}));
        assert!(validate_document(&doc(json!({"x": 3, "y": [1]})), &s).valid);
    }

    #[test]
    fn string_length_bounds_count_characters() {
        let s = schema(json!({
            "properties": {"name": {"type": "string", "minLength": 2, "maxLength": 4}}
        }));
        assert_eq!(
            validate_document(&doc(json!({"name": "a"})), &s).errors,
            vec!["field name: minimum length is 2"]
        );
        assert_eq!(
            validate_document(&doc(json!({"name": "abcde"})), &s).errors,
            vec!["field name: maximum length is 4"]
        );
        // Four characters, eight bytes.
        assert!(validate_document(&doc(json!({"name": "ßßßß"})), &s).valid);
    }

    #[test]
    fn length_bounds_skip_non_strings() {
        let s = schema(json!({"properties": {"name": {"minLength": 2}}}));
        assert!(validate_document(&doc(json!({"name": 1})), &s).valid);
    }

    #[test]
    fn numeric_bounds() {
        let s = schema(json!({
            "properties": {"level": {"type": "number", "minimum": 0.5, "maximum": 10}}
        }));
        assert_eq!(
            validate_document(&doc(json!({"level": 0})), &s).errors,
            vec!["field level: minimum value is 0.5"]
        );
        assert_eq!(
            validate_document(&doc(json!({"level": 11})), &s).errors,
            vec!["field level: maximum value is 10"]
        );
        assert!(validate_document(&doc(json!({"level": 10})), &s).valid);
    }

    #[test]
    fn pattern_is_not_enforced() {
        let s = schema(json!({"properties": {"code": {"type": "string", "pattern": "^[0-9]+$"}}}));
        assert!(validate_document(&doc(json!({"code": "abc"})), &s).valid);
    }

    #[test]
    fn enum_membership() {
        let s = schema(json!({"properties": {"c": {"enum": ["red", "blue"]}}}));
        assert_eq!(
            validate_document(&doc(json!({"c": "green"})), &s).errors,
            vec!["field c: value not in allowed enum"]
        );
        assert!(validate_document(&doc(json!({"c": "red"})), &s).valid);
    }

    #[test]
    fn enum_uses_deep_numeric_equality() {
        let s = schema(json!({"properties": {
            "n": {"enum": [1, 2]},
            "p": {"enum": [{"x": [1, {"y": 2.0}]}]}
        }}));
        assert!(validate_document(&doc(json!({"n": 1.0, "p": {"x": [1.0, {"y": 2}]}})), &s).valid);
        assert!(!validate_document(&doc(json!({"p": {"x": [1]}})), &s).valid);
    }

    #[test]
    fn constraint_order_within_a_field() {
        let s = schema(json!({
            "properties": {"v": {"type": "boolean", "maxLength": 1, "enum": [true]}}
        }));
        assert_eq!(
            validate_document(&doc(json!({"v": "long"})), &s).errors,
            vec![
                "field v: expected boolean",
                "field v: maximum length is 1",
                "field v: value not in allowed enum",
            ]
        );
    }

    #[test]
    fn required_errors_precede_field_errors() {
        let s = schema(json!({
            "required": ["id"],
            "properties": {"a": {"type": "string"}}
        }));
        assert_eq!(
            validate_document(&doc(json!({"a": 1})), &s).errors,
            vec!["required field id is missing", "field a: expected string"]
        );
    }

    #[test]
    fn undeclared_fields_are_ignored() {
        let s = schema(json!({"properties": {"a": {"type": "string"}}}));
        assert!(validate_document(&doc(json!({"a": "x", "extra": [1, 2, 3]})), &s).valid);
    }

    #[test]
    fn type_union_accepts_any_value() {
        let s = schema(json!({
            "required": ["id"],
            "properties": {
                "id": {"type": "integer"},
                "lastSync": {"type": ["null", "string"]}
            }
        }));
        assert!(validate_document(&doc(json!({"id": 1, "lastSync": null})), &s).valid);
        assert!(validate_document(&doc(json!({"id": 1, "lastSync": 42})), &s).valid);
        assert_eq!(
            validate_document(&doc(json!({"id": "x", "lastSync": "now"})), &s).errors,
            vec!["field id: expected integer"]
        );
    }

    #[test]
    fn float_length_bounds_are_enforced() {
        let s = schema(json!({"properties": {"name": {"minLength": 1.0, "maxLength": 3.0}}}));
        assert_eq!(
            validate_document(&doc(json!({"name": ""})), &s).errors,
            vec!["field name: minimum length is 1"]
        );
        assert_eq!(
            validate_document(&doc(json!({"name": "abcd"})), &s).errors,
            vec!["field name: maximum length is 3"]
        );
        assert!(validate_document(&doc(json!({"name": "abc"})), &s).valid);
    }

    #[test]
    fn wrongly_shaped_constraints_are_skipped() {
        let s = schema(json!({
            "properties": {
                "a": {"minimum": "low", "maxLength": "long", "enum": "x"},
                "b": "string"
            }
        }));
        assert!(validate_document(&doc(json!({"a": -100, "b": 7})), &s).valid);
    }
}
