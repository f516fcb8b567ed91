//! # Configuration Schemas
//!
//! A deliberately small subset of JSON Schema: a list of `required` field
//! names plus per-property constraints (`type`, `minLength`, `maxLength`,
//! `pattern`, `minimum`, `maximum`, `enum`). Everything else in the
//! document (`$schema`, `title`, `description`, nested definitions) is
//! retained in `extra` so a loaded schema round-trips unchanged.
//!
//! Schemas arrive from `GET {base}/schemas/{name}` and are decoded
//! leniently. A constraint whose value has an unexpected shape (a `type`
//! union such as `["null", "string"]`, a non-numeric bound, a property entry
//! that is not an object) does not fail the load: it is left in `extra`
//! untouched and validation treats the constraint as absent. Only a body
//! that is not a JSON object is a decode error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

type JsonObject = serde_json::Map<String, Value>;

/// A configuration schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "JsonObject", into = "JsonObject")]
pub struct Schema {
    /// Field names that must be present, checked in declared order.
    pub required: Vec<String>,
    /// Constraint set per field name.
    pub properties: BTreeMap<String, PropertyRule>,
    /// Unrecognized or unusable top-level members.
    pub extra: serde_json::Map<String, Value>,
}

/// Constraints on a single field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "JsonObject", into = "JsonObject")]
pub struct PropertyRule {
    /// Expected JSON type name. Unknown names always pass.
    pub kind: Option<String>,
    pub min_length: Option<f64>,
    pub max_length: Option<f64>,
    /// Accepted and preserved, not enforced.
    pub pattern: Option<String>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub allowed: Option<Vec<Value>>,
    /// Unrecognized members (`description`, `default`, `format`, ...) and
    /// known members whose value had an unexpected shape.
    pub extra: serde_json::Map<String, Value>,
}

/// Remove `key` from `map` only when `read` accepts its value.
fn take_if<T>(
    map: &mut JsonObject,
    key: &str,
    read: impl FnOnce(&Value) -> Option<T>,
) -> Option<T> {
    let parsed = map.get(key).and_then(read)?;
    map.remove(key);
    Some(parsed)
}

/// Integral bounds go back out as integers so `"maxLength": 4` round-trips.
fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

impl From<JsonObject> for PropertyRule {
    fn from(mut map: JsonObject) -> Self {
        Self {
            kind: take_if(&mut map, "type", |v| v.as_str().map(str::to_string)),
            min_length: take_if(&mut map, "minLength", Value::as_f64),
            max_length: take_if(&mut map, "maxLength", Value::as_f64),
            pattern: take_if(&mut map, "pattern", |v| v.as_str().map(str::to_string)),
            minimum: take_if(&mut map, "minimum", Value::as_f64),
            maximum: take_if(&mut map, "maximum", Value::as_f64),
            allowed: take_if(&mut map, "enum", |v| v.as_array().cloned()),
            extra: map,
        }
    }
}

impl From<PropertyRule> for JsonObject {
    fn from(rule: PropertyRule) -> Self {
        let mut map = rule.extra;
        if let Some(kind) = rule.kind {
            map.insert("type".into(), Value::String(kind));
        }
        let bounds = [
            ("minLength", rule.min_length),
            ("maxLength", rule.max_length),
            ("minimum", rule.minimum),
            ("maximum", rule.maximum),
        ];
        for (key, bound) in bounds {
            if let Some(n) = bound {
                map.insert(key.into(), number(n));
            }
        }
        if let Some(pattern) = rule.pattern {
            map.insert("pattern".into(), Value::String(pattern));
        }
        if let Some(allowed) = rule.allowed {
            map.insert("enum".into(), Value::Array(allowed));
        }
        map
    }
}

impl From<JsonObject> for Schema {
    fn from(mut map: JsonObject) -> Self {
        // Non-string `required` entries are skipped.
        let required = take_if(&mut map, "required", |v| {
            v.as_array().map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
        });
        // Property entries that are not objects carry no usable constraint.
        let properties = take_if(&mut map, "properties", |v| {
            v.as_object().map(|props| {
                props
                    .iter()
                    .filter_map(|(name, rule)| {
                        let rule = rule.as_object()?.clone();
                        Some((name.clone(), PropertyRule::from(rule)))
                    })
                    .collect()
            })
        });
        Self {
            required: required.unwrap_or_default(),
            properties: properties.unwrap_or_default(),
            extra: map,
        }
    }
}

impl From<Schema> for JsonObject {
    fn from(schema: Schema) -> Self {
        let mut map = schema.extra;
        if !schema.required.is_empty() {
            let required = schema.required.into_iter().map(Value::String).collect();
            map.insert("required".into(), Value::Array(required));
        }
        if !schema.properties.is_empty() {
            let properties = schema
                .properties
                .into_iter()
                .map(|(name, rule)| (name, Value::Object(rule.into())))
                .collect();
            map.insert("properties".into(), Value::Object(properties));
        }
        map
    }
}

impl Schema {
    /// Decode a schema from an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Constraints for `field`, if the schema declares it.
    pub fn property(&self, field: &str) -> Option<&PropertyRule> {
        self.properties.get(field)
    }

    /// Structural problems that make a property unsatisfiable.
    ///
    /// Reports `minLength > maxLength` and `minimum > maximum`. These are
    /// warnings for tooling; validation runs regardless.
    pub fn lint(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for (name, rule) in &self.properties {
            if let (Some(min), Some(max)) = (rule.min_length, rule.max_length) {
                if min > max {
                    issues.push(format!(
                        "property {name}: minLength {min} is greater than maxLength {max}"
                    ));
                }
            }
            if let (Some(min), Some(max)) = (rule.minimum, rule.maximum) {
                if min > max {
                    issues.push(format!(
                        "property {name}: minimum {min} is greater than maximum {max}"
                    ));
                }
            }
        }
        issues
    }
}
