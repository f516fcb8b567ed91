//! # CRUD Rules
//!
//! Read-only metadata served from `GET {base}/crud/{name}` describing how a
//! configuration may be edited: which fields are editable, read-only, or
//! protected, whether records can be added or deleted, the UI field type
//! and hints per field, and optional role permissions.
//!
//! Every member is optional on decode; the service omits what it does not
//! define.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::schema::Schema;

/// CRUD metadata for one configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrudRules {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rules: CrudRuleSet,
    /// UI field type per field (`text`, `number`, `select`, ...).
    #[serde(default)]
    pub field_types: BTreeMap<String, String>,
    #[serde(default)]
    pub validation_rules: BTreeMap<String, serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub ui_hints: BTreeMap<String, serde_json::Map<String, serde_json::Value>>,
    /// Role name → granted permissions. Absent means unrestricted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<BTreeMap<String, Vec<String>>>,
}

/// Field- and record-level edit rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrudRuleSet {
    #[serde(default)]
    pub editable: Vec<String>,
    #[serde(default)]
    pub readonly: Vec<String>,
    #[serde(default)]
    pub protected: Vec<String>,
    #[serde(default)]
    pub addable: bool,
    #[serde(default)]
    pub deletable: bool,
}

/// How a field may be treated by an editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldAccess {
    Editable,
    ReadOnly,
    Protected,
    /// Not mentioned by any rule list.
    Unlisted,
}

impl CrudRules {
    /// Access level for `field`. Protected wins over read-only, which wins
    /// over editable, when a field appears in several lists.
    pub fn access(&self, field: &str) -> FieldAccess {
        let listed = |list: &[String]| list.iter().any(|f| f == field);
        if listed(&self.rules.protected) {
            FieldAccess::Protected
        } else if listed(&self.rules.readonly) {
            FieldAccess::ReadOnly
        } else if listed(&self.rules.editable) {
            FieldAccess::Editable
        } else {
            FieldAccess::Unlisted
        }
    }

    /// Whether `role` holds `permission`. Without a permissions table every
    /// role is allowed; with one, unknown roles are allowed nothing.
    pub fn role_allows(&self, role: &str, permission: &str) -> bool {
        match &self.permissions {
            None => true,
            Some(table) => table
                .get(role)
                .is_some_and(|granted| granted.iter().any(|p| p == permission)),
        }
    }

    fn listed_fields(&self) -> BTreeSet<&str> {
        self.rules
            .editable
            .iter()
            .chain(&self.rules.readonly)
            .chain(&self.rules.protected)
            .map(String::as_str)
            .collect()
    }
}

/// Schema types a UI field type can edit.
fn compatible_types(field_type: &str) -> Option<&'static [&'static str]> {
    let types: &'static [&'static str] = match field_type {
        "text" | "textarea" | "email" | "url" | "password" | "color" | "date" | "datetime"
        | "time" | "tel" | "websocket" => &["string"],
        "number" => &["number", "integer"],
        "select" => &["string", "number"],
        "boolean" => &["boolean"],
        "array" => &["array"],
        "object" => &["object"],
        _ => return None,
    };
    Some(types)
}

fn overlap<'a>(fields: &'a [String], other: &[String]) -> Vec<&'a str> {
    fields
        .iter()
        .filter(|f| other.contains(*f))
        .map(String::as_str)
        .collect()
}

/// Inconsistencies between a configuration's CRUD rules and its schema.
///
/// Reports, in this order: schema fields missing from every rule list, rule
/// fields the schema does not declare, fields both editable and read-only,
/// fields both editable and protected, and UI field types that cannot edit
/// the schema's declared type.
pub fn check_consistency(crud: &CrudRules, schema: &Schema) -> Vec<String> {
    let mut issues = Vec::new();
    let schema_fields: BTreeSet<&str> = schema.properties.keys().map(String::as_str).collect();
    let crud_fields = crud.listed_fields();

    let missing: Vec<&str> = schema_fields.difference(&crud_fields).copied().collect();
    if !missing.is_empty() {
        issues.push(format!("fields in schema but not in CRUD: {}", missing.join(", ")));
    }
    let extra: Vec<&str> = crud_fields.difference(&schema_fields).copied().collect();
    if !extra.is_empty() {
        issues.push(format!("fields in CRUD but not in schema: {}", extra.join(", ")));
    }

    let editable_readonly = overlap(&crud.rules.editable, &crud.rules.readonly);
    if !editable_readonly.is_empty() {
        issues.push(format!(
            "fields both editable and readonly: {}",
            editable_readonly.join(", ")
        ));
    }
    let editable_protected = overlap(&crud.rules.editable, &crud.rules.protected);
    if !editable_protected.is_empty() {
        issues.push(format!(
            "fields both editable and protected: {}",
            editable_protected.join(", ")
        ));
    }

    for (field, field_type) in &crud.field_types {
        let Some(rule) = schema.property(field) else {
            continue;
        };
        let declared = rule.kind.as_deref().unwrap_or("unspecified");
        let ok = compatible_types(field_type).is_some_and(|types| types.contains(&declared));
        if !ok {
            issues.push(format!(
                "invalid field type {field_type} for property {field} of type {declared}"
            ));
        }
    }

    issues
}
