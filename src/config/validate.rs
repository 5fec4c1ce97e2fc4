//! Schema-driven validation and stripping of config trees.
//!
//! Mappings are stripped in place to the keys their schema declares, then
//! field-checked without short-circuiting so that every missing or mistyped
//! field is reported in a single pass. Child sections are only visited while
//! the enclosing mapping is still valid. Lists stop at the first failing
//! element.

use super::schema::{SchemaNode, describe};
use crate::error::ValidationIssue;
use serde_json::{Map, Value};
use tracing::{debug, error};

/// Outcome of validating a tree against a schema.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    valid: bool,
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.issues
    }
}

/// Validate `value` against `schema`, stripping undeclared and falsy keys from
/// every mapping visited. `key` names the value in reported issues.
pub fn validate(key: &str, value: &mut Value, schema: &SchemaNode) -> ValidationReport {
    let mut issues = Vec::new();
    let valid = validate_node(key, value, schema, &mut issues);
    ValidationReport { valid, issues }
}

/// Whether a value counts as absent after stripping.
///
/// Empty lists and mappings are kept so list minimums can still be enforced.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Drop keys the schema does not declare, and declared keys holding falsy values.
pub fn strip(map: &mut Map<String, Value>, schema: &SchemaNode) {
    map.retain(|key, value| schema.allows(key) && !is_falsy(value));
}

fn validate_node(
    key: &str,
    value: &mut Value,
    schema: &SchemaNode,
    issues: &mut Vec<ValidationIssue>,
) -> bool {
    match value {
        Value::Object(map) => validate_mapping(key, map, schema, issues),
        Value::Array(items) => validate_sequence(key, items, schema, issues),
        // Scalars carry no structure of their own to check.
        _ => true,
    }
}

fn validate_mapping(
    key: &str,
    map: &mut Map<String, Value>,
    schema: &SchemaNode,
    issues: &mut Vec<ValidationIssue>,
) -> bool {
    strip(map, schema);
    debug!(section = key, entries = map.len(), "Validating mapping");

    let mut valid = true;
    for (field, kind) in &schema.required_entries {
        match map.get(field) {
            None => {
                report(issues, ValidationIssue::missing_field(field, key));
                valid = false;
            }
            Some(value) if !kind.matches(value) => {
                report(
                    issues,
                    ValidationIssue::type_mismatch(field, *kind, describe(value)),
                );
                valid = false;
            }
            Some(_) => {}
        }
    }

    for (field, kind) in &schema.optional_entries {
        if let Some(value) = map.get(field) {
            if !kind.matches(value) {
                report(
                    issues,
                    ValidationIssue::optional_type_mismatch(field, *kind, describe(value)),
                );
                valid = false;
            }
        }
    }

    for (child_key, child_schema) in &schema.children {
        if !valid {
            break;
        }
        let Some(child) = map.get_mut(child_key) else {
            continue;
        };
        valid = if child.is_object() || child.is_array() {
            validate_node(child_key, child, child_schema, issues)
        } else {
            report(
                issues,
                ValidationIssue::expected_section(child_key, describe(child)),
            );
            false
        };
    }

    valid
}

fn validate_sequence(
    key: &str,
    items: &mut [Value],
    schema: &SchemaNode,
    issues: &mut Vec<ValidationIssue>,
) -> bool {
    debug!(list = key, len = items.len(), "Validating list");

    if let Some(minimum) = schema.minimum {
        if items.len() < minimum {
            report(
                issues,
                ValidationIssue::below_minimum(key, minimum, items.len()),
            );
            return false;
        }
    }

    items
        .iter_mut()
        .all(|item| validate_node(key, item, schema, issues))
}

fn report(issues: &mut Vec<ValidationIssue>, issue: ValidationIssue) {
    error!(key = %issue.key, kind = ?issue.kind, "Config validation failed: {}", issue.message);
    issues.push(issue);
}
