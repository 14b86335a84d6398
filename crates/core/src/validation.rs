//! Step validation rules and results.
//!
//! Each schema path carries a list of [`Rule`]s. Validation runs the rules
//! registered for one step against the current field tree and reports
//! machine-readable [`FieldError`]s: the failed rule kind resolves a
//! localized message on the UI side, and numeric bounds travel along as
//! `min`/`max` params. Inline errors are only reported for fields the user
//! has touched, unless the step is being submitted.

use std::collections::BTreeSet;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::error::CoreError;
use crate::fields::{FieldMap, FieldPath, FieldValue};
use crate::schema::FormSchema;

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// A declared validation rule for one schema path.
#[derive(Debug, Clone)]
pub enum Rule {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Pattern(Regex),
    Min(f64),
    Max(f64),
    Email,
}

/// Identifies which rule failed; used to resolve the localized message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Required,
    MinLength,
    MaxLength,
    Pattern,
    Min,
    Max,
    Email,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::MinLength => "min_length",
            Self::MaxLength => "max_length",
            Self::Pattern => "pattern",
            Self::Min => "min",
            Self::Max => "max",
            Self::Email => "email",
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// A single field-level rule violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub path: String,
    pub kind: RuleKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

/// Aggregated result of validating one step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepValidation {
    pub is_valid: bool,
    pub errors: Vec<FieldError>,
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Run the rules registered for `step` against `values`.
///
/// Errors are reported for a path only if it appears in `touched` or
/// `submitted` is set (a submit attempt surfaces everything). Wildcard
/// schema paths fan out over the arrays actually present, so `required` on
/// `employments.*.name` holds for every existing entry but demands none.
pub fn validate_step(
    schema: &FormSchema,
    step: u8,
    values: &FieldMap,
    touched: &BTreeSet<FieldPath>,
    submitted: bool,
) -> Result<StepValidation, CoreError> {
    let mut errors = Vec::new();

    for field_rule in schema.rules_for_step(step)? {
        for path in field_rule.path.expand(values) {
            if !submitted && !touched.contains(&path) {
                continue;
            }
            let value = values.get(&path);
            for rule in &field_rule.rules {
                if let Some(error) = check_rule(rule, &path, value) {
                    errors.push(error);
                }
            }
        }
    }

    Ok(StepValidation {
        is_valid: errors.is_empty(),
        errors,
    })
}

/// Evaluate one rule at one concrete path.
///
/// Absent and empty values only ever violate `Required`; the other rules
/// constrain a value the user actually supplied.
fn check_rule(rule: &Rule, path: &FieldPath, value: Option<&FieldValue>) -> Option<FieldError> {
    let present = value.filter(|v| !v.is_empty());

    match rule {
        Rule::Required => {
            if present.is_none() {
                return Some(error(path, RuleKind::Required, None));
            }
        }
        Rule::MinLength(min) => {
            if let Some(text) = present.and_then(FieldValue::as_text) {
                if text.chars().count() < *min {
                    return Some(error(
                        path,
                        RuleKind::MinLength,
                        Some(serde_json::json!({ "min": min })),
                    ));
                }
            }
        }
        Rule::MaxLength(max) => {
            if let Some(text) = present.and_then(FieldValue::as_text) {
                if text.chars().count() > *max {
                    return Some(error(
                        path,
                        RuleKind::MaxLength,
                        Some(serde_json::json!({ "max": max })),
                    ));
                }
            }
        }
        Rule::Pattern(regex) => {
            if let Some(text) = present.and_then(FieldValue::as_text) {
                if !regex.is_match(text) {
                    return Some(error(
                        path,
                        RuleKind::Pattern,
                        Some(serde_json::json!({ "pattern": regex.as_str() })),
                    ));
                }
            }
        }
        Rule::Min(min) => {
            if let Some(n) = present.and_then(FieldValue::as_number) {
                if n < *min {
                    return Some(error(
                        path,
                        RuleKind::Min,
                        Some(serde_json::json!({ "min": min })),
                    ));
                }
            }
        }
        Rule::Max(max) => {
            if let Some(n) = present.and_then(FieldValue::as_number) {
                if n > *max {
                    return Some(error(
                        path,
                        RuleKind::Max,
                        Some(serde_json::json!({ "max": max })),
                    ));
                }
            }
        }
        Rule::Email => {
            if let Some(text) = present.and_then(FieldValue::as_text) {
                if !text.validate_email() {
                    return Some(error(path, RuleKind::Email, None));
                }
            }
        }
    }

    None
}

fn error(path: &FieldPath, kind: RuleKind, params: Option<serde_json::Value>) -> FieldError {
    FieldError {
        path: path.to_string(),
        kind,
        params,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
