//! Per-product form schema: fixed step count and step-scoped field rules.
//!
//! A schema is built once per product flow (six steps for the applicant
//! form, three for the employer form) and then used for two things: gating
//! which dotted paths a form may write at all, and selecting which rules
//! [`validate_step`](crate::validation::validate_step) runs for one step.
//! Out-of-schema paths fail at [`FormSchema::resolve`] time, not at access
//! time.

use std::fmt;

use crate::error::CoreError;
use crate::fields::{FieldMap, FieldPath, FieldValue, PathSegment};
use crate::validation::Rule;

/// Minimum step number (1-based).
pub const MIN_STEP: u8 = 1;

/// Default step used when a persisted position is absent or corrupt.
pub const DEFAULT_STEP: u8 = 1;

// ---------------------------------------------------------------------------
// Path patterns
// ---------------------------------------------------------------------------

/// One segment of a schema path pattern. `*` matches any array index.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternSegment {
    Key(String),
    Index(usize),
    AnyIndex,
}

/// A schema-side path pattern, e.g. `employments.*.name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<PatternSegment>,
}

impl PathPattern {
    /// Parse a pattern. Same syntax as [`FieldPath`] plus `*` wildcards for
    /// array indices. The first segment must be a key.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        if raw.is_empty() {
            return Err(CoreError::InvalidPath("<empty>".to_string()));
        }
        let mut segments = Vec::new();
        for part in raw.split('.') {
            if part.is_empty() {
                return Err(CoreError::InvalidPath(raw.to_string()));
            }
            if part == "*" {
                segments.push(PatternSegment::AnyIndex);
            } else if part.chars().all(|c| c.is_ascii_digit()) {
                let index: usize = part
                    .parse()
                    .map_err(|_| CoreError::InvalidPath(raw.to_string()))?;
                segments.push(PatternSegment::Index(index));
            } else {
                segments.push(PatternSegment::Key(part.to_string()));
            }
        }
        if !matches!(segments.first(), Some(PatternSegment::Key(_))) {
            return Err(CoreError::InvalidPath(raw.to_string()));
        }
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Whether a concrete path is addressed by this pattern.
    pub fn matches(&self, path: &FieldPath) -> bool {
        let segments = path.segments();
        if segments.len() != self.segments.len() {
            return false;
        }
        self.segments.iter().zip(segments).all(|(pattern, concrete)| {
            match (pattern, concrete) {
                (PatternSegment::Key(a), PathSegment::Key(b)) => a == b,
                (PatternSegment::Index(a), PathSegment::Index(b)) => a == b,
                (PatternSegment::AnyIndex, PathSegment::Index(_)) => true,
                _ => false,
            }
        })
    }

    /// Expand the pattern into the concrete paths present in `values`.
    ///
    /// Wildcard segments fan out over the length of the array actually
    /// stored at that point; a missing or non-array node yields nothing.
    pub fn expand(&self, values: &FieldMap) -> Vec<FieldPath> {
        let mut out = Vec::new();
        let mut prefix = Vec::new();
        Self::expand_inner(&self.segments, &mut prefix, values, &mut out);
        out
    }

    fn expand_inner(
        pattern: &[PatternSegment],
        prefix: &mut Vec<PathSegment>,
        values: &FieldMap,
        out: &mut Vec<FieldPath>,
    ) {
        match pattern.split_first() {
            None => out.push(FieldPath::from_segments(prefix.clone())),
            Some((PatternSegment::Key(key), rest)) => {
                prefix.push(PathSegment::Key(key.clone()));
                Self::expand_inner(rest, prefix, values, out);
                prefix.pop();
            }
            Some((PatternSegment::Index(i), rest)) => {
                prefix.push(PathSegment::Index(*i));
                Self::expand_inner(rest, prefix, values, out);
                prefix.pop();
            }
            Some((PatternSegment::AnyIndex, rest)) => {
                let here = FieldPath::from_segments(prefix.clone());
                let len = match values.get(&here) {
                    Some(FieldValue::Array(items)) => items.len(),
                    _ => 0,
                };
                for i in 0..len {
                    prefix.push(PathSegment::Index(i));
                    Self::expand_inner(rest, prefix, values, out);
                    prefix.pop();
                }
            }
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// ---------------------------------------------------------------------------
// Form schema
// ---------------------------------------------------------------------------

/// Validation rules attached to one schema path pattern.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub path: PathPattern,
    pub rules: Vec<Rule>,
}

impl FieldRule {
    pub fn new(path: &str, rules: Vec<Rule>) -> Result<Self, CoreError> {
        Ok(Self {
            path: PathPattern::parse(path)?,
            rules,
        })
    }
}

/// A product's wizard form: a fixed number of steps, each with its rules.
#[derive(Debug, Clone)]
pub struct FormSchema {
    steps: Vec<Vec<FieldRule>>,
}

impl FormSchema {
    /// Build a schema from per-step rule lists. At least one step is
    /// required and the step count must fit the 1-based `u8` step domain.
    pub fn new(steps: Vec<Vec<FieldRule>>) -> Result<Self, CoreError> {
        if steps.is_empty() {
            return Err(CoreError::Validation(
                "A form schema requires at least one step".to_string(),
            ));
        }
        if steps.len() > u8::MAX as usize {
            return Err(CoreError::Validation(format!(
                "Step count {} exceeds the supported maximum",
                steps.len()
            )));
        }
        Ok(Self { steps })
    }

    /// Number of steps, `N` in the 1-based step domain `[1, N]`.
    pub fn step_count(&self) -> u8 {
        self.steps.len() as u8
    }

    /// Rules registered for a 1-based step.
    pub fn rules_for_step(&self, step: u8) -> Result<&[FieldRule], CoreError> {
        if step < MIN_STEP || step > self.step_count() {
            return Err(CoreError::Validation(format!(
                "Step {step} is out of range ({MIN_STEP}..{})",
                self.step_count()
            )));
        }
        Ok(&self.steps[(step - 1) as usize])
    }

    /// Parse a dotted locator and check it against the schema.
    ///
    /// This is the construction-time gate for field access: a path no step
    /// declares is an [`CoreError::InvalidPath`], so typos and stale field
    /// names fail before any value is read or written.
    pub fn resolve(&self, raw: &str) -> Result<FieldPath, CoreError> {
        let path = FieldPath::parse(raw)?;
        let known = self
            .steps
            .iter()
            .flatten()
            .any(|rule| rule.path.matches(&path));
        if !known {
            return Err(CoreError::InvalidPath(format!(
                "Path '{raw}' is not declared by the form schema"
            )));
        }
        Ok(path)
    }
}

/// Coerce a persisted step value into the valid domain `[1, N]`.
///
/// Anything absent, unparseable, or out of range reads back as the default
/// step rather than an error; the store is untrusted.
pub fn clamp_step(raw: Option<i64>, step_count: u8) -> u8 {
    match raw {
        Some(v) if v >= MIN_STEP as i64 && v <= step_count as i64 => v as u8,
        _ => DEFAULT_STEP,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldPath;

    fn schema() -> FormSchema {
        FormSchema::new(vec![
            vec![
                FieldRule::new("company_name", vec![Rule::Required]).unwrap(),
                FieldRule::new("employments.*.name", vec![Rule::Required]).unwrap(),
            ],
            vec![FieldRule::new("iban", vec![]).unwrap()],
        ])
        .unwrap()
    }

    // -- PathPattern --

    #[test]
    fn pattern_matches_wildcard_index() {
        let pattern = PathPattern::parse("employments.*.name").unwrap();
        assert!(pattern.matches(&FieldPath::parse("employments.0.name").unwrap()));
        assert!(pattern.matches(&FieldPath::parse("employments.7.name").unwrap()));
        assert!(!pattern.matches(&FieldPath::parse("employments.x.name").unwrap()));
        assert!(!pattern.matches(&FieldPath::parse("employments.0").unwrap()));
        assert!(!pattern.matches(&FieldPath::parse("employments.0.name.extra").unwrap()));
    }

    #[test]
    fn pattern_rejects_leading_wildcard_or_index() {
        assert!(PathPattern::parse("*.name").is_err());
        assert!(PathPattern::parse("0.name").is_err());
        assert!(PathPattern::parse("").is_err());
    }

    #[test]
    fn pattern_expand_fans_out_over_array_length() {
        let mut values = FieldMap::default();
        values
            .set(&FieldPath::parse("employments.0.name").unwrap(), "a".into())
            .unwrap();
        values
            .set(&FieldPath::parse("employments.1.name").unwrap(), "b".into())
            .unwrap();

        let pattern = PathPattern::parse("employments.*.name").unwrap();
        let expanded = pattern.expand(&values);
        assert_eq!(
            expanded,
            vec![
                FieldPath::parse("employments.0.name").unwrap(),
                FieldPath::parse("employments.1.name").unwrap(),
            ]
        );
    }

    #[test]
    fn pattern_expand_missing_array_is_empty() {
        let pattern = PathPattern::parse("employments.*.name").unwrap();
        assert!(pattern.expand(&FieldMap::default()).is_empty());
    }

    // -- FormSchema --

    #[test]
    fn schema_requires_steps() {
        assert!(FormSchema::new(vec![]).is_err());
    }

    #[test]
    fn schema_resolves_declared_paths() {
        let s = schema();
        assert!(s.resolve("company_name").is_ok());
        assert!(s.resolve("employments.3.name").is_ok());
        assert!(s.resolve("iban").is_ok());
    }

    #[test]
    fn schema_rejects_undeclared_paths() {
        let s = schema();
        assert!(s.resolve("companyname").is_err());
        assert!(s.resolve("employments.0.salary").is_err());
        assert!(s.resolve("").is_err());
    }

    #[test]
    fn rules_for_step_bounds() {
        let s = schema();
        assert_eq!(s.step_count(), 2);
        assert!(s.rules_for_step(0).is_err());
        assert!(s.rules_for_step(1).is_ok());
        assert!(s.rules_for_step(2).is_ok());
        assert!(s.rules_for_step(3).is_err());
    }

    // -- clamp_step --

    #[test]
    fn clamp_accepts_in_range() {
        for step in 1..=6 {
            assert_eq!(clamp_step(Some(step as i64), 6), step);
        }
    }

    #[test]
    fn clamp_coerces_garbage_to_default() {
        assert_eq!(clamp_step(None, 6), DEFAULT_STEP);
        assert_eq!(clamp_step(Some(0), 6), DEFAULT_STEP);
        assert_eq!(clamp_step(Some(99), 6), DEFAULT_STEP);
        assert_eq!(clamp_step(Some(-3), 6), DEFAULT_STEP);
        assert_eq!(clamp_step(Some(7), 6), DEFAULT_STEP);
    }
}
