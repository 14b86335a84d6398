//! Typed field tree with dot-addressed paths.
//!
//! Form values are an open, product-specific tree of [`FieldValue`] nodes
//! addressed by dotted locators such as `employments.2.name`. The tree walks
//! are total: reading a path that does not exist yields `None`, and writing
//! auto-vivifies intermediate objects and array slots.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Field values
// ---------------------------------------------------------------------------

/// One node of the form value tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Array(Vec<FieldValue>),
    Object(FieldMap),
}

impl FieldValue {
    /// Whether the value counts as empty for `required` validation.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Array(items) => items.is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Write `value` at the relative path below this node, replacing
    /// whatever is there. Intermediate nodes of the wrong kind are replaced
    /// by a container matching the next segment.
    fn set_at(&mut self, segments: &[PathSegment], value: FieldValue) {
        match segments.split_first() {
            None => *self = value,
            Some((PathSegment::Key(key), rest)) => {
                if !matches!(self, Self::Object(_)) {
                    *self = Self::Object(FieldMap::default());
                }
                if let Self::Object(map) = self {
                    map.0
                        .entry(key.clone())
                        .or_insert(Self::Null)
                        .set_at(rest, value);
                }
            }
            Some((PathSegment::Index(i), rest)) => {
                if !matches!(self, Self::Array(_)) {
                    *self = Self::Array(Vec::new());
                }
                if let Self::Array(items) = self {
                    while items.len() <= *i {
                        items.push(Self::Null);
                    }
                    items[*i].set_at(rest, value);
                }
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(entries) => Self::Object(FieldMap(
                entries.into_iter().map(|(k, v)| (k, Self::from(v))).collect(),
            )),
        }
    }
}

impl From<FieldValue> for serde_json::Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Null => Self::Null,
            FieldValue::Bool(b) => Self::Bool(b),
            FieldValue::Number(n) => serde_json::Number::from_f64(n)
                .map_or(Self::Null, Self::Number),
            FieldValue::Text(s) => Self::String(s),
            FieldValue::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            FieldValue::Object(map) => Self::Object(
                map.0.into_iter().map(|(k, v)| (k, Self::from(v))).collect(),
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Field paths
// ---------------------------------------------------------------------------

/// One segment of a dotted field locator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) => f.write_str(k),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

/// A parsed dot-addressed field locator, e.g. `employments.2.name`.
///
/// All-digit segments address array elements; everything else is an object
/// key. Schema membership is checked separately by
/// [`FormSchema::resolve`](crate::schema::FormSchema::resolve), so a bare
/// `FieldPath` only guarantees syntactic validity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Parse a dotted locator. Empty paths and empty segments are rejected.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        if raw.is_empty() {
            return Err(CoreError::InvalidPath("<empty>".to_string()));
        }
        let mut segments = Vec::new();
        for part in raw.split('.') {
            if part.is_empty() {
                return Err(CoreError::InvalidPath(raw.to_string()));
            }
            if part.chars().all(|c| c.is_ascii_digit()) {
                let index: usize = part
                    .parse()
                    .map_err(|_| CoreError::InvalidPath(raw.to_string()))?;
                segments.push(PathSegment::Index(index));
            } else {
                segments.push(PathSegment::Key(part.to_string()));
            }
        }
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// Build a path from already-validated segments.
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        let raw = segments
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(".");
        Self { raw, segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// ---------------------------------------------------------------------------
// Field map
// ---------------------------------------------------------------------------

/// The root of an application's form values: field name → value tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, FieldValue>);

impl FieldMap {
    /// Read the value at `path`, or `None` when any segment is absent or
    /// addresses a node of the wrong kind.
    pub fn get(&self, path: &FieldPath) -> Option<&FieldValue> {
        let mut segments = path.segments().iter();
        let mut current = match segments.next()? {
            PathSegment::Key(key) => self.0.get(key)?,
            PathSegment::Index(_) => return None,
        };
        for segment in segments {
            current = match (segment, current) {
                (PathSegment::Key(key), FieldValue::Object(map)) => map.0.get(key)?,
                (PathSegment::Index(i), FieldValue::Array(items)) => items.get(*i)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Write `value` at `path`, auto-vivifying intermediate objects and
    /// filling array gaps with `Null`. The first segment must be a key.
    pub fn set(&mut self, path: &FieldPath, value: FieldValue) -> Result<(), CoreError> {
        match path.segments().split_first() {
            Some((PathSegment::Key(key), rest)) => {
                self.0
                    .entry(key.clone())
                    .or_insert(FieldValue::Null)
                    .set_at(rest, value);
                Ok(())
            }
            _ => Err(CoreError::InvalidPath(path.to_string())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge `remote` as the base while keeping this map's values for every
    /// path in `touched`.
    ///
    /// This is the reset policy that stops a slow fetch from clobbering what
    /// the user already typed: untouched fields adopt the remote value,
    /// touched fields keep the in-memory one. A touched path into an array
    /// element is re-vivified even when the remote array is shorter.
    pub fn merge_preserving(&self, remote: &FieldMap, touched: &BTreeSet<FieldPath>) -> FieldMap {
        let mut merged = remote.clone();
        for path in touched {
            if let Some(value) = self.get(path) {
                // Touched paths were schema-checked on write, so set cannot
                // fail here; ignore the impossible error instead of bubbling.
                let _ = merged.set(path, value.clone());
            }
        }
        merged
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn path(raw: &str) -> FieldPath {
        FieldPath::parse(raw).unwrap()
    }

    // -- FieldPath --

    #[test]
    fn parse_simple_key() {
        let p = path("company_name");
        assert_eq!(p.segments(), &[PathSegment::Key("company_name".into())]);
    }

    #[test]
    fn parse_nested_array_path() {
        let p = path("employments.2.name");
        assert_eq!(
            p.segments(),
            &[
                PathSegment::Key("employments".into()),
                PathSegment::Index(2),
                PathSegment::Key("name".into()),
            ]
        );
    }

    #[test]
    fn parse_rejects_empty_segments() {
        assert!(FieldPath::parse("").is_err());
        assert!(FieldPath::parse("a..b").is_err());
        assert!(FieldPath::parse(".a").is_err());
        assert!(FieldPath::parse("a.").is_err());
    }

    #[test]
    fn from_segments_rebuilds_raw() {
        let p = FieldPath::from_segments(vec![
            PathSegment::Key("employments".into()),
            PathSegment::Index(0),
            PathSegment::Key("name".into()),
        ]);
        assert_eq!(p.to_string(), "employments.0.name");
    }

    // -- get / set --

    #[test]
    fn set_then_get_leaf() {
        let mut map = FieldMap::default();
        map.set(&path("company_name"), "Acme Oy".into()).unwrap();
        assert_eq!(
            map.get(&path("company_name")),
            Some(&FieldValue::Text("Acme Oy".into()))
        );
    }

    #[test]
    fn set_vivifies_nested_objects() {
        let mut map = FieldMap::default();
        map.set(&path("contact.email"), "a@b.fi".into()).unwrap();
        assert_eq!(
            map.get(&path("contact.email")),
            Some(&FieldValue::Text("a@b.fi".into()))
        );
    }

    #[test]
    fn set_vivifies_array_slots_with_null() {
        let mut map = FieldMap::default();
        map.set(&path("employments.2.name"), "Cook".into()).unwrap();
        assert_eq!(map.get(&path("employments.0")), Some(&FieldValue::Null));
        assert_eq!(map.get(&path("employments.1")), Some(&FieldValue::Null));
        assert_eq!(
            map.get(&path("employments.2.name")),
            Some(&FieldValue::Text("Cook".into()))
        );
    }

    #[test]
    fn get_missing_path_is_none() {
        let map = FieldMap::default();
        assert_eq!(map.get(&path("nope")), None);
        assert_eq!(map.get(&path("nope.deeper.3")), None);
    }

    #[test]
    fn get_wrong_kind_is_none() {
        let mut map = FieldMap::default();
        map.set(&path("company_name"), "Acme Oy".into()).unwrap();
        assert_eq!(map.get(&path("company_name.0")), None);
        assert_eq!(map.get(&path("company_name.sub")), None);
    }

    #[test]
    fn set_rejects_index_root() {
        let mut map = FieldMap::default();
        assert!(map.set(&path("0.name"), "x".into()).is_err());
    }

    // -- merge_preserving --

    #[test]
    fn merge_keeps_touched_and_adopts_untouched() {
        let mut local = FieldMap::default();
        local.set(&path("company_name"), "Typed Oy".into()).unwrap();
        local.set(&path("iban"), "FI00".into()).unwrap();

        let mut remote = FieldMap::default();
        remote.set(&path("company_name"), "Server Oy".into()).unwrap();
        remote.set(&path("iban"), "FI99".into()).unwrap();
        remote.set(&path("phone"), "0401234567".into()).unwrap();

        let touched = BTreeSet::from([path("company_name")]);
        let merged = local.merge_preserving(&remote, &touched);

        assert_eq!(
            merged.get(&path("company_name")),
            Some(&FieldValue::Text("Typed Oy".into()))
        );
        assert_eq!(merged.get(&path("iban")), Some(&FieldValue::Text("FI99".into())));
        assert_eq!(
            merged.get(&path("phone")),
            Some(&FieldValue::Text("0401234567".into()))
        );
    }

    #[test]
    fn merge_revivifies_touched_array_element_when_remote_shrank() {
        let mut local = FieldMap::default();
        local.set(&path("employments.1.name"), "Cook".into()).unwrap();

        let mut remote = FieldMap::default();
        remote.set(&path("employments.0.name"), "Clerk".into()).unwrap();

        let touched = BTreeSet::from([path("employments.1.name")]);
        let merged = local.merge_preserving(&remote, &touched);

        assert_eq!(
            merged.get(&path("employments.0.name")),
            Some(&FieldValue::Text("Clerk".into()))
        );
        assert_eq!(
            merged.get(&path("employments.1.name")),
            Some(&FieldValue::Text("Cook".into()))
        );
    }

    #[test]
    fn merge_with_no_touched_is_remote() {
        let mut local = FieldMap::default();
        local.set(&path("a"), "local".into()).unwrap();
        let mut remote = FieldMap::default();
        remote.set(&path("a"), "remote".into()).unwrap();

        let merged = local.merge_preserving(&remote, &BTreeSet::new());
        assert_eq!(merged, remote);
    }

    // -- JSON conversion --

    #[test]
    fn json_roundtrip_preserves_structure() {
        let json = serde_json::json!({
            "company_name": "Acme Oy",
            "de_minimis": true,
            "employee_count": 12.0,
            "employments": [{"name": "Cook", "hours": 37.5}],
            "notes": null,
        });
        let fields = FieldValue::from(json.clone());
        assert_eq!(serde_json::Value::from(fields), json);
    }

    #[test]
    fn field_map_serde_is_transparent() {
        let mut map = FieldMap::default();
        map.set(&FieldPath::parse("a").unwrap(), FieldValue::Bool(true)).unwrap();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"a":true}"#);
        let back: FieldMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
