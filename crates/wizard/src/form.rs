//! In-progress form state.
//!
//! Holds the draft's field tree, the set of paths the user has touched,
//! and the product's schema. Two distinct "replace everything" operations
//! exist on purpose: [`FormState::reset`] merges a fetched snapshot under
//! the user's in-flight edits, while [`FormState::adopt`] takes a server
//! echo verbatim after a confirmed save.

use std::collections::BTreeSet;
use std::sync::Arc;

use hakemus_core::error::CoreError;
use hakemus_core::fields::{FieldMap, FieldPath, FieldValue};
use hakemus_core::schema::FormSchema;
use hakemus_core::validation::{validate_step, StepValidation};

/// The in-memory form of one application draft.
#[derive(Debug, Clone)]
pub struct FormState {
    schema: Arc<FormSchema>,
    values: FieldMap,
    touched: BTreeSet<FieldPath>,
}

impl FormState {
    pub fn new(schema: Arc<FormSchema>) -> Self {
        Self {
            schema,
            values: FieldMap::default(),
            touched: BTreeSet::new(),
        }
    }

    /// The current snapshot. Never triggers a fetch.
    pub fn values(&self) -> &FieldMap {
        &self.values
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    /// Paths the user has edited this session.
    pub fn touched(&self) -> &BTreeSet<FieldPath> {
        &self.touched
    }

    /// Write one field and mark it touched.
    ///
    /// The path must be declared by the schema; out-of-schema paths fail
    /// here, before anything is stored. Dependent fields are not
    /// recomputed — callers update related fields explicitly.
    pub fn set_value(&mut self, path: &str, value: impl Into<FieldValue>) -> Result<(), CoreError> {
        let path = self.schema.resolve(path)?;
        self.values.set(&path, value.into())?;
        self.touched.insert(path);
        Ok(())
    }

    /// Read one field.
    pub fn get_value(&self, path: &str) -> Result<Option<&FieldValue>, CoreError> {
        let path = self.schema.resolve(path)?;
        Ok(self.values.get(&path))
    }

    /// Replace the snapshot with fetched data, keeping the user's edits.
    ///
    /// Remote data is the base; every touched path retains its in-memory
    /// value. This is what stops a slow fetch from clobbering fields the
    /// user already filled in while the request was in flight.
    pub fn reset(&mut self, remote: &FieldMap) {
        self.values = self.values.merge_preserving(remote, &self.touched);
    }

    /// Replace the snapshot with a server echo after a confirmed write.
    ///
    /// The echoed state is authoritative: values are taken verbatim and
    /// the touched set is cleared.
    pub fn adopt(&mut self, confirmed: &FieldMap) {
        self.values = confirmed.clone();
        self.touched.clear();
    }

    /// Validate one step with inline-display semantics: only touched
    /// fields report errors.
    pub fn validate_step(&self, step: u8) -> Result<StepValidation, CoreError> {
        validate_step(&self.schema, step, &self.values, &self.touched, false)
    }

    /// Validate one step with submit semantics: untouched fields report
    /// errors too.
    pub fn validate_step_for_submit(&self, step: u8) -> Result<StepValidation, CoreError> {
        validate_step(&self.schema, step, &self.values, &self.touched, true)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use hakemus_core::schema::FieldRule;
    use hakemus_core::validation::{Rule, RuleKind};

    fn schema() -> Arc<FormSchema> {
        Arc::new(
            FormSchema::new(vec![
                vec![
                    FieldRule::new("company_name", vec![Rule::Required]).unwrap(),
                    FieldRule::new("iban", vec![]).unwrap(),
                ],
                vec![FieldRule::new("employments.*.name", vec![Rule::Required]).unwrap()],
            ])
            .unwrap(),
        )
    }

    #[test]
    fn set_value_marks_touched() {
        let mut form = FormState::new(schema());
        form.set_value("company_name", "Acme Oy").unwrap();
        assert_eq!(form.touched().len(), 1);
        assert_eq!(
            form.get_value("company_name").unwrap(),
            Some(&FieldValue::Text("Acme Oy".into()))
        );
    }

    #[test]
    fn set_value_rejects_out_of_schema_path() {
        let mut form = FormState::new(schema());
        assert!(form.set_value("company_nmae", "typo").is_err());
        assert!(form.touched().is_empty());
    }

    #[test]
    fn reset_keeps_touched_edits_over_remote() {
        let mut form = FormState::new(schema());
        form.set_value("company_name", "Typed Oy").unwrap();

        let mut remote = FieldMap::default();
        remote
            .set(&FieldPath::parse("company_name").unwrap(), "Server Oy".into())
            .unwrap();
        remote
            .set(&FieldPath::parse("iban").unwrap(), "FI991234".into())
            .unwrap();
        form.reset(&remote);

        assert_eq!(
            form.get_value("company_name").unwrap(),
            Some(&FieldValue::Text("Typed Oy".into()))
        );
        assert_eq!(
            form.get_value("iban").unwrap(),
            Some(&FieldValue::Text("FI991234".into()))
        );
    }

    #[test]
    fn adopt_takes_echo_verbatim_and_clears_touched() {
        let mut form = FormState::new(schema());
        form.set_value("company_name", "Typed Oy").unwrap();

        let mut echo = FieldMap::default();
        echo.set(&FieldPath::parse("company_name").unwrap(), "Normalized Oy".into())
            .unwrap();
        form.adopt(&echo);

        assert!(form.touched().is_empty());
        assert_eq!(
            form.get_value("company_name").unwrap(),
            Some(&FieldValue::Text("Normalized Oy".into()))
        );
    }

    #[test]
    fn inline_validation_hides_untouched_errors() {
        let form = FormState::new(schema());
        assert!(form.validate_step(1).unwrap().is_valid);

        let submit = form.validate_step_for_submit(1).unwrap();
        assert!(!submit.is_valid);
        assert_eq!(submit.errors[0].kind, RuleKind::Required);
    }

    #[test]
    fn validation_rejects_out_of_range_step() {
        let form = FormState::new(schema());
        assert!(form.validate_step(0).is_err());
        assert!(form.validate_step(3).is_err());
    }
}
