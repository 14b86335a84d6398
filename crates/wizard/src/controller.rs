//! Step navigation controller.
//!
//! Owns the wizard position for one application and enforces the
//! transition rules: `next` is gated on validation and a confirmed remote
//! save, `previous` never loses the furthest point reached, and `jump_to`
//! refuses to skip ahead of it. Position is persisted through the step
//! store on every successful transition, so a reload restores the user to
//! where they were.

use std::sync::Arc;

use hakemus_core::application::Application;
use hakemus_core::error::CoreError;
use hakemus_core::fields::FieldValue;
use hakemus_core::schema::{FormSchema, MIN_STEP};
use hakemus_core::sync::{RemoteSync, SyncError};
use hakemus_core::types::ApplicationId;
use hakemus_core::validation::StepValidation;
use hakemus_store::{read_position, write_position, StepKind, StepStore};

use crate::form::FormState;

/// Errors surfaced by wizard operations.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    /// A domain-level error from `hakemus_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A remote sync failure; classify for the user-visible disposition.
    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Result of a `next()` attempt.
#[derive(Debug)]
pub enum StepOutcome {
    /// Validation and save succeeded; the wizard is now on `step`.
    Advanced { step: u8 },
    /// The active step's data is invalid; position unchanged, nothing was
    /// persisted and no network request was made.
    Invalid(StepValidation),
}

/// The wizard for one application draft.
pub struct WizardController<S: StepStore> {
    id: ApplicationId,
    application: Application,
    form: FormState,
    store: Arc<S>,
    sync: Arc<dyn RemoteSync>,
    current_step: u8,
    last_visited_step: u8,
}

impl<S: StepStore> std::fmt::Debug for WizardController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardController")
            .field("id", &self.id)
            .field("current_step", &self.current_step)
            .field("last_visited_step", &self.last_visited_step)
            .finish_non_exhaustive()
    }
}

impl<S: StepStore> WizardController<S> {
    /// Mount the wizard: fetch or create the application, seed the form,
    /// and restore the persisted position.
    ///
    /// Persisted positions are read back clamped to `[1, N]`; a corrupt
    /// store restores to step 1 rather than failing the mount.
    pub async fn start(
        schema: Arc<FormSchema>,
        store: Arc<S>,
        sync: Arc<dyn RemoteSync>,
        id: Option<ApplicationId>,
    ) -> Result<Self, WizardError> {
        let application = sync.fetch_or_create(id).await?;
        // fetch_or_create always yields a backend-persisted resource; a
        // missing id here is a backend contract violation.
        let id = application.require_id()?;

        let mut form = FormState::new(schema);
        form.reset(&application.fields);

        let step_count = form.schema().step_count();
        let current = read_position(store.as_ref(), &id, StepKind::Current, step_count);
        let last_visited = read_position(store.as_ref(), &id, StepKind::LastVisited, step_count)
            .max(current);

        tracing::info!(
            application_id = %id,
            status = application.status.as_str(),
            step = current,
            "Wizard mounted"
        );

        Ok(Self {
            id,
            application,
            form,
            store,
            sync,
            current_step: current,
            last_visited_step: last_visited,
        })
    }

    pub fn application_id(&self) -> ApplicationId {
        self.id
    }

    pub fn application(&self) -> &Application {
        &self.application
    }

    pub fn current_step(&self) -> u8 {
        self.current_step
    }

    pub fn last_visited_step(&self) -> u8 {
        self.last_visited_step
    }

    pub fn step_count(&self) -> u8 {
        self.form.schema().step_count()
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Write one field of the draft.
    pub fn set_value(&mut self, path: &str, value: impl Into<FieldValue>) -> Result<(), CoreError> {
        self.form.set_value(path, value)
    }

    /// Inline validation of the active step (touched fields only).
    pub fn validate_current(&self) -> Result<StepValidation, CoreError> {
        self.form.validate_step(self.current_step)
    }

    /// Try to advance one step.
    ///
    /// Order matters: validate first (invalid data never reaches the
    /// network), then save, and only a confirmed save moves and persists
    /// the position. A failed save leaves the wizard exactly where it was,
    /// so client and server position never diverge.
    pub async fn next(&mut self) -> Result<StepOutcome, WizardError> {
        let validation = self.form.validate_step_for_submit(self.current_step)?;
        if !validation.is_valid {
            tracing::debug!(
                application_id = %self.id,
                step = self.current_step,
                errors = validation.errors.len(),
                "Step rejected by validation"
            );
            return Ok(StepOutcome::Invalid(validation));
        }

        self.application.fields = self.form.values().clone();
        let saved = self.sync.save(&self.application).await?;
        self.form.adopt(&saved.fields);
        self.application = saved;

        let from = self.current_step;
        self.current_step = self.current_step.saturating_add(1).min(self.step_count());
        self.last_visited_step = self.last_visited_step.max(self.current_step);
        write_position(
            self.store.as_ref(),
            &self.id,
            StepKind::Current,
            self.current_step,
        );
        write_position(
            self.store.as_ref(),
            &self.id,
            StepKind::LastVisited,
            self.last_visited_step,
        );

        tracing::info!(
            application_id = %self.id,
            from_step = from,
            to_step = self.current_step,
            "Wizard advanced"
        );
        Ok(StepOutcome::Advanced {
            step: self.current_step,
        })
    }

    /// Go back one step, floored at 1.
    ///
    /// Only `current` is persisted — `last_visited_step` never decreases,
    /// so the user can always jump forward again to the furthest point
    /// they reached.
    pub fn previous(&mut self) -> u8 {
        if self.current_step > MIN_STEP {
            self.current_step -= 1;
            write_position(
                self.store.as_ref(),
                &self.id,
                StepKind::Current,
                self.current_step,
            );
        }
        self.current_step
    }

    /// Jump directly to a step already reached.
    ///
    /// Ignored for any target beyond `last_visited_step` (or outside
    /// `[1, N]`): a manipulated URL or stale control must not skip
    /// unvalidated steps. Returns the active step either way.
    pub fn jump_to(&mut self, step: u8) -> u8 {
        if step >= MIN_STEP && step <= self.last_visited_step {
            self.current_step = step;
            write_position(
                self.store.as_ref(),
                &self.id,
                StepKind::Current,
                self.current_step,
            );
        } else {
            tracing::debug!(
                application_id = %self.id,
                requested = step,
                last_visited = self.last_visited_step,
                "Ignoring jump beyond last visited step"
            );
        }
        self.current_step
    }

    /// Re-apply a freshly fetched application (e.g. after a refetch),
    /// merging under the user's in-flight edits.
    pub fn refresh(&mut self, application: Application) -> Result<(), WizardError> {
        let id = application.require_id()?;
        if id != self.id {
            return Err(CoreError::Validation(format!(
                "Refusing to refresh wizard for {} with application {id}",
                self.id
            ))
            .into());
        }
        self.form.reset(&application.fields);
        self.application = application;
        Ok(())
    }
}
