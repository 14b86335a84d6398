//! Handler-side review tracker.
//!
//! A reviewer works through an application section by section. The server
//! is the source of truth: the state is fetched once per application id
//! and cached for the tracker's lifetime, and a confirmation is only shown
//! after the backend acknowledged it — no optimistic update, so a reviewer
//! never sees a checkmark that did not actually persist.

use std::sync::Arc;

use hakemus_core::error::CoreError;
use hakemus_core::review::{ReviewPatch, ReviewState};
use hakemus_core::sync::ReviewSync;
use hakemus_core::types::ApplicationId;

use crate::controller::WizardError;

/// Review confirmations for one application, tied to a view session.
pub struct ReviewTracker {
    remote: Arc<dyn ReviewSync>,
    state: Option<ReviewState>,
}

impl ReviewTracker {
    pub fn new(remote: Arc<dyn ReviewSync>) -> Self {
        Self {
            remote,
            state: None,
        }
    }

    /// Fetch the review state, once.
    ///
    /// A repeated `load` for the same application returns the cached copy;
    /// a different application id refetches.
    pub async fn load(&mut self, id: ApplicationId) -> Result<&ReviewState, WizardError> {
        let cached_matches = self
            .state
            .as_ref()
            .is_some_and(|s| s.application_id == id);
        if !cached_matches {
            let fetched = self.remote.fetch_review(id).await?;
            tracing::info!(application_id = %id, "Review state loaded");
            self.state = Some(fetched);
        }
        // The branch above guarantees the cache is filled.
        self.state
            .as_ref()
            .ok_or_else(|| CoreError::Internal("Review cache empty after load".to_string()).into())
    }

    /// The cached state, if loaded.
    pub fn state(&self) -> Option<&ReviewState> {
        self.state.as_ref()
    }

    /// Confirm or unconfirm sections.
    ///
    /// Sends the full flag set with the patch applied; the cache is
    /// replaced only by the server's confirmed response. On failure the
    /// cached state is untouched and the UI keeps showing the old flags.
    pub async fn confirm(&mut self, patch: &ReviewPatch) -> Result<&ReviewState, WizardError> {
        let current = self
            .state
            .as_ref()
            .ok_or(CoreError::MissingId("ReviewState not loaded"))?;

        let mut requested = current.clone();
        requested.apply(patch);

        let confirmed = self.remote.save_review(&requested).await?;
        tracing::info!(application_id = %confirmed.application_id, "Review state updated");
        self.state = Some(confirmed);

        self.state
            .as_ref()
            .ok_or_else(|| CoreError::Internal("Review cache empty after update".to_string()).into())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
