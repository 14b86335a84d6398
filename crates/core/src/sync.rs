//! The remote sync seams between the wizard and the backend client.
//!
//! The wizard crate never talks HTTP directly; the controller holds a
//! [`RemoteSync`], the review tracker a [`ReviewSync`], and both branch on
//! [`SyncError`]. The client crate provides the production implementations,
//! tests script fakes.

use async_trait::async_trait;

use crate::application::Application;
use crate::review::ReviewState;
use crate::types::ApplicationId;

/// Failure taxonomy for remote application operations.
///
/// Each variant maps to exactly one user-visible disposition: login
/// redirect, error-page redirect, or a dismissible notification with a
/// manual retry. `MissingId` is the programming-error class and is raised
/// before any network call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SyncError {
    #[error("Not authenticated")]
    Unauthorized,

    #[error("Server error ({status})")]
    Server { status: u16 },

    #[error("Application {id} not found")]
    NotFound { id: ApplicationId },

    #[error("Cannot save an application without an id")]
    MissingId,

    #[error("Request failed: {0}")]
    Transient(String),
}

/// Fetches, creates, and saves the application resource.
#[async_trait]
pub trait RemoteSync: Send + Sync {
    /// Load the application by id, or find/create an editable draft for the
    /// current user when no id is given.
    ///
    /// An explicit id that the backend does not know yields
    /// [`SyncError::NotFound`]; it is never silently replaced by a new
    /// draft, to avoid accidental duplicates.
    async fn fetch_or_create(
        &self,
        id: Option<ApplicationId>,
    ) -> Result<Application, SyncError>;

    /// Persist the current snapshot via full replacement.
    ///
    /// Rejects with [`SyncError::MissingId`] before touching the network
    /// when the application has no id. On success the returned application
    /// is the server's echoed state and is authoritative.
    async fn save(&self, application: &Application) -> Result<Application, SyncError>;
}

/// Fetches and updates the handler-side review state.
#[async_trait]
pub trait ReviewSync: Send + Sync {
    /// Load the review flags for an application.
    async fn fetch_review(&self, id: ApplicationId) -> Result<ReviewState, SyncError>;

    /// Replace the full flag set. The echoed state is authoritative.
    async fn save_review(&self, review: &ReviewState) -> Result<ReviewState, SyncError>;
}
