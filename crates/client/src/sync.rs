//! Production implementation of the remote sync seam.
//!
//! [`SyncLayer`] owns the per-application bookkeeping around
//! [`PortalApi`]: fetch-or-create with a single-create guarantee, save
//! coalescing so at most one update per application id is in flight, and a
//! cache of the last server-confirmed copy (the echoed state after a write
//! is authoritative and replaces the cache wholesale, no merge). The review
//! seam needs no extra bookkeeping and is implemented on [`PortalApi`]
//! directly.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use hakemus_core::application::Application;
use hakemus_core::review::ReviewState;
use hakemus_core::sync::{RemoteSync, ReviewSync, SyncError};
use hakemus_core::types::ApplicationId;

use crate::api::{ApiError, PortalApi};

/// Remote sync layer over the portal REST API.
pub struct SyncLayer {
    api: PortalApi,
    // One async mutex per application id; saves for the same id serialize,
    // different ids proceed concurrently.
    save_locks: Mutex<HashMap<ApplicationId, Arc<Mutex<()>>>>,
    cache: Mutex<HashMap<ApplicationId, Application>>,
}

impl SyncLayer {
    pub fn new(api: PortalApi) -> Self {
        Self {
            api,
            save_locks: Mutex::new(HashMap::new()),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The last server-confirmed copy for an application, if any.
    pub async fn cached(&self, id: ApplicationId) -> Option<Application> {
        self.cache.lock().await.get(&id).cloned()
    }

    async fn remember(&self, application: &Application) {
        if let Some(id) = application.id {
            self.cache.lock().await.insert(id, application.clone());
        }
    }

    async fn save_lock(&self, id: ApplicationId) -> Arc<Mutex<()>> {
        self.save_locks
            .lock()
            .await
            .entry(id)
            .or_default()
            .clone()
    }
}

/// Map an HTTP-layer failure onto the sync error taxonomy.
fn to_sync_error(error: ApiError, id: Option<ApplicationId>) -> SyncError {
    match (error.status(), id) {
        (Some(401 | 403), _) => SyncError::Unauthorized,
        (Some(404), Some(id)) => SyncError::NotFound { id },
        (Some(status), _) if status >= 500 => SyncError::Server { status },
        _ => SyncError::Transient(error.to_string()),
    }
}

#[async_trait]
impl RemoteSync for SyncLayer {
    async fn fetch_or_create(
        &self,
        id: Option<ApplicationId>,
    ) -> Result<Application, SyncError> {
        if let Some(id) = id {
            // Explicit id: a 404 is surfaced, never papered over with a new
            // draft (that is how duplicate applications happen).
            let application = self
                .api
                .get_application(id)
                .await
                .map_err(|e| to_sync_error(e, Some(id)))?;
            self.remember(&application).await;
            return Ok(application);
        }

        let editable = self
            .api
            .list_editable_applications()
            .await
            .map_err(|e| to_sync_error(e, None))?;

        if let Some(existing) = editable.into_iter().find(Application::is_editable) {
            tracing::info!(application_id = ?existing.id, "Resuming existing draft");
            self.remember(&existing).await;
            return Ok(existing);
        }

        let created = self
            .api
            .create_application()
            .await
            .map_err(|e| to_sync_error(e, None))?;
        tracing::info!(application_id = ?created.id, "Draft application created");
        self.remember(&created).await;
        Ok(created)
    }

    async fn save(&self, application: &Application) -> Result<Application, SyncError> {
        // Programming-error class: reject before any network traffic.
        let id = application.id.ok_or(SyncError::MissingId)?;

        let lock = self.save_lock(id).await;
        let _in_flight = lock.lock().await;

        match self.api.update_application(id, application).await {
            Ok(saved) => {
                tracing::info!(application_id = %id, status = saved.status.as_str(), "Application saved");
                self.remember(&saved).await;
                Ok(saved)
            }
            Err(e) => {
                tracing::error!(application_id = %id, error = %e, "Application save failed");
                Err(to_sync_error(e, Some(id)))
            }
        }
    }
}

#[async_trait]
impl ReviewSync for PortalApi {
    async fn fetch_review(&self, id: ApplicationId) -> Result<ReviewState, SyncError> {
        self.get_review(id)
            .await
            .map_err(|e| to_sync_error(e, Some(id)))
    }

    async fn save_review(&self, review: &ReviewState) -> Result<ReviewState, SyncError> {
        let id = review.application_id;
        PortalApi::update_review(self, id, review)
            .await
            .map_err(|e| to_sync_error(e, Some(id)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use assert_matches::assert_matches;

    fn layer() -> SyncLayer {
        // Points at a closed port; any request that does go out fails fast
        // with a connection error, no live backend needed.
        let api = PortalApi::with_client(reqwest::Client::new(), "http://127.0.0.1:1".into());
        SyncLayer::new(api)
    }

    fn status_error(status: u16) -> ApiError {
        ApiError::Status {
            status,
            body: String::new(),
        }
    }

    #[tokio::test]
    async fn save_without_id_rejects_before_any_network_call() {
        let layer = layer();
        let draft = Application::new_draft();
        let result = layer.save(&draft).await;
        assert_matches!(result, Err(SyncError::MissingId));
    }

    #[tokio::test]
    async fn cache_starts_empty() {
        let layer = layer();
        assert!(layer.cached(ApplicationId::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn saves_for_the_same_id_wait_for_the_in_flight_one() {
        let layer = Arc::new(layer());
        let id = ApplicationId::new_v4();
        let mut application = Application::new_draft();
        application.id = Some(id);

        // Simulate an in-flight save by holding the per-id lock.
        let lock = layer.save_lock(id).await;
        let in_flight = lock.lock().await;

        let queued = tokio::spawn({
            let layer = layer.clone();
            let application = application.clone();
            async move { layer.save(&application).await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!queued.is_finished());

        // Releasing the lock lets the queued save proceed to the network
        // (where the closed port rejects it).
        drop(in_flight);
        let result = queued.await.unwrap();
        assert_matches!(result, Err(SyncError::Transient(_)));
    }

    #[tokio::test]
    async fn saves_for_different_ids_do_not_share_a_lock() {
        let layer = layer();

        let blocked_id = ApplicationId::new_v4();
        let lock = layer.save_lock(blocked_id).await;
        let _in_flight = lock.lock().await;

        let mut other = Application::new_draft();
        other.id = Some(ApplicationId::new_v4());

        // Completes (with the closed-port failure) despite the held lock.
        let result = layer.save(&other).await;
        assert_matches!(result, Err(SyncError::Transient(_)));
    }

    #[test]
    fn error_mapping_follows_the_taxonomy() {
        let id = ApplicationId::new_v4();
        assert_matches!(
            to_sync_error(status_error(401), None),
            SyncError::Unauthorized
        );
        assert_matches!(
            to_sync_error(status_error(403), Some(id)),
            SyncError::Unauthorized
        );
        assert_matches!(
            to_sync_error(status_error(404), Some(id)),
            SyncError::NotFound { .. }
        );
        assert_matches!(
            to_sync_error(status_error(503), Some(id)),
            SyncError::Server { status: 503 }
        );
        assert_matches!(
            to_sync_error(status_error(400), None),
            SyncError::Transient(_)
        );
        // A 404 with no id context is not "application not found".
        assert_matches!(
            to_sync_error(status_error(404), None),
            SyncError::Transient(_)
        );
    }
}
