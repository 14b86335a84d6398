//! Session expiry detection.
//!
//! The backend's `GET /oidc/userinfo/` is the sole authentication signal:
//! a 2xx means the session is alive, a 401/403 means it expired. The
//! monitor polls on an interval (five minutes in production) and publishes
//! the result on a watch channel; the page shell redirects to login when
//! the value flips to [`SessionStatus::Expired`].

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::api::PortalApi;
use crate::error::{classify, ErrorDisposition};

/// Last observed authentication state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Authenticated,
    Expired,
}

/// Background poller for session expiry.
///
/// The poll task is aborted on drop; a userinfo response that arrives
/// after the monitor is gone is simply discarded.
pub struct SessionMonitor {
    rx: watch::Receiver<SessionStatus>,
    handle: tokio::task::JoinHandle<()>,
}

impl SessionMonitor {
    /// Spawn the poll loop. The first check fires immediately, then once
    /// per `interval`.
    ///
    /// Only an explicit authentication failure flips the status to
    /// `Expired` (and ends the loop); transient poll failures keep the
    /// last known status rather than logging the user out spuriously.
    pub fn spawn(api: PortalApi, interval: Duration) -> Self {
        let (tx, rx) = watch::channel(SessionStatus::Authenticated);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                match api.userinfo().await {
                    Ok(_) => {
                        let _ = tx.send(SessionStatus::Authenticated);
                    }
                    Err(e) => match classify(&e) {
                        ErrorDisposition::RedirectToLogin => {
                            tracing::info!("Session expired, stopping poll");
                            let _ = tx.send(SessionStatus::Expired);
                            break;
                        }
                        _ => {
                            tracing::warn!(error = %e, "Session poll failed, keeping last status");
                        }
                    },
                }
            }
        });

        Self { rx, handle }
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.rx.clone()
    }

    /// Latest observed status.
    pub fn status(&self) -> SessionStatus {
        *self.rx.borrow()
    }
}

impl Drop for SessionMonitor {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
