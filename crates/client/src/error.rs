//! Central classification of backend failures.
//!
//! Every remote-call error funnels through [`classify`], so the mapping
//! from HTTP outcome to user-visible behavior lives in exactly one place:
//! authentication failures redirect to login, server failures redirect to
//! the generic error page, and everything else becomes a dismissible
//! notification with a manual retry.

use crate::api::ApiError;

/// What the UI shell should do with a failed remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDisposition {
    /// Session is presumed expired (401/403); navigate to the login entry
    /// point, no retry.
    RedirectToLogin,
    /// Backend fault (5xx); navigate to the generic error page offering
    /// retry and logout.
    RedirectToErrorPage,
    /// Transient failure (network, decode, timeout, 4xx other than auth);
    /// show a dismissible toast and leave navigation alone.
    Notify(String),
}

/// Classify an API failure into its disposition.
pub fn classify(error: &ApiError) -> ErrorDisposition {
    match error.status() {
        Some(401 | 403) => ErrorDisposition::RedirectToLogin,
        Some(status) if status >= 500 => {
            tracing::error!(status, "Backend failure");
            ErrorDisposition::RedirectToErrorPage
        }
        _ => ErrorDisposition::Notify(error.to_string()),
    }
}
