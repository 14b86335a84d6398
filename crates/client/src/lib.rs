//! HTTP client layer for the benefit portal backend.
//!
//! Wraps the backend REST API with [`reqwest`], classifies every failure
//! into exactly one user-visible disposition, implements the
//! [`RemoteSync`](hakemus_core::sync::RemoteSync) seam with per-application
//! save coalescing, and polls the OIDC userinfo endpoint to detect session
//! expiry.

pub mod api;
pub mod config;
pub mod error;
pub mod session;
pub mod sync;

pub use api::{ApiError, PortalApi};
pub use config::ClientConfig;
pub use error::{classify, ErrorDisposition};
pub use session::{SessionMonitor, SessionStatus};
pub use sync::SyncLayer;
