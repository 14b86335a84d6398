//! Domain model for the benefit application wizard.
//!
//! This crate holds everything the portal front-ends share that does not
//! touch the network or the local step store: the application resource and
//! its status lifecycle, the typed field tree with dot-addressed paths, the
//! per-step form schema and validation rules, the handler-side review state,
//! and the [`RemoteSync`](sync::RemoteSync) seam the wizard controller is
//! built against.

pub mod application;
pub mod error;
pub mod fields;
pub mod review;
pub mod schema;
pub mod sync;
pub mod types;
pub mod validation;
