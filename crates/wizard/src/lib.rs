//! The application wizard: form state, step navigation, review tracking.
//!
//! This crate ties the domain model to the step store and the remote sync
//! layer. [`FormState`](form::FormState) owns the in-progress field tree,
//! [`WizardController`](controller::WizardController) owns step position
//! and the validation- and save-gated transitions, and
//! [`ReviewTracker`](review::ReviewTracker) is the handler-side counterpart
//! for section confirmations.

pub mod controller;
pub mod form;
pub mod review;

pub use controller::{StepOutcome, WizardController, WizardError};
pub use form::FormState;
pub use review::ReviewTracker;
