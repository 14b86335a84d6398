//! Handler-side review state.
//!
//! A back-office reviewer confirms an application section by section. The
//! flags are independent booleans with no ordering constraint; the backend
//! is the source of truth and this model never caches beyond the view
//! session (see the wizard crate's tracker).

use serde::{Deserialize, Serialize};

use crate::types::ApplicationId;

/// The sections a reviewer confirms independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewSection {
    Company,
    ContactPerson,
    DeMinimisAids,
    CoOperationNegotiations,
    Employment,
    Attachments,
    Calculation,
}

/// All review sections, in display order.
pub const ALL_SECTIONS: &[ReviewSection] = &[
    ReviewSection::Company,
    ReviewSection::ContactPerson,
    ReviewSection::DeMinimisAids,
    ReviewSection::CoOperationNegotiations,
    ReviewSection::Employment,
    ReviewSection::Attachments,
    ReviewSection::Calculation,
];

/// Per-application review confirmations, one flag per section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewState {
    pub application_id: ApplicationId,
    #[serde(default)]
    pub company: bool,
    #[serde(default)]
    pub contact_person: bool,
    #[serde(default)]
    pub de_minimis_aids: bool,
    #[serde(default)]
    pub co_operation_negotiations: bool,
    #[serde(default)]
    pub employment: bool,
    #[serde(default)]
    pub attachments: bool,
    #[serde(default)]
    pub calculation: bool,
}

/// A partial update: only the provided sections change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub de_minimis_aids: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub co_operation_negotiations: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculation: Option<bool>,
}

impl ReviewState {
    /// A state with every section unconfirmed.
    pub fn unconfirmed(application_id: ApplicationId) -> Self {
        Self {
            application_id,
            company: false,
            contact_person: false,
            de_minimis_aids: false,
            co_operation_negotiations: false,
            employment: false,
            attachments: false,
            calculation: false,
        }
    }

    pub fn is_confirmed(&self, section: ReviewSection) -> bool {
        match section {
            ReviewSection::Company => self.company,
            ReviewSection::ContactPerson => self.contact_person,
            ReviewSection::DeMinimisAids => self.de_minimis_aids,
            ReviewSection::CoOperationNegotiations => self.co_operation_negotiations,
            ReviewSection::Employment => self.employment,
            ReviewSection::Attachments => self.attachments,
            ReviewSection::Calculation => self.calculation,
        }
    }

    /// Whether every section has been confirmed.
    pub fn all_confirmed(&self) -> bool {
        ALL_SECTIONS.iter().all(|s| self.is_confirmed(*s))
    }

    /// Apply a patch: sections the patch leaves as `None` are untouched.
    pub fn apply(&mut self, patch: &ReviewPatch) {
        if let Some(v) = patch.company {
            self.company = v;
        }
        if let Some(v) = patch.contact_person {
            self.contact_person = v;
        }
        if let Some(v) = patch.de_minimis_aids {
            self.de_minimis_aids = v;
        }
        if let Some(v) = patch.co_operation_negotiations {
            self.co_operation_negotiations = v;
        }
        if let Some(v) = patch.employment {
            self.employment = v;
        }
        if let Some(v) = patch.attachments {
            self.attachments = v;
        }
        if let Some(v) = patch.calculation {
            self.calculation = v;
        }
    }
}

impl ReviewPatch {
    /// A patch setting a single section.
    pub fn section(section: ReviewSection, confirmed: bool) -> Self {
        let mut patch = Self::default();
        match section {
            ReviewSection::Company => patch.company = Some(confirmed),
            ReviewSection::ContactPerson => patch.contact_person = Some(confirmed),
            ReviewSection::DeMinimisAids => patch.de_minimis_aids = Some(confirmed),
            ReviewSection::CoOperationNegotiations => {
                patch.co_operation_negotiations = Some(confirmed)
            }
            ReviewSection::Employment => patch.employment = Some(confirmed),
            ReviewSection::Attachments => patch.attachments = Some(confirmed),
            ReviewSection::Calculation => patch.calculation = Some(confirmed),
        }
        patch
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
