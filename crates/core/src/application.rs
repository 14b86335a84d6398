//! Application resource and its status lifecycle.
//!
//! Defines the draft benefit application as the front-ends see it: an
//! optional backend-assigned id, a status enumeration with wire string
//! conversions, the open per-product field tree, and bound attachments.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::fields::FieldMap;
use crate::types::{ApplicationId, AttachmentId, Timestamp};

// ---------------------------------------------------------------------------
// Application status
// ---------------------------------------------------------------------------

/// Status values for a benefit application.
///
/// The editable set is `{Draft, InfoRequired}`; once the status leaves it
/// the application is read-only for the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Draft,
    Submitted,
    Received,
    Handling,
    #[serde(rename = "additional_information_needed")]
    InfoRequired,
    Accepted,
    Rejected,
    Cancelled,
}

impl ApplicationStatus {
    /// Parse a status string from the backend.
    pub fn from_str_wire(s: &str) -> Result<Self, CoreError> {
        match s {
            "draft" => Ok(Self::Draft),
            "submitted" => Ok(Self::Submitted),
            "received" => Ok(Self::Received),
            "handling" => Ok(Self::Handling),
            "additional_information_needed" => Ok(Self::InfoRequired),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(CoreError::Validation(format!(
                "Invalid application status '{s}'"
            ))),
        }
    }

    /// Convert to the backend wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Received => "received",
            Self::Handling => "handling",
            Self::InfoRequired => "additional_information_needed",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether an application in this status may still be edited.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::InfoRequired)
    }
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

/// Fixed attachment type enumeration shared by the per-product flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentType {
    EmploymentContract,
    PaySubsidyDecision,
    EducationContract,
    HelsinkiBenefitVoucher,
    Other,
}

/// A file bound to an application.
///
/// Deletion is addressed by the `(application_id, id)` pair; there is no
/// orphaned-attachment cleanup on this side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub application_id: ApplicationId,
    pub attachment_type: AttachmentType,
    pub file_name: String,
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// A draft benefit/voucher application.
///
/// `id` is `None` for a new, never-saved draft. An application without an
/// id must never be sent to the backend via update, only via create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ApplicationId>,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub fields: FieldMap,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<Timestamp>,
}

impl Application {
    /// A fresh local draft with no backend id yet.
    pub fn new_draft() -> Self {
        Self {
            id: None,
            status: ApplicationStatus::Draft,
            fields: FieldMap::default(),
            attachments: Vec::new(),
            created_at: None,
            modified_at: None,
        }
    }

    /// Whether the applicant may still edit this application.
    pub fn is_editable(&self) -> bool {
        self.status.is_editable()
    }

    /// The backend id, or the programming-error class failure when absent.
    pub fn require_id(&self) -> Result<ApplicationId, CoreError> {
        self.id.ok_or(CoreError::MissingId("Application"))
    }

    /// Drop one attachment from the local list after the backend confirmed
    /// its deletion. Returns whether anything was removed.
    pub fn remove_attachment(&mut self, attachment_id: AttachmentId) -> bool {
        let before = self.attachments.len();
        self.attachments.retain(|a| a.id != attachment_id);
        self.attachments.len() != before
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
