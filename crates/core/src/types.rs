/// Backend-assigned application identifiers are UUIDs.
pub type ApplicationId = uuid::Uuid;

/// Attachment identifiers come from the same backend id space.
pub type AttachmentId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
