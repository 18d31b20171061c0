use serde::{Deserialize, Serialize};

/// The single file bound to the current submission. Selecting a new file
/// replaces the previous reference; there is no queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    #[serde(default, skip_serializing)]
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Owned snapshot of the workflow fields at the moment `submit` was invoked.
/// Later edits to the workflow cannot leak into an in-flight request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub subject: String,
    pub comment: String,
    pub recipient_ids: Vec<String>,
    pub attachment: Attachment,
}

/// Returned by the materials endpoint client after a 2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// Client-generated key attached to the request so a cooperating backend
    /// can deduplicate accidental double submissions.
    pub idempotency_key: String,
    pub status: u16,
}
