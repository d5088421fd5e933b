use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AttachmentId, EntryId};

/// Stored media attachment, linked to the entry it was sideloaded for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub id: AttachmentId,
    pub entry_id: EntryId,
    pub file_name: String,
    pub content_type: String,
    pub file_size: u64,
    pub source_url: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}
