use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

use super::{AttachmentId, AuthorId, EntryId};

/// Publication state of a content entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Publish,
    Draft,
    Pending,
    Private,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Publish => "publish",
            EntryStatus::Draft => "draft",
            EntryStatus::Pending => "pending",
            EntryStatus::Private => "private",
        }
    }
}

impl FromStr for EntryStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "publish" | "published" => Ok(EntryStatus::Publish),
            "draft" => Ok(EntryStatus::Draft),
            "pending" => Ok(EntryStatus::Pending),
            "private" => Ok(EntryStatus::Private),
            _ => Err(anyhow::anyhow!("Invalid entry status: {}", s)),
        }
    }
}

impl Display for EntryStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Kind of entry created in the content store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    #[default]
    Post,
    Page,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Post => "post",
            EntryType::Page => "page",
        }
    }

    /// Collection name used by REST routes (`posts`, `pages`)
    pub fn rest_base(&self) -> &'static str {
        match self {
            EntryType::Post => "posts",
            EntryType::Page => "pages",
        }
    }
}

impl FromStr for EntryType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "post" => Ok(EntryType::Post),
            "page" => Ok(EntryType::Page),
            _ => Err(anyhow::anyhow!("Invalid entry type: {}", s)),
        }
    }
}

impl Display for EntryType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Fields of an entry about to be created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub title: String,
    pub body: String,
    pub status: EntryStatus,
    pub author: AuthorId,
    pub entry_type: EntryType,
}

/// A stored entry together with the id the store assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub id: EntryId,
    pub title: String,
    pub body: String,
    pub status: EntryStatus,
    pub author: AuthorId,
    pub entry_type: EntryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<AttachmentId>,
    pub created_at: DateTime<Utc>,
}

impl ContentEntry {
    pub fn from_new(id: EntryId, entry: NewEntry, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: entry.title,
            body: entry.body,
            status: entry.status,
            author: entry.author,
            entry_type: entry.entry_type,
            cover_image: None,
            created_at,
        }
    }
}

/// Reference to an existing entry: its id plus the type it was created as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryRef {
    pub id: EntryId,
    pub entry_type: EntryType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Draft".parse::<EntryStatus>().unwrap(), EntryStatus::Draft);
        assert_eq!(" publish ".parse::<EntryStatus>().unwrap(), EntryStatus::Publish);
        assert!("archived".parse::<EntryStatus>().is_err());
    }

    #[test]
    fn entry_type_rest_base() {
        assert_eq!(EntryType::Post.rest_base(), "posts");
        assert_eq!(EntryType::Page.rest_base(), "pages");
        assert_eq!("PAGE".parse::<EntryType>().unwrap(), EntryType::Page);
    }

    #[test]
    fn stored_entry_starts_without_cover_image() {
        let entry = ContentEntry::from_new(
            EntryId(5),
            NewEntry {
                title: "notes".to_string(),
                body: "<p>hi</p>\n".to_string(),
                status: EntryStatus::Publish,
                author: AuthorId(1),
                entry_type: EntryType::Post,
            },
            Utc::now(),
        );
        assert_eq!(entry.cover_image, None);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["status"], "publish");
        assert!(json.get("cover_image").is_none());
    }
}
