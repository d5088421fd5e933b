use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

/// Operations a caller can be allowed to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    EditPosts,
}

impl Display for Capability {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Capability::EditPosts => write!(f, "edit_posts"),
        }
    }
}

/// User role for authorization
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Administrator,
    Editor,
    Author,
    Contributor,
    Subscriber,
}

impl UserRole {
    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            UserRole::Administrator
            | UserRole::Editor
            | UserRole::Author
            | UserRole::Contributor => &[Capability::EditPosts],
            UserRole::Subscriber => &[],
        }
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "administrator" | "admin" => Ok(UserRole::Administrator),
            "editor" => Ok(UserRole::Editor),
            "author" => Ok(UserRole::Author),
            "contributor" => Ok(UserRole::Contributor),
            "subscriber" => Ok(UserRole::Subscriber),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UserRole::Administrator => write!(f, "administrator"),
            UserRole::Editor => write!(f, "editor"),
            UserRole::Author => write!(f, "author"),
            UserRole::Contributor => write!(f, "contributor"),
            UserRole::Subscriber => write!(f, "subscriber"),
        }
    }
}
