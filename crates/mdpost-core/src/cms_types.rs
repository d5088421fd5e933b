use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Content-management backend types
///
/// Defined in core because configuration selects it and the health probe reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CmsBackend {
    WordPress,
    Local,
}

impl FromStr for CmsBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wordpress" | "wp" => Ok(CmsBackend::WordPress),
            "local" => Ok(CmsBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid CMS backend: {}", s)),
        }
    }
}

impl Display for CmsBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CmsBackend::WordPress => write!(f, "wordpress"),
            CmsBackend::Local => write!(f, "local"),
        }
    }
}
