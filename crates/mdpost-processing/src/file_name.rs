//! File name helpers
//!
//! Client-supplied names may carry directory components from either path convention, so
//! both `/` and `\` count as separators here regardless of the host platform.

const MAX_FILENAME_LENGTH: usize = 255;

/// Last path component of `name`.
pub fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Split the base name into stem and extension at its last `.`.
///
/// `notes.md` gives `("notes", Some("md"))`, `.md` gives `("", Some("md"))`,
/// `README` gives `("README", None)`.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    let base = base_name(name);
    match base.rsplit_once('.') {
        Some((stem, extension)) => (stem, Some(extension)),
        None => (base, None),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("File name contains invalid path traversal: {0}")]
pub struct PathTraversal(pub String);

/// Reduce a file name to a safe single path component.
///
/// Characters other than alphanumerics, `.`, `-` and `_` become `_`. Names that end up
/// shorter than three characters are replaced with `file`.
pub fn sanitize_filename(name: &str) -> Result<String, PathTraversal> {
    if name.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(PathTraversal(name.to_string()));
    }

    let file_name_only = base_name(name);
    if file_name_only.contains("..") {
        return Err(PathTraversal(name.to_string()));
    }

    let sanitized: String = file_name_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim().is_empty() || sanitized.len() < 3 {
        return Ok("file".to_string());
    }

    Ok(sanitized)
}
