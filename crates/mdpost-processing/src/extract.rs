//! Cover image extraction
//!
//! The scan runs over the raw Markdown, before conversion. It is a plain pattern match, so
//! image syntax inside code spans and fenced blocks is found too.

use regex::Regex;
use std::sync::LazyLock;

static IMAGE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[.*?\]\((.*?)\)").expect("valid regex"));

/// Protocols a stored URL may use
const ALLOWED_PROTOCOLS: &[&str] = &[
    "http", "https", "ftp", "ftps", "mailto", "news", "irc", "irc6", "ircs", "gopher", "nntp",
    "feed", "telnet", "mms", "rtsp", "sms", "svn", "tel", "fax", "xmpp", "webcal", "urn",
];

/// URL of the first `![alt](url)` reference in `markdown`, sanitised.
///
/// Only the leftmost match is considered. An empty capture, or one that sanitises to
/// nothing, yields `None`.
pub fn first_image_url(markdown: &str) -> Option<String> {
    let captures = IMAGE_REFERENCE.captures(markdown)?;
    let raw = captures.get(1)?.as_str();
    sanitize_url(raw)
}

fn is_url_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || !c.is_ascii() || "-~+_.?#=!&;,/:%@$|*'()[]".contains(c)
}

/// Remove every `%0d` / `%0a` (any case), repeating until none are left.
fn strip_encoded_newlines(url: &str) -> String {
    let mut url = url.to_string();
    loop {
        let lower = url.to_ascii_lowercase();
        let found = lower.find("%0d").or_else(|| lower.find("%0a"));
        match found {
            Some(pos) => url.replace_range(pos..pos + 3, ""),
            None => return url,
        }
    }
}

/// Clean a URL for storage.
///
/// Whitespace around the URL is trimmed, inner spaces become `%20` and characters outside
/// the URL-safe set are dropped. Encoded CR/LF is removed, `;//` is repaired to `://`, and
/// a value without a scheme that is not relative gets `http://` in front. URLs whose
/// protocol is not allowed are rejected.
pub fn sanitize_url(raw: &str) -> Option<String> {
    let url: String = raw
        .trim()
        .replace(' ', "%20")
        .chars()
        .filter(|&c| is_url_char(c))
        .collect();
    if url.is_empty() {
        return None;
    }

    let url = if url.to_ascii_lowercase().starts_with("mailto:") {
        url
    } else {
        strip_encoded_newlines(&url)
    };
    let mut url = url.replace(";//", "://");
    if url.is_empty() {
        return None;
    }

    if url.starts_with('/') {
        return Some(url);
    }

    if !url.contains(':') && !url.starts_with(['#', '?']) {
        url = format!("http://{url}");
    }

    if let Some((scheme, _)) = url.split_once(':') {
        // A colon after `/?` belongs to the query, not to a scheme.
        if !scheme.contains("/?") {
            let scheme = scheme.to_ascii_lowercase();
            if !ALLOWED_PROTOCOLS.contains(&scheme.as_str()) {
                tracing::debug!(scheme = %scheme, "Discarding URL with disallowed protocol");
                return None;
            }
        }
    }

    Some(url)
}
