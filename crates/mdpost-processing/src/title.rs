use regex::Regex;
use std::sync::LazyLock;

use crate::file_name::split_extension;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n\t ]+").expect("valid regex"));
static PERCENT_OCTET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)%[a-f0-9]{2}").expect("valid regex"));
static SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" +").expect("valid regex"));

/// Entry title for an uploaded file: the base name without its final extension,
/// sanitised as plain text. May be empty.
pub fn derive_title(file_name: &str) -> String {
    let (stem, _) = split_extension(file_name);
    sanitize_text_field(stem)
}

/// Remove tags, escaping any `<` that does not open one, and any stray `>`.
fn strip_tags(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find(['<', '>']) {
        output.push_str(&rest[..pos]);
        if rest[pos..].starts_with('>') {
            output.push_str("&gt;");
            rest = &rest[pos + 1..];
            continue;
        }

        let after = &rest[pos + 1..];
        match after.find(['<', '>']) {
            Some(end) if after[end..].starts_with('>') => {
                rest = &after[end + 1..];
            }
            _ => {
                output.push_str("&lt;");
                rest = after;
            }
        }
    }

    output.push_str(rest);
    output
}

/// Sanitise user-supplied text for storage as a single-line plain-text field.
///
/// Tags are removed, whitespace runs collapse to one space, percent-encoded octets are
/// dropped and the result is trimmed.
pub fn sanitize_text_field(text: &str) -> String {
    let mut filtered = if text.contains(['<', '>']) {
        strip_tags(text)
    } else {
        text.to_string()
    };

    filtered = WHITESPACE_RUN.replace_all(&filtered, " ").trim().to_string();

    let mut found = false;
    while let Some(octet) = PERCENT_OCTET.find(&filtered) {
        let octet = octet.as_str().to_string();
        filtered = filtered.replace(&octet, "");
        found = true;
    }
    if found {
        filtered = SPACE_RUN.replace_all(&filtered, " ").trim().to_string();
    }

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_file_stem() {
        assert_eq!(derive_title("notes.md"), "notes");
        assert_eq!(derive_title("photo-post.markdown"), "photo-post");
        assert_eq!(derive_title("archive.tar.md"), "archive.tar");
        assert_eq!(derive_title("uploads/2024/notes.md"), "notes");
    }

    #[test]
    fn empty_stem_gives_empty_title() {
        assert_eq!(derive_title(".md"), "");
        assert_eq!(derive_title("  .md"), "");
    }

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(derive_title("  my \t  first\r\npost .md"), "my first post");
    }

    #[test]
    fn tags_are_removed() {
        assert_eq!(derive_title("<b>Bold</b> title.md"), "Bold title");
    }

    #[test]
    fn lone_angle_brackets_are_escaped() {
        assert_eq!(derive_title("a < b.md"), "a &lt; b");
        assert_eq!(derive_title("a > b.md"), "a &gt; b");
    }

    #[test]
    fn percent_octets_are_removed() {
        assert_eq!(derive_title("My%20Post.md"), "MyPost");
        assert_eq!(derive_title("100%25 done %zz.md"), "100 done %zz");
    }

    #[test]
    fn plain_text_is_unchanged() {
        assert_eq!(sanitize_text_field("Release notes v2"), "Release notes v2");
    }
}
