//! Image MIME types
//!
//! Extension and content type table shared by the image downloader and the media
//! library adapters.

use crate::file_name::split_extension;

const IMAGE_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("jpe", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("avif", "image/avif"),
    ("heic", "image/heic"),
    ("bmp", "image/bmp"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("ico", "image/x-icon"),
    ("svg", "image/svg+xml"),
];

/// Lower-cased media type without parameters (`image/png; q=1` gives `image/png`).
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// Image content type implied by a file name's extension.
pub fn content_type_for_file_name(file_name: &str) -> Option<&'static str> {
    let extension = split_extension(file_name).1?.to_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, content_type)| *content_type)
}

/// Preferred file extension for an image content type.
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let content_type = match essence(content_type).as_str() {
        "image/vnd.microsoft.icon" => "image/x-icon".to_string(),
        "image/jpg" | "image/pjpeg" => "image/jpeg".to_string(),
        other => other.to_string(),
    };
    IMAGE_TYPES
        .iter()
        .find(|(_, ct)| *ct == content_type)
        .map(|(ext, _)| *ext)
}

/// Whether `content_type` names an image type the media library accepts.
pub fn is_image_content_type(content_type: &str) -> bool {
    extension_for_content_type(content_type).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_type_from_extension() {
        assert_eq!(content_type_for_file_name("cat.PNG"), Some("image/png"));
        assert_eq!(content_type_for_file_name("photo.jpeg"), Some("image/jpeg"));
        assert_eq!(content_type_for_file_name("notes.md"), None);
        assert_eq!(content_type_for_file_name("image"), None);
    }

    #[test]
    fn looks_up_extension_from_type() {
        assert_eq!(extension_for_content_type("image/jpeg"), Some("jpg"));
        assert_eq!(extension_for_content_type("Image/PNG; charset=binary"), Some("png"));
        assert_eq!(extension_for_content_type("image/vnd.microsoft.icon"), Some("ico"));
        assert_eq!(extension_for_content_type("text/html"), None);
    }

    #[test]
    fn only_images_are_accepted() {
        assert!(is_image_content_type("image/webp"));
        assert!(!is_image_content_type("application/octet-stream"));
        assert!(!is_image_content_type(""));
    }
}
