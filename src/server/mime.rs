//! File extension to MIME type lookup.

use std::path::Path;

/// Type sent for files whose extension is not in the table.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

const MIME_TYPES: &[(&str, &str)] = &[
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("png", "image/png"),
    ("mp3", "audio/mpeg"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("txt", "text/plain"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("gif", "image/gif"),
];

/// Resolve the `Content-Type` for a file name from its last extension.
pub fn mime_type(file_name: impl AsRef<Path>) -> &'static str {
    file_name
        .as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| {
            MIME_TYPES
                .iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(ext))
                .map(|(_, mime)| *mime)
        })
        .unwrap_or(DEFAULT_MIME_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(mime_type("index.html"), "text/html");
        assert_eq!(mime_type("page.htm"), "text/html");
        assert_eq!(mime_type("style.css"), "text/css");
        assert_eq!(mime_type("app.js"), "application/javascript");
        assert_eq!(mime_type("logo.png"), "image/png");
        assert_eq!(mime_type("song.mp3"), "audio/mpeg");
        assert_eq!(mime_type("notes.txt"), "text/plain");
        assert_eq!(mime_type("photo.jpg"), "image/jpeg");
        assert_eq!(mime_type("photo.jpeg"), "image/jpeg");
        assert_eq!(mime_type("anim.gif"), "image/gif");
    }

    #[test]
    fn test_last_extension_wins() {
        assert_eq!(mime_type("archive.html.gz"), DEFAULT_MIME_TYPE);
        assert_eq!(mime_type("dir/min.v2.js"), "application/javascript");
    }

    #[test]
    fn test_extension_case_is_ignored() {
        assert_eq!(mime_type("INDEX.HTML"), "text/html");
    }

    #[test]
    fn test_unknown_or_missing_extension() {
        assert_eq!(mime_type("binary.bin"), DEFAULT_MIME_TYPE);
        assert_eq!(mime_type("Makefile"), DEFAULT_MIME_TYPE);
        assert_eq!(mime_type(".hidden"), DEFAULT_MIME_TYPE);
    }
}
