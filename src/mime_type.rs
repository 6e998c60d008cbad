use mime::Mime;

/// Injected MIME type detection used for writes and listings.
pub trait MimeTypeDetector: Send + Sync {
    fn detect_mime_type(&self, path: &str, content: &[u8]) -> Option<String>;

    fn detect_mime_type_from_path(&self, path: &str) -> Option<String>;
}

const EXTENSIONS: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("log", "text/plain"),
    ("md", "text/markdown"),
    ("csv", "text/csv"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("css", "text/css"),
    ("js", "text/javascript"),
    ("xml", "text/xml"),
    ("json", "application/json"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("gz", "application/gzip"),
    ("tar", "application/x-tar"),
    ("wasm", "application/wasm"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("bmp", "image/bmp"),
    ("svg", "image/svg+xml"),
    ("webp", "image/webp"),
    ("ico", "image/x-icon"),
    ("mp3", "audio/mpeg"),
    ("wav", "audio/wav"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
];

const SIGNATURES: &[(&[u8], &str)] = &[
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"%PDF-", "application/pdf"),
    (b"PK\x03\x04", "application/zip"),
    (b"\x1f\x8b", "application/gzip"),
    (b"\0asm", "application/wasm"),
];

/// Detects by file extension first, then by leading magic bytes. Text content
/// without a known extension is reported as `text/plain`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtensionMimeTypeDetector;

impl ExtensionMimeTypeDetector {
    fn from_extension(path: &str) -> Option<Mime> {
        let name = path.rsplit('/').next().unwrap_or(path);
        let (stem, extension) = name.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }

        let extension = extension.to_ascii_lowercase();
        EXTENSIONS
            .iter()
            .find(|(ext, _)| *ext == extension)
            .and_then(|(_, mime)| mime.parse().ok())
    }

    fn from_content(content: &[u8]) -> Option<Mime> {
        if content.is_empty() {
            return None;
        }

        for (signature, essence) in SIGNATURES {
            if content.starts_with(signature) {
                return essence.parse().ok();
            }
        }

        if std::str::from_utf8(content).is_ok() {
            return Some(mime::TEXT_PLAIN);
        }

        Some(mime::APPLICATION_OCTET_STREAM)
    }
}

impl MimeTypeDetector for ExtensionMimeTypeDetector {
    fn detect_mime_type(&self, path: &str, content: &[u8]) -> Option<String> {
        Self::from_extension(path)
            .or_else(|| Self::from_content(content))
            .map(|mime| mime.essence_str().to_string())
    }

    fn detect_mime_type_from_path(&self, path: &str) -> Option<String> {
        Self::from_extension(path).map(|mime| mime.essence_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_from_path() {
        let detector = ExtensionMimeTypeDetector;
        let cases = vec![
            ("file.txt", Some("text/plain")),
            ("dir/page.HTML", Some("text/html")),
            ("0/data.json", Some("application/json")),
            ("archive.tar.gz", Some("application/gzip")),
            ("image.jpeg", Some("image/jpeg")),
            (".hidden", None),
            ("no-extension", None),
            ("file.unknown", None),
            ("dir.d/file", None),
        ];

        for (path, expected) in cases {
            assert_eq!(
                detector.detect_mime_type_from_path(path).as_deref(),
                expected,
                "failed for case: {}",
                path
            );
        }
    }

    #[test]
    fn test_detect_from_content() {
        let detector = ExtensionMimeTypeDetector;
        let cases: Vec<(&str, &[u8], Option<&str>)> = vec![
            ("image", b"\x89PNG\r\n\x1a\n....", Some("image/png")),
            ("doc", b"%PDF-1.7", Some("application/pdf")),
            ("notes", b"plain words", Some("text/plain")),
            ("blob", b"\xff\xfe\x00\x01", Some("application/octet-stream")),
            ("empty", b"", None),
            ("named.json", b"\x89PNG\r\n\x1a\n", Some("application/json")),
        ];

        for (path, content, expected) in cases {
            assert_eq!(
                detector.detect_mime_type(path, content).as_deref(),
                expected,
                "failed for case: {}",
                path
            );
        }
    }
}
