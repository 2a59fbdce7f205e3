use std::path::Path;

/// Picks a Content-Type from the file name extension.
///
/// Unknown extensions (and files without one) fall back to
/// `application/octet-stream`.
pub fn from_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("html") | Some("htm") => "text/html",
        Some("jpeg") | Some("jpg") => "image/jpeg",
        Some("png") => "image/png",
        Some("txt") => "text/plain",
        Some("js") => "application/js",
        Some("css") => "text/css",
        Some("xml") => "text/xml",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_extensions() {
        assert_eq!(from_path(Path::new("a/b/index.html")), "text/html");
        assert_eq!(from_path(Path::new("photo.JPG")), "image/jpeg");
        assert_eq!(from_path(Path::new("archive.tar.gz")), "application/octet-stream");
        assert_eq!(from_path(Path::new("README")), "application/octet-stream");
    }
}
