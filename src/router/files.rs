//! Static file retrieval under `/static/`.

use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;
use tokio::fs;
use tracing::debug;
use url::Url;

use crate::http::mime;
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::router::escape_html;

/// Serves the file a `/static/...` URI points at inside `static_dir`.
///
/// The URI's query is ignored and its path is percent-decoded. A path that
/// would escape the document root, or one that cannot be read, yields a
/// 404 with the offending name echoed (escaped) in the body.
pub async fn serve(uri: &str, static_dir: &Path) -> Response {
    let Some(relative) = requested_path(uri) else {
        return not_found(uri);
    };

    let full_path = static_dir.join(&relative);
    match fs::read(&full_path).await {
        Ok(contents) => ResponseBuilder::new(StatusCode::Ok)
            .content_type(mime::from_path(&full_path))
            .body(contents)
            .build(),
        Err(e) => {
            debug!(file = %full_path.display(), error = %e, "static file not readable");
            not_found(&relative.to_string_lossy())
        }
    }
}

/// Extracts the decoded path below `/static/`, refusing anything that
/// could step outside the document root.
fn requested_path(uri: &str) -> Option<PathBuf> {
    let url = Url::parse("http://localhost").ok()?.join(uri).ok()?;
    let below_prefix = url.path().strip_prefix("/static/")?;
    let decoded = percent_decode_str(below_prefix).decode_utf8().ok()?;

    let relative = PathBuf::from(decoded.as_ref());
    if !is_path_safe(&relative) {
        return None;
    }
    Some(relative)
}

/// A requested path is safe only if every component is a plain name:
/// no parent traversal, no absolute paths, no prefix components.
fn is_path_safe(relative: &Path) -> bool {
    !relative.as_os_str().is_empty()
        && relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn not_found(name: &str) -> Response {
    let mut response = ResponseBuilder::new(StatusCode::NotFound).build();
    response.append_body(format!(
        "<html><body>Couldn't find file \"{}\"</body></html>\n",
        escape_html(name)
    ));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_is_refused() {
        assert_eq!(requested_path("/static/../secret.txt"), None);
        assert_eq!(requested_path("/static/%2e%2e/secret.txt"), None);
        assert_eq!(requested_path("/static//etc/passwd"), None);
    }

    #[test]
    fn plain_paths_decode() {
        assert_eq!(
            requested_path("/static/docs/a%20b.txt"),
            Some(PathBuf::from("docs/a b.txt"))
        );
        assert_eq!(
            requested_path("/static/index.html?x=1"),
            Some(PathBuf::from("index.html"))
        );
    }
}
