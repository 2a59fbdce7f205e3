//! Request routing.
//!
//! Dispatches each parsed request either to static file retrieval
//! (`/static/...`) or to the search UI (everything else), mirroring the
//! two halves of the front-end.

pub mod files;
pub mod search;

use std::path::PathBuf;

use crate::http::request::Request;
use crate::http::response::Response;
use crate::index::SearchIndex;

/// Read-only state shared by every connection worker. Built once at
/// startup; no synchronization is needed afterwards.
pub struct AppState {
    /// Document root served under `/static/`.
    pub static_dir: PathBuf,
    pub index: SearchIndex,
}

const STATIC_PREFIX: &str = "/static/";

/// Produces a response for a parsed request.
pub async fn process(request: &Request, state: &AppState) -> Response {
    if request.uri.starts_with(STATIC_PREFIX) {
        files::serve(&request.uri, &state.static_dir).await
    } else {
        search::render(&request.uri, &state.index)
    }
}

/// Escapes the characters that would otherwise be interpreted as HTML
/// markup when user-controlled text is echoed into a page.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
