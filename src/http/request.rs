use std::collections::HashMap;

/// Represents a parsed HTTP request from a client.
///
/// Only GET is recognized by the parser, so the request carries no method
/// field; a request line that is not a well-formed GET degrades to the
/// default request (URI `/`). Header names and values are stored trimmed
/// and lower-cased, and a repeated header name overwrites the earlier value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The request URI exactly as sent (not percent-decoded; decoding is
    /// the router's responsibility).
    pub uri: String,
    /// Request headers, lower-cased name to lower-cased value.
    pub headers: HashMap<String, String>,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            uri: "/".to_string(),
            headers: HashMap::new(),
        }
    }
}

impl Request {
    /// Retrieves a header value by its lower-cased name.
    ///
    /// Returns `None` when the header is absent, which is distinct from
    /// a header that is present with an empty value.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|v| v.as_str())
    }

    /// Whether the client asked for the connection to be torn down after
    /// this request (`Connection: close`).
    pub fn wants_close(&self) -> bool {
        self.header("connection") == Some("close")
    }
}
