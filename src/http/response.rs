/// HTTP status codes emitted by the server.
///
/// - `Ok` (200): Request successful
/// - `BadRequest` (400): Malformed request
/// - `NotFound` (404): Resource not found
/// - `InternalServerError` (500): Server error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use beacon::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// Represents a complete HTTP response ready to be sent to a client.
///
/// The connection loop writes the serialized bytes verbatim and never
/// inspects the content.
#[derive(Debug)]
pub struct Response {
    /// Protocol string for the status line, normally `HTTP/1.1`.
    pub protocol: String,
    /// The HTTP status code.
    pub status: StatusCode,
    /// Value of the Content-Type header.
    pub content_type: String,
    /// Accumulated response body.
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// use beacon::http::response::{ResponseBuilder, StatusCode};
///
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .content_type("text/plain")
///     .body(b"hello".to_vec())
///     .build();
/// assert_eq!(response.body, b"hello");
/// ```
pub struct ResponseBuilder {
    protocol: String,
    status: StatusCode,
    content_type: String,
    body: Vec<u8>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code,
    /// defaulting to `HTTP/1.1` and `text/html`.
    pub fn new(status: StatusCode) -> Self {
        Self {
            protocol: "HTTP/1.1".to_string(),
            status,
            content_type: "text/html".to_string(),
            body: Vec::new(),
        }
    }

    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn build(self) -> Response {
        Response {
            protocol: self.protocol,
            status: self.status,
            content_type: self.content_type,
            body: self.body,
        }
    }
}

impl Response {
    /// Creates a 200 OK `text/html` response with an empty body, ready
    /// for `append_body`.
    pub fn html() -> Self {
        ResponseBuilder::new(StatusCode::Ok).build()
    }

    /// Appends bytes to the response body.
    pub fn append_body(&mut self, chunk: impl AsRef<[u8]>) {
        self.body.extend_from_slice(chunk.as_ref());
    }

    /// Serializes the response into its wire form: status line, headers,
    /// blank line, body.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.body.len() + 128);

        let status_line = format!(
            "{} {} {}\r\n",
            self.protocol,
            self.status.as_u16(),
            self.status.reason_phrase()
        );
        buf.extend_from_slice(status_line.as_bytes());

        buf.extend_from_slice(format!("Content-Type: {}\r\n", self.content_type).as_bytes());
        buf.extend_from_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());

        buf.extend_from_slice(b"\r\n");
        buf.extend_from_slice(&self.body);

        buf
    }
}
