use crate::http::request::Request;

/// Parses one framed header block (request line, header lines, and the
/// terminating blank line) into a [`Request`].
///
/// Never fails. A request line that does not split on spaces into exactly
/// three tokens with a literal `GET` method yields the default request
/// (URI `/`), and the block's header lines are not examined further.
/// A malformed header line is skipped; parsing continues with the next
/// line. Header names and values are trimmed and lower-cased, and a
/// repeated header name overwrites the earlier value.
pub fn parse_header_block(block: &[u8]) -> Request {
    let text = String::from_utf8_lossy(block);
    let mut lines = text.split("\r\n");

    // split always yields at least one element
    let request_line = lines.next().unwrap_or("");
    let tokens: Vec<&str> = request_line.split(' ').collect();
    if tokens.len() != 3 || tokens[0] != "GET" {
        return Request::default();
    }

    let mut request = Request {
        uri: tokens[1].trim().to_string(),
        ..Request::default()
    };

    for line in lines {
        if line.is_empty() {
            continue;
        }

        // "Name: Value" splits on ':' and ' ' into (name, "", value);
        // any other token count means the line is malformed
        let fields: Vec<&str> = line.split([':', ' ']).collect();
        if fields.len() != 3 {
            continue;
        }

        request.headers.insert(
            fields[0].trim().to_lowercase(),
            fields[2].trim().to_lowercase(),
        );
    }

    request
}
