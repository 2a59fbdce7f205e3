//! HTML search UI: the front page and query results.

use url::Url;

use crate::http::response::Response;
use crate::index::SearchIndex;
use crate::router::escape_html;

/// Front page: logo and search form, shared by every search response.
const PAGE_HEADER: &str = "<html><head><title>beacon</title></head>\n\
<body>\n\
<center style=\"font-size:500%;\">\n\
<span style=\"position:relative;bottom:-0.33em;color:orange;\">b</span>\
<span style=\"color:red;\">e</span>\
<span style=\"color:gold;\">a</span>\
<span style=\"color:blue;\">c</span>\
<span style=\"color:green;\">o</span>\
<span style=\"color:red;\">n</span>\n\
</center>\n\
<p>\n\
<div style=\"height:20px;\"></div>\n\
<center>\n\
<form action=\"/query\" method=\"get\">\n\
<input type=\"text\" size=30 name=\"terms\" />\n\
<input type=\"submit\" value=\"Search\" />\n\
</form>\n\
</center><p>\n";

/// Renders the search page. When the URI carries a `terms` query argument
/// the index is consulted and the ranked hits are appended below the form,
/// each hyperlinked to its document under `/static/`.
pub fn render(uri: &str, index: &SearchIndex) -> Response {
    let mut response = Response::html();
    response.append_body(PAGE_HEADER);

    if let Some(query) = search_query(uri) {
        let terms: Vec<String> = query.split_whitespace().map(str::to_string).collect();
        let results = index.query(&terms);

        response.append_body(format!(
            "<p><br>\n{} results found for <b>{}</b>\n<p>",
            results.len(),
            escape_html(&query)
        ));

        response.append_body("<ul>");
        for hit in &results {
            let document = escape_html(&hit.document);
            response.append_body(format!(
                "<li> <a href=\"/static/{}\">{}</a> [{}]<br>",
                document, document, hit.rank
            ));
        }
        response.append_body("</ul>\n");
    }

    response.append_body("</body>\n</html>\n");
    response
}

/// Pulls the lower-cased `terms` argument out of the URI's query string,
/// percent-decoded by the `url` crate.
fn search_query(uri: &str) -> Option<String> {
    let url = Url::parse("http://localhost").ok()?.join(uri).ok()?;
    url.query_pairs()
        .find(|(name, _)| name == "terms")
        .map(|(_, value)| value.trim().to_lowercase())
}
