//! Terminal results that stop request handling and render a fixed response.

use http::header::CONTENT_TYPE;
use http::{Response, StatusCode};

/// A "stop now and render this instead" signal.
///
/// Returned (wrapped in [`Error::Halt`](crate::Error::Halt)) by the domain guard
/// and by web-mode [`dump`](crate::dump::dump). The top-level request loop is
/// expected to write [`into_response`](Self::into_response) and do nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Halt {
    status: StatusCode,
    content_type: &'static str,
    body: String,
}

impl Halt {
    /// A plaintext halt. The body is written as-is.
    pub fn plain(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.into(),
        }
    }

    /// An HTML fragment halt. Callers are responsible for escaping.
    pub fn html(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/html; charset=utf-8",
            body: body.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Converts the halt into the response to write.
    pub fn into_response(self) -> Response<String> {
        let mut response = Response::new(self.body);
        *response.status_mut() = self.status;
        response.headers_mut().insert(
            CONTENT_TYPE,
            http::HeaderValue::from_static(self.content_type),
        );
        response
    }
}

/// Escapes `& < > " '` so the text is inert inside HTML.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#039;Jerry&#039;&lt;/a&gt;"
        );
        assert_eq!(escape_html("evil.com"), "evil.com");
    }

    #[test]
    fn test_into_response() {
        let response = Halt::plain(StatusCode::FORBIDDEN, "nope").into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(response.body(), "nope");
    }
}
