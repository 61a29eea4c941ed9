//! The inbound request as seen by the application context.

use http::header::HOST;
use http::request::Parts;
use http::{HeaderMap, Method, Uri};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// The request a context was built for.
///
/// Its [`id`](Self::id) doubles as the context's session id.
#[derive(Debug, Clone)]
pub struct Request {
    id: String,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
}

impl Request {
    /// Builds the request from transport-level parts.
    ///
    /// The id is taken from `X-Request-Id` when present and non-empty,
    /// otherwise a new UUID v4 is generated.
    pub fn from_parts(parts: Parts) -> Self {
        let id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Self {
            id,
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value if it is present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn host(&self) -> String {
        inbound_host(&self.headers, &self.uri)
    }
}

/// The host name the client asked for, verbatim (port included).
///
/// Uses the `Host` header, then the URI authority, and is empty if neither is set.
pub fn inbound_host(headers: &HeaderMap, uri: &Uri) -> String {
    headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.as_str().to_string()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(builder: http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_id_from_header() {
        let request = Request::from_parts(parts(
            http::Request::builder()
                .uri("/posts/1")
                .header("X-Request-Id", "req-42"),
        ));

        assert_eq!(request.id(), "req-42");
        assert_eq!(request.path(), "/posts/1");
        assert_eq!(request.method(), &Method::GET);
    }

    #[test]
    fn test_id_generated_when_missing_or_blank() {
        let a = Request::from_parts(parts(http::Request::builder().uri("/")));
        let b = Request::from_parts(parts(
            http::Request::builder().uri("/").header("x-request-id", "  "),
        ));

        assert_eq!(a.id().len(), 36);
        assert_ne!(a.id(), b.id());
        assert!(!b.id().trim().is_empty());
    }

    #[test]
    fn test_host_header_then_authority() {
        let with_header = Request::from_parts(parts(
            http::Request::builder()
                .uri("http://internal:8080/")
                .header(HOST, "example.com:8443"),
        ));
        assert_eq!(with_header.host(), "example.com:8443");

        let from_uri = Request::from_parts(parts(
            http::Request::builder().uri("http://example.com/"),
        ));
        assert_eq!(from_uri.host(), "example.com");

        let neither = Request::from_parts(parts(http::Request::builder().uri("/")));
        assert_eq!(neither.host(), "");
    }
}
