//! HTTP request data models.
//!
//! An `HttpRequest` is the mutable handle that flows through the pipeline.
//! Headers are kept as an ordered list so that appending a header never
//! replaces an earlier one with the same name.

use super::response::HttpResponse;
use crate::auth::basic::basic_auth;
use url::{form_urlencoded, Url};

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    OPTIONS,
    HEAD,
}

impl HttpMethod {
    /// Returns the string representation of the HTTP method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::OPTIONS => "OPTIONS",
            HttpMethod::HEAD => "HEAD",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Username and password for HTTP Basic authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

/// An outgoing HTTP request.
///
/// Once the pipeline has sent the request, the response is attached to it and
/// can be read back with [`HttpRequest::response`].
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,

    url: Url,

    headers: Vec<(String, String)>,

    /// Optional request body.
    pub body: Option<String>,

    auth: Option<BasicCredentials>,

    response: Option<Box<HttpResponse>>,
}

impl HttpRequest {
    /// Creates a request for the given method and absolute URL.
    ///
    /// # Errors
    ///
    /// Returns the parse error if `url` is not a valid absolute URL.
    pub fn new(method: HttpMethod, url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            method,
            url: Url::parse(url)?,
            headers: Vec::new(),
            body: None,
            auth: None,
            response: None,
        })
    }

    /// The full request URL, including the query string.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the first value of a query-string parameter.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    /// Sets a query-string parameter, overwriting any existing value.
    ///
    /// The first occurrence keeps its position; later duplicates are dropped.
    /// A parameter that was not present is appended. Other segments of the
    /// query string are left exactly as they were.
    pub fn set_query_param(&mut self, name: &str, value: &str) {
        let pair = form_urlencoded::Serializer::new(String::new())
            .append_pair(name, value)
            .finish();

        let mut segments: Vec<&str> = Vec::new();
        let mut replaced = false;
        let current = self.url.query().filter(|query| !query.is_empty());
        for segment in current.into_iter().flat_map(|query| query.split('&')) {
            if segment_key(segment).as_deref() != Some(name) {
                segments.push(segment);
            } else if !replaced {
                segments.push(&pair);
                replaced = true;
            }
        }
        if !replaced {
            segments.push(&pair);
        }

        let query = segments.join("&");
        self.url.set_query(Some(&query));
    }

    /// Appends a header. Existing headers with the same name are kept.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// Returns the first value of a header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value of a header (case-insensitive), in insertion order.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// All headers in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Sets the HTTP Basic authentication credentials.
    pub fn set_auth(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.auth = Some(BasicCredentials {
            username: username.into(),
            password: password.into(),
        });
    }

    /// The Basic authentication credentials, if any.
    pub fn auth(&self) -> Option<&BasicCredentials> {
        self.auth.as_ref()
    }

    /// Sets the request body.
    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = Some(body.into());
    }

    /// The response this request received, once sent.
    pub fn response(&self) -> Option<&HttpResponse> {
        self.response.as_deref()
    }

    /// Attaches (or detaches) the paired response.
    pub fn set_response(&mut self, response: Option<HttpResponse>) {
        self.response = response.map(Box::new);
    }

    /// Request target: path plus query string.
    pub fn resource(&self) -> String {
        match self.url.query() {
            Some(query) if !query.is_empty() => format!("{}?{}", self.url.path(), query),
            _ => self.url.path().to_string(),
        }
    }

    /// Header lines as sent on the wire, including `Host` and the rendered
    /// Basic `Authorization` header.
    pub fn header_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.headers.len() + 2);

        if self.header("host").is_none() {
            if let Some(host) = self.url.host_str() {
                match self.url.port() {
                    Some(port) => lines.push(format!("Host: {}:{}", host, port)),
                    None => lines.push(format!("Host: {}", host)),
                }
            }
        }

        lines.extend(self.headers.iter().map(|(k, v)| format!("{}: {}", k, v)));

        if let Some(creds) = &self.auth {
            lines.push(format!(
                "Authorization: {}",
                basic_auth(&creds.username, &creds.password)
            ));
        }

        lines
    }

    /// The request line and header block, without a trailing blank line.
    pub fn raw_headers(&self) -> String {
        let mut raw = format!("{} {} HTTP/1.1", self.method, self.resource());
        for line in self.header_lines() {
            raw.push_str("\r\n");
            raw.push_str(&line);
        }
        raw
    }
}

/// Decoded key of one `&`-separated query segment.
fn segment_key(segment: &str) -> Option<String> {
    form_urlencoded::parse(segment.as_bytes())
        .next()
        .map(|(key, _)| key.into_owned())
}

impl std::fmt::Display for HttpRequest {
    /// Renders the full request message: headers, a blank line, and the body.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\r\n\r\n{}",
            self.raw_headers(),
            self.body.as_deref().unwrap_or("")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::GET, url).unwrap()
    }

    #[test]
    fn test_new_rejects_relative_url() {
        assert!(HttpRequest::new(HttpMethod::GET, "/relative").is_err());
    }

    #[test]
    fn test_set_query_param_appends() {
        let mut req = request("https://api.example.com/items?page=2");
        req.set_query_param("token", "xyz");

        assert_eq!(req.query_param("page").as_deref(), Some("2"));
        assert_eq!(req.query_param("token").as_deref(), Some("xyz"));
        assert_eq!(req.url().query(), Some("page=2&token=xyz"));
    }

    #[test]
    fn test_set_query_param_overwrites_in_place() {
        let mut req = request("https://api.example.com/items?token=old&page=2&token=older");
        req.set_query_param("token", "new");

        assert_eq!(req.url().query(), Some("token=new&page=2"));
    }

    #[test]
    fn test_set_query_param_leaves_other_segments_untouched() {
        let mut req = request("https://api.example.com/search?debug&q=a%20b&x=1;y");
        req.set_query_param("token", "xyz");

        assert_eq!(req.url().query(), Some("debug&q=a%20b&x=1;y&token=xyz"));
    }

    #[test]
    fn test_set_query_param_matches_encoded_key() {
        let mut req = request("https://api.example.com/?to%6Ben=old&flag");
        req.set_query_param("token", "new");

        assert_eq!(req.url().query(), Some("token=new&flag"));
    }

    #[test]
    fn test_set_query_param_encodes_value() {
        let mut req = request("https://api.example.com/items");
        req.set_query_param("token", "a b&c");

        assert_eq!(req.url().query(), Some("token=a+b%26c"));
        assert_eq!(req.query_param("token").as_deref(), Some("a b&c"));
    }

    #[test]
    fn test_add_header_keeps_duplicates() {
        let mut req = request("https://api.example.com/");
        req.add_header("X-Api-Key", "one");
        req.add_header("x-api-key", "two");

        assert_eq!(req.header("X-API-KEY"), Some("one"));
        assert_eq!(req.header_values("X-Api-Key"), vec!["one", "two"]);
    }

    #[test]
    fn test_raw_headers_includes_host_and_auth() {
        let mut req = request("http://localhost:8080/users?id=1");
        req.add_header("Accept", "application/json");
        req.set_auth("user", "pass");

        assert_eq!(
            req.raw_headers(),
            "GET /users?id=1 HTTP/1.1\r\n\
             Host: localhost:8080\r\n\
             Accept: application/json\r\n\
             Authorization: Basic dXNlcjpwYXNz"
        );
    }

    #[test]
    fn test_display_includes_body() {
        let mut req = HttpRequest::new(HttpMethod::POST, "https://example.com/").unwrap();
        req.set_body(r#"{"a":1}"#);

        let rendered = req.to_string();
        assert!(rendered.starts_with("POST / HTTP/1.1\r\nHost: example.com"));
        assert!(rendered.ends_with("\r\n\r\n{\"a\":1}"));
    }

    #[test]
    fn test_response_attachment() {
        let mut req = request("https://example.com/");
        assert!(req.response().is_none());

        req.set_response(Some(HttpResponse::new(204, "No Content")));
        assert_eq!(req.response().map(|r| r.status_code), Some(204));

        req.set_response(None);
        assert!(req.response().is_none());
    }
}
