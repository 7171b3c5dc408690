//! Request path source.
//!
//! # Responsibilities
//! - Normalize the raw request path (strip slashes and the site base path)
//! - Keep the query string, method and original URL for the 404 procedure
//! - Split the normalized path into non-empty segments
//!
//! # Design Decisions
//! - Captured once per request and never mutated afterwards
//! - The query string is carried along but never consulted by resolution

use std::fmt;

/// An incoming request as seen by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: String,
    path: String,
    query: String,
    url: String,
    request_id: Option<String>,
}

impl Request {
    /// Build a request from a method and a raw path.
    ///
    /// A `?query` suffix on `raw_path` is split off into the query string.
    pub fn new(method: impl Into<String>, raw_path: &str) -> Self {
        Self::builder(method, raw_path).build()
    }

    /// Start building a request with optional host, scheme and base path.
    pub fn builder(method: impl Into<String>, raw_path: &str) -> RequestBuilder {
        let (path, query) = match raw_path.split_once('?') {
            Some((path, query)) => (path, query),
            None => (raw_path, ""),
        };
        RequestBuilder {
            method: method.into().to_ascii_uppercase(),
            raw_path: path.to_string(),
            query: query.to_string(),
            scheme: "http".to_string(),
            host: None,
            base_path: String::new(),
            request_id: None,
        }
    }

    /// The request method, upper-cased.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Whether the request is a HEAD request (no body is ever emitted).
    pub fn is_head(&self) -> bool {
        self.method == "HEAD"
    }

    /// The normalized path: no leading or trailing slash, base path removed.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The raw query string, without the leading `?`.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The original requested URL, used as the 404 argument.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// `scheme://host` of the original URL, when the host is known.
    pub fn origin(&self) -> Option<&str> {
        let (_, rest) = self.url.split_once("://")?;
        let authority_start = self.url.len() - rest.len();
        let end = rest.find('/').map_or(self.url.len(), |i| authority_start + i);
        Some(&self.url[..end])
    }

    /// Correlation id assigned by the front end, if any.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Builder for [`Request`].
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: String,
    raw_path: String,
    query: String,
    scheme: String,
    host: Option<String>,
    base_path: String,
    request_id: Option<String>,
}

impl RequestBuilder {
    /// Set the host used when rendering the original URL.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the URL scheme (defaults to `http`).
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Site root prefix removed from the path before it is split.
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Attach the front end's correlation id.
    pub fn request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn build(self) -> Request {
        let trimmed = normalize(&self.raw_path);
        let base = normalize(&self.base_path);
        let path = strip_base(trimmed, base).to_string();

        let mut url = match &self.host {
            Some(host) => format!("{}://{}/{}", self.scheme, host, trimmed),
            None => format!("/{}", trimmed),
        };
        if !self.query.is_empty() {
            url.push('?');
            url.push_str(&self.query);
        }

        Request {
            method: self.method,
            path,
            query: self.query,
            url,
            request_id: self.request_id,
        }
    }
}

/// Trim leading and trailing slashes.
pub fn normalize(path: &str) -> &str {
    path.trim_matches('/')
}

fn strip_base<'a>(path: &'a str, base: &str) -> &'a str {
    if base.is_empty() {
        return path;
    }
    match path.strip_prefix(base) {
        Some("") => "",
        Some(rest) if rest.starts_with('/') => normalize(rest),
        _ => path,
    }
}

/// Split a path into its non-empty segments.
pub fn segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_slashes_and_query() {
        let req = Request::new("get", "/blog/post/42/?page=2");
        assert_eq!(req.path(), "blog/post/42");
        assert_eq!(req.query(), "page=2");
        assert_eq!(req.method(), "GET");
        assert_eq!(req.url(), "/blog/post/42?page=2");
    }

    #[test]
    fn test_url_with_host() {
        let req = Request::builder("GET", "/a/b")
            .host("example.com")
            .scheme("https")
            .build();
        assert_eq!(req.url(), "https://example.com/a/b");
        assert_eq!(req.origin(), Some("https://example.com"));
        assert_eq!(Request::new("GET", "/a/b").origin(), None);
    }

    #[test]
    fn test_base_path_is_stripped() {
        let req = Request::builder("GET", "/site/blog/post")
            .base_path("/site/")
            .build();
        assert_eq!(req.path(), "blog/post");

        let root = Request::builder("GET", "/site").base_path("site").build();
        assert_eq!(root.path(), "");

        // Only whole segments are stripped
        let other = Request::builder("GET", "/sitemap").base_path("site").build();
        assert_eq!(other.path(), "sitemap");
    }

    #[test]
    fn test_segments_skip_empty() {
        assert_eq!(segments("a//b/c/"), vec!["a", "b", "c"]);
        assert!(segments("").is_empty());
    }

    #[test]
    fn test_head_detection() {
        assert!(Request::new("head", "/").is_head());
        assert!(!Request::new("GET", "/").is_head());
    }
}
