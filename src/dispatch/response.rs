//! Response buffer written by controllers and hooks.

/// Status, headers and body produced by a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: String::new(),
        }
    }
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixed body emitted when no not-found controller exists.
    ///
    /// HEAD requests get the status only.
    pub fn not_found(url: &str, head: bool) -> Self {
        let body = if head {
            String::new()
        } else {
            format!(
                "<h1>404 Not Found</h1><p>The following URL address could not be found on this server: {}</p>",
                url
            )
        };
        Self {
            status: 404,
            headers: vec![("content-type".to_string(), "text/html; charset=utf-8".to_string())],
            body,
        }
    }

    /// A 302 to `location`. HEAD requests get the status and header only.
    pub fn redirect(location: &str, head: bool) -> Self {
        let body = if head {
            String::new()
        } else {
            format!("<h1>302 - Found</h1><p><a href=\"{0}\">{0}</a></p>", location)
        };
        Self {
            status: 302,
            headers: vec![
                ("location".to_string(), location.to_string()),
                ("content-type".to_string(), "text/html; charset=utf-8".to_string()),
            ],
            body,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First value of a header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set a header, replacing any previous value.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Append to the body.
    pub fn write(&mut self, chunk: &str) {
        self.body.push_str(chunk);
    }

    /// Drop the body, keeping status and headers.
    pub fn clear_body(&mut self) {
        self.body.clear();
    }

    pub fn into_parts(self) -> (u16, Vec<(String, String)>, String) {
        (self.status, self.headers, self.body)
    }
}
