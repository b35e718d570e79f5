use std::collections::HashMap;

use url::Url;

/// Represents a parsed HTTP request from a client.
///
/// Fields are filled in by the parser as the request streams in and the
/// whole record is handed to the application once the body is complete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// The method token (GET, POST, etc.)
    pub method: String,
    /// The request target as sent (e.g., "/index.html?x=1")
    pub path: String,
    /// "HTTP/1.0" or "HTTP/1.1"
    pub version: String,
    /// Request headers. A repeated name keeps the last value.
    pub headers: HashMap<String, String>,
    /// Trailer fields that followed a chunked body
    pub trailers: HashMap<String, String>,
    /// Declared Content-Length, if any
    pub body_length: Option<u64>,
    pub body: Vec<u8>,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<String>,
    path: Option<String>,
    version: Option<String>,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            path: None,
            version: None,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        let body_length = if self.body.is_empty() {
            None
        } else {
            Some(self.body.len() as u64)
        };

        Ok(Request {
            method: self.method.ok_or("method missing")?,
            path: self.path.ok_or("path missing")?,
            version: self.version.unwrap_or_else(|| "HTTP/1.1".to_string()),
            headers: self.headers,
            trailers: HashMap::new(),
            body_length,
            body: self.body,
        })
    }
}

impl Request {
    /// Retrieves a header value by name.
    ///
    /// An exact match wins; otherwise names are compared ASCII
    /// case-insensitively.
    pub fn header(&self, key: &str) -> Option<&str> {
        if let Some(value) = self.headers.get(key) {
            return Some(value.as_str());
        }

        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    /// Retrieves the Content-Length header value and parses it as a usize.
    ///
    /// Returns 0 if the header is missing or not a valid number.
    pub fn content_length(&self) -> usize {
        self.header("Content-Length")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    pub fn is_chunked(&self) -> bool {
        self.header("Transfer-Encoding")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("chunked"))
    }

    /// Determines whether the client asked for the connection to stay open.
    ///
    /// HTTP/1.1 defaults to keep-alive unless `Connection: close` is sent;
    /// HTTP/1.0 needs an explicit `Connection: keep-alive`.
    pub fn keep_alive(&self) -> bool {
        match self.header("Connection") {
            Some(v) if v.eq_ignore_ascii_case("close") => false,
            Some(v) if v.eq_ignore_ascii_case("keep-alive") => true,
            _ => self.version == "HTTP/1.1",
        }
    }

    /// Resolves the request target to an absolute URL using the `Host`
    /// header, falling back to `localhost`.
    pub fn url(&self) -> Result<Url, url::ParseError> {
        let host = self.header("Host").unwrap_or("localhost");
        let base = Url::parse(&format!("http://{}/", host))?;
        base.join(&self.path)
    }
}
