use http::{HeaderMap, HeaderValue, Method, StatusCode};
use url::Url;

#[derive(Clone, Debug)]
pub struct RequestBody {
    pub bytes: Vec<u8>,
    pub content_type: Option<HeaderValue>,
}

impl RequestBody {
    #[must_use]
    pub fn bytes_with_content_type(bytes: Vec<u8>, content_type: HeaderValue) -> Self {
        Self {
            bytes,
            content_type: Some(content_type),
        }
    }

    /// A job configuration document.
    #[must_use]
    pub fn xml(text: impl Into<String>) -> Self {
        Self::bytes_with_content_type(
            text.into().into_bytes(),
            HeaderValue::from_static("application/xml"),
        )
    }
}

/// Base URL a request's segments are joined under.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Target {
    /// The client's own server.
    #[default]
    Client,
    /// An address the server reported, such as a build's `url`. Credentials
    /// are only sent when it has the client's origin.
    Reported(Url),
    /// A second server chosen by the caller.
    Remote(Url),
}

/// One call against a server, before auth and base URL are applied.
#[derive(Clone, Debug)]
pub struct Request {
    pub method: Method,
    pub segments: Vec<String>,
    pub target: Target,
    pub query: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl Request {
    #[must_use]
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            target: Target::Client,
            query: Vec::new(),
            form: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::GET, segments)
    }

    #[must_use]
    pub fn post<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::POST, segments)
    }

    /// Resolve `segments` against `target` instead of the client's own URL.
    #[must_use]
    pub fn on(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn query_pair(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn form_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.body = None;
        self.form
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.form.clear();
        self.body = Some(body);
        self
    }
}

#[derive(Clone, Debug)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Response {
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn literal(&self) -> Result<serde_json::Value, crate::literal::LiteralError> {
        crate::literal::parse_slice(&self.body)
    }

    #[must_use]
    pub fn header_str(&self, name: http::header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
