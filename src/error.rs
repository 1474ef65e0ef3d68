use http::{Method, StatusCode};
use std::{error::Error as StdError, fmt, path::PathBuf, time::Duration};
use thiserror::Error;
use url::Url;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy)]
pub struct BodySnippetConfig {
    pub enabled: bool,
    pub max_bytes: usize,
}

impl Default for BodySnippetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_bytes: 4096,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    Unauthorized,
    Forbidden,
    NotFound,
    HttpStatus,
    Transport,
    Decode,
    InvalidConfig,
    TemplateRead,
    JobNotFound,
    JobAlreadyExists,
    JobNotBuildable,
    MissingVariable,
    NoBuilds,
    BuildTimeout,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Other,
}

#[derive(Debug, Clone)]
pub struct HttpError {
    pub status: StatusCode,
    pub method: Method,
    /// Sanitized URL: no query/fragment/userinfo.
    pub url: Box<Url>,
    pub request_id: Option<Box<str>>,
    pub body_snippet: Option<Box<str>>,
}

impl HttpError {
    #[must_use]
    pub fn path(&self) -> &str {
        self.url.path()
    }
}

/// All errors returned by the client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("unauthorized, check the credentials: {0}")]
    Unauthorized(HttpError),

    #[error("forbidden, insufficient permission: {0}")]
    Forbidden(HttpError),

    #[error("not found: {0}")]
    NotFound(HttpError),

    #[error("{0}")]
    HttpStatus(HttpError),

    #[error("Transport error during {method} {path}: {source}")]
    Transport {
        method: Method,
        path: Box<str>,
        kind: TransportErrorKind,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Decode error (HTTP {status}) during {method} {path}: {source}")]
    Decode {
        status: StatusCode,
        method: Method,
        path: Box<str>,
        request_id: Option<Box<str>>,
        body_snippet: Option<Box<str>>,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        message: Box<str>,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    #[error("cannot read job template {}: {source}", path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("job '{name}' does not exist")]
    JobNotFound { name: Box<str> },

    #[error("job '{name}' already exists")]
    JobAlreadyExists { name: Box<str> },

    #[error("job '{name}' is not buildable (disabled?)")]
    JobNotBuildable { name: Box<str> },

    #[error("template variable '{name}' has no value")]
    MissingVariable { name: Box<str> },

    #[error("job '{name}' has no builds")]
    NoBuilds { name: Box<str> },

    #[error("job '{name}' still building after {}s", elapsed.as_secs())]
    BuildTimeout { name: Box<str>, elapsed: Duration },

    #[error("wait for job '{name}' was cancelled")]
    Cancelled { name: Box<str> },
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::HttpStatus(_) => ErrorKind::HttpStatus,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::InvalidConfig { .. } => ErrorKind::InvalidConfig,
            Self::TemplateRead { .. } => ErrorKind::TemplateRead,
            Self::JobNotFound { .. } => ErrorKind::JobNotFound,
            Self::JobAlreadyExists { .. } => ErrorKind::JobAlreadyExists,
            Self::JobNotBuildable { .. } => ErrorKind::JobNotBuildable,
            Self::MissingVariable { .. } => ErrorKind::MissingVariable,
            Self::NoBuilds { .. } => ErrorKind::NoBuilds,
            Self::BuildTimeout { .. } => ErrorKind::BuildTimeout,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized(e)
            | Self::Forbidden(e)
            | Self::NotFound(e)
            | Self::HttpStatus(e) => Some(e.status),
            Self::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::Unauthorized(e)
            | Self::Forbidden(e)
            | Self::NotFound(e)
            | Self::HttpStatus(e) => e.request_id.as_deref(),
            Self::Decode { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::Forbidden(_))
    }

    /// Errors raised from a precondition check before any request was sent.
    #[must_use]
    pub fn is_domain_error(&self) -> bool {
        matches!(
            self,
            Self::JobNotFound { .. }
                | Self::JobAlreadyExists { .. }
                | Self::JobNotBuildable { .. }
                | Self::MissingVariable { .. }
        )
    }

    pub(crate) fn from_http(error: HttpError) -> Self {
        match error.status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(error),
            StatusCode::FORBIDDEN => Self::Forbidden(error),
            StatusCode::NOT_FOUND => Self::NotFound(error),
            _ => Self::HttpStatus(error),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into().into_boxed_str(),
            source: None,
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} ({} {})", self.status, self.method, self.path())?;
        if let Some(request_id) = self.request_id.as_deref() {
            write!(f, " [request-id: {request_id}]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http_error(status: u16) -> HttpError {
        HttpError {
            status: StatusCode::from_u16(status).unwrap(),
            method: Method::GET,
            url: Box::new(Url::parse("http://jenkins/job/demo/api/python").unwrap()),
            request_id: None,
            body_snippet: None,
        }
    }

    #[test]
    fn from_http_classifies_status_codes() {
        assert_eq!(Error::from_http(http_error(401)).kind(), ErrorKind::Unauthorized);
        assert_eq!(Error::from_http(http_error(403)).kind(), ErrorKind::Forbidden);
        assert_eq!(Error::from_http(http_error(404)).kind(), ErrorKind::NotFound);
        assert_eq!(Error::from_http(http_error(409)).kind(), ErrorKind::HttpStatus);
        assert_eq!(Error::from_http(http_error(500)).kind(), ErrorKind::HttpStatus);
    }

    #[test]
    fn http_error_display_mentions_status_and_path() {
        let err = Error::from_http(http_error(500));
        assert_eq!(
            err.to_string(),
            "HTTP 500 Internal Server Error (GET /job/demo/api/python)"
        );
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }
}
