//! HTTP plumbing underneath the client.
//!
//! * [`blocking_transport::UreqBlocking`] owns the `ureq` agents and applies
//!   proxy and TLS settings.
//! * `request` holds the request/response values the client works with.

pub mod blocking_transport;
#[cfg(feature = "metrics")]
pub(crate) mod metrics;
pub(crate) mod request;

use http::{HeaderMap, HeaderValue, Method, StatusCode};
use std::time::Duration;
use url::Url;

#[derive(Clone, Debug)]
pub struct TransportBody {
    pub bytes: Vec<u8>,
    pub content_type: Option<HeaderValue>,
}

/// A fully resolved request, ready for the wire.
#[derive(Clone, Debug)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
    pub body: Option<TransportBody>,
    pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}
