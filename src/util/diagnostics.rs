use crate::{Auth, BodySnippetConfig};
use http::HeaderMap;

use super::redact::{redact_text, truncate_utf8};

pub(crate) fn request_id(headers: &HeaderMap) -> Option<Box<str>> {
    for name in ["x-request-id", "x-correlation-id", "x-jenkins-session"] {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_string().into_boxed_str());
            }
        }
    }
    None
}

pub(crate) fn body_snippet(
    body: &[u8],
    config: BodySnippetConfig,
    auth: Option<&Auth>,
) -> Option<Box<str>> {
    if !config.enabled || body.is_empty() {
        return None;
    }

    let body = redact_text(String::from_utf8_lossy(body).into_owned(), auth);
    Some(truncate_utf8(&body, config.max_bytes).into())
}
