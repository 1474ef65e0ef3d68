use crate::Auth;

pub(crate) fn truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes.min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Replace the credential secret wherever a server echoes it back.
pub(crate) fn redact_text(text: String, auth: Option<&Auth>) -> String {
    match auth.map(Auth::secret) {
        Some(secret) if !secret.is_empty() => text.replace(secret, "<redacted>"),
        _ => text,
    }
}
