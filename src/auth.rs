use crate::Error;
use base64::{Engine, engine::general_purpose::STANDARD as B64};
use http::{HeaderMap, HeaderValue, header::AUTHORIZATION};
use std::fmt;

/// A password or API token that never shows up in `Debug`/`Display` output.
#[derive(Clone, Default, Eq, PartialEq)]
pub struct SecretString(String);

impl SecretString {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Credential pair sent as HTTP basic authentication.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Auth {
    pub user: String,
    pub secret: SecretString,
}

impl Auth {
    #[must_use]
    pub fn basic(user: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            secret: SecretString::new(secret),
        }
    }

    pub(crate) fn secret(&self) -> &str {
        self.secret.expose()
    }

    pub(crate) fn apply(&self, headers: &mut HeaderMap) -> Result<(), Error> {
        let raw = format!(
            "Basic {}",
            B64.encode(format!("{}:{}", self.user, self.secret.expose()))
        );
        let mut value = HeaderValue::from_str(&raw).map_err(|err| Error::InvalidConfig {
            message: "invalid Authorization header value".into(),
            source: Some(Box::new(err)),
        })?;
        value.set_sensitive(true);

        headers.insert(AUTHORIZATION, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_auth_header_is_base64_of_user_and_secret() {
        let mut headers = HeaderMap::new();
        Auth::basic("user", "token").apply(&mut headers).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Basic dXNlcjp0b2tlbg==");
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let auth = Auth::basic("user", "hunter2");
        assert!(!format!("{auth:?}").contains("hunter2"));
    }
}
