//! Server identity handed to [`crate::Jenkins`] at construction.

use crate::{Auth, Error};

/// Everything that identifies one Jenkins server and how to reach it.
///
/// Built once (typically at the command-line boundary) and moved into the
/// client, which never changes it afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub base_url: String,
    pub auth: Option<Auth>,
    pub proxy: Option<ProxyConfig>,
    /// `Some(false)` disables TLS certificate verification.
    pub verify_tls: Option<bool>,
}

impl ServerConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth: None,
            proxy: None,
            verify_tls: None,
        }
    }

    #[must_use]
    pub fn with_auth(mut self, user: impl Into<String>, secret: impl Into<String>) -> Self {
        self.auth = Some(Auth::basic(user, secret));
        self
    }

    #[must_use]
    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    #[must_use]
    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = Some(verify);
        self
    }

    pub(crate) fn verifies_tls(&self) -> bool {
        self.verify_tls.unwrap_or(true)
    }
}

/// Proxy addresses per URL scheme. A scheme without an address goes direct.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    pub http: Option<String>,
    pub https: Option<String>,
}

impl ProxyConfig {
    /// Same proxy for both schemes, as the `--proxy host:port` flag does.
    #[must_use]
    pub fn both(address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            http: Some(address.clone()),
            https: Some(address),
        }
    }

    pub(crate) fn for_scheme(&self, scheme: &str) -> Option<&str> {
        match scheme {
            "https" => self.https.as_deref(),
            _ => self.http.as_deref(),
        }
        .filter(|address| !address.trim().is_empty())
    }
}

pub(crate) fn proxy_uri(address: &str) -> Result<String, Error> {
    let address = address.trim();
    if address.is_empty() {
        return Err(Error::invalid_config("empty proxy address"));
    }
    if address.contains("://") {
        Ok(address.to_owned())
    } else {
        Ok(format!("http://{address}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_is_selected_per_scheme() {
        let proxy = ProxyConfig {
            http: Some("plain:3128".into()),
            https: None,
        };
        assert_eq!(proxy.for_scheme("http"), Some("plain:3128"));
        assert_eq!(proxy.for_scheme("https"), None);
        assert_eq!(ProxyConfig::both("p:1").for_scheme("https"), Some("p:1"));
    }

    #[test]
    fn proxy_without_scheme_defaults_to_http() {
        assert_eq!(proxy_uri("proxy:8080").unwrap(), "http://proxy:8080");
        assert_eq!(
            proxy_uri("socks5://proxy:1080").unwrap(),
            "socks5://proxy:1080"
        );
        assert!(proxy_uri("  ").is_err());
    }

    #[test]
    fn tls_is_verified_unless_disabled() {
        let config = ServerConfig::new("https://ci");
        assert!(config.verifies_tls());
        assert!(!config.with_verify_tls(false).verifies_tls());
    }
}
