use super::jenkins::{Inner, Jenkins};
use crate::{
    Auth, BodySnippetConfig, Error, ProxyConfig,
    transport::blocking_transport::{DynBlockingTransport, TransportSettings, UreqBlocking},
    util::url::normalize_base_url,
};
use std::{sync::Arc, time::Duration};
use url::Url;

const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Configures and constructs [`Jenkins`].
pub struct JenkinsBuilder {
    base_url: Url,
    auth: Option<Auth>,
    verify_tls: bool,
    user_agent: String,
    timeout: Duration,
    connect_timeout: Duration,
    read_timeout: Duration,
    proxy: Option<ProxyConfig>,
    no_proxy: bool,
    body_snippet: BodySnippetConfig,
    transport: Option<DynBlockingTransport>,
}

impl JenkinsBuilder {
    pub(crate) fn try_new(base: impl AsRef<str>) -> Result<Self, Error> {
        let base_url = normalize_base_url(base.as_ref())?;
        Ok(Self {
            base_url,
            auth: None,
            verify_tls: true,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(30),
            proxy: None,
            no_proxy: false,
            body_snippet: BodySnippetConfig::default(),
            transport: None,
        })
    }

    pub fn auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn auth_basic(mut self, user: impl Into<String>, secret: impl Into<String>) -> Self {
        self.auth = Some(Auth::basic(user, secret));
        self
    }

    /// Route requests through explicit per-scheme proxies.
    pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Ignore `HTTP_PROXY`/`HTTPS_PROXY` when no explicit proxy is set.
    pub fn no_system_proxy(mut self) -> Self {
        self.no_proxy = true;
        self
    }

    pub fn verify_tls(mut self, yes: bool) -> Self {
        self.verify_tls = yes;
        self
    }

    pub fn danger_accept_invalid_certs(self, yes: bool) -> Self {
        self.verify_tls(!yes)
    }

    /// Override the default `User-Agent` header.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    pub fn timeout(mut self, value: Duration) -> Self {
        self.timeout = value;
        self
    }

    pub fn connect_timeout(mut self, value: Duration) -> Self {
        self.connect_timeout = value;
        self
    }

    pub fn read_timeout(mut self, value: Duration) -> Self {
        self.read_timeout = value;
        self
    }

    pub fn capture_body_snippet(mut self, enabled: bool) -> Self {
        self.body_snippet.enabled = enabled;
        self
    }

    pub fn max_body_snippet_bytes(mut self, max_bytes: usize) -> Self {
        self.body_snippet.max_bytes = max_bytes;
        self
    }

    /// Replace the `ureq` transport, e.g. with a recording fake.
    pub fn transport(mut self, transport: DynBlockingTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<Jenkins, Error> {
        let transport: DynBlockingTransport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(UreqBlocking::try_new(&TransportSettings {
                verify_tls: self.verify_tls,
                user_agent: self.user_agent,
                timeout: self.timeout,
                connect_timeout: self.connect_timeout,
                read_timeout: self.read_timeout,
                proxy: self.proxy,
                no_system_proxy: self.no_proxy,
            })?),
        };

        Ok(Jenkins {
            inner: Arc::new(Inner {
                base: self.base_url,
                auth: self.auth,
                timeout: self.timeout,
                body_snippet: self.body_snippet,
                transport,
            }),
        })
    }
}
