use super::builder::JenkinsBuilder;
use crate::{
    Auth, BodySnippetConfig, Error, ServerConfig,
    transport::blocking_transport::DynBlockingTransport,
};
use std::{fmt, sync::Arc, time::Duration};
use url::Url;

/// Handle to one Jenkins server.
///
/// Cheap to clone; clones share the same agents and settings.
#[derive(Clone)]
pub struct Jenkins {
    pub(crate) inner: Arc<Inner>,
}

pub(crate) struct Inner {
    pub(crate) base: Url,
    pub(crate) auth: Option<Auth>,
    pub(crate) timeout: Duration,
    pub(crate) body_snippet: BodySnippetConfig,
    pub(crate) transport: DynBlockingTransport,
}

impl Jenkins {
    pub fn builder(base: impl AsRef<str>) -> Result<JenkinsBuilder, Error> {
        JenkinsBuilder::try_new(base)
    }

    pub fn new(base: impl AsRef<str>) -> Result<Self, Error> {
        Self::builder(base)?.build()
    }

    /// Build a client from a [`ServerConfig`] record.
    pub fn from_config(config: ServerConfig) -> Result<Self, Error> {
        let verify_tls = config.verifies_tls();
        let mut builder = Self::builder(&config.base_url)?.verify_tls(verify_tls);
        if let Some(auth) = config.auth {
            builder = builder.auth(auth);
        }
        if let Some(proxy) = config.proxy {
            builder = builder.proxy(proxy);
        }
        builder.build()
    }

    /// Normalized base URL, always ending with `/`.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base
    }
}

impl fmt::Debug for Jenkins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Jenkins")
            .field("base", &self.inner.base.as_str())
            .field("auth", &self.inner.auth)
            .finish_non_exhaustive()
    }
}
