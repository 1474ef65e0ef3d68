use super::{TransportRequest, TransportResponse};
use crate::{
    ProxyConfig,
    config::proxy_uri,
    error::{Error, TransportErrorKind},
};
use http::Method;
use std::{sync::Arc, time::Duration};
use ureq::{Agent, Proxy, tls::TlsConfig};

/// Trait implemented by any blocking HTTP layer.
pub trait BlockingTransport: Send + Sync + 'static {
    fn send(&self, req: TransportRequest) -> Result<TransportResponse, Error>;
}

pub type DynBlockingTransport = Arc<dyn BlockingTransport>;

impl<T: BlockingTransport + ?Sized> BlockingTransport for Arc<T> {
    fn send(&self, req: TransportRequest) -> Result<TransportResponse, Error> {
        (**self).send(req)
    }
}

/// How one agent reaches the network.
enum Route<'a> {
    /// Honor `HTTP_PROXY`/`HTTPS_PROXY`/`NO_PROXY` from the environment.
    System,
    Direct,
    Via(&'a str),
}

/// Settings shared by both agents.
#[derive(Clone, Debug)]
pub struct TransportSettings {
    pub verify_tls: bool,
    pub user_agent: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub proxy: Option<ProxyConfig>,
    pub no_system_proxy: bool,
}

/// Default blocking transport built on `ureq`.
///
/// Keeps one agent per URL scheme so `http://` and `https://` traffic can
/// go through different proxies.
#[derive(Clone)]
pub struct UreqBlocking {
    plain: Agent,
    secure: Agent,
}

impl UreqBlocking {
    pub fn try_new(settings: &TransportSettings) -> Result<Self, Error> {
        Ok(Self {
            plain: build_agent(settings, route_for(settings, "http"))?,
            secure: build_agent(settings, route_for(settings, "https"))?,
        })
    }

    fn agent_for(&self, url: &url::Url) -> &Agent {
        if url.scheme() == "https" {
            &self.secure
        } else {
            &self.plain
        }
    }
}

fn route_for<'a>(settings: &'a TransportSettings, scheme: &str) -> Route<'a> {
    match &settings.proxy {
        Some(proxy) => proxy.for_scheme(scheme).map_or(Route::Direct, Route::Via),
        None if settings.no_system_proxy => Route::Direct,
        None => Route::System,
    }
}

fn build_agent(settings: &TransportSettings, route: Route<'_>) -> Result<Agent, Error> {
    let mut builder = Agent::config_builder()
        .http_status_as_error(false)
        .max_redirects(0)
        .max_redirects_will_error(false)
        .timeout_global(Some(settings.timeout))
        .timeout_connect(Some(settings.connect_timeout))
        .timeout_recv_body(Some(settings.read_timeout))
        .user_agent(settings.user_agent.as_str());

    match route {
        Route::System => {}
        Route::Direct => builder = builder.proxy(None),
        Route::Via(address) => {
            let uri = proxy_uri(address)?;
            let proxy = Proxy::new(&uri).map_err(|err| Error::InvalidConfig {
                message: format!("invalid proxy '{address}'").into_boxed_str(),
                source: Some(Box::new(err)),
            })?;
            builder = builder.proxy(Some(proxy));
        }
    }

    #[allow(unused_mut)]
    let mut tls = TlsConfig::builder();
    #[cfg(all(feature = "native-tls", not(feature = "rustls")))]
    {
        tls = tls.provider(ureq::tls::TlsProvider::NativeTls);
    }
    if !settings.verify_tls {
        tls = tls.disable_verification(true);
    }
    builder = builder.tls_config(tls.build());

    Ok(Agent::new_with_config(builder.build()))
}

impl BlockingTransport for UreqBlocking {
    fn send(&self, req: TransportRequest) -> Result<TransportResponse, Error> {
        let TransportRequest {
            method,
            url,
            headers,
            query,
            form,
            body,
            timeout,
        } = req;
        let agent = self.agent_for(&url);
        let path = url.path().to_string().into_boxed_str();
        let url = url.as_str();
        let method_for_error = method.clone();

        let map_err = |err: ureq::Error| {
            let kind = match &err {
                ureq::Error::Timeout(_) => TransportErrorKind::Timeout,
                ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => {
                    TransportErrorKind::Connect
                }
                ureq::Error::Io(io) if io.kind() == std::io::ErrorKind::TimedOut => {
                    TransportErrorKind::Timeout
                }
                ureq::Error::Io(io)
                    if matches!(
                        io.kind(),
                        std::io::ErrorKind::ConnectionRefused
                            | std::io::ErrorKind::ConnectionReset
                            | std::io::ErrorKind::ConnectionAborted
                            | std::io::ErrorKind::NotConnected
                    ) =>
                {
                    TransportErrorKind::Connect
                }
                _ => TransportErrorKind::Other,
            };

            Error::Transport {
                method: method_for_error.clone(),
                path: path.clone(),
                kind,
                source: Box::new(err),
            }
        };

        let mut response = match method {
            Method::GET => {
                drop(form);
                drop(body);
                let mut req = agent.get(url).query_pairs(query);
                for (name, value) in headers.iter() {
                    req = req.header(name, value);
                }
                req.config()
                    .timeout_global(Some(timeout))
                    .build()
                    .call()
                    .map_err(map_err)?
            }
            Method::POST => {
                let mut req = agent.post(url).query_pairs(query);
                for (name, value) in headers.iter() {
                    req = req.header(name, value);
                }
                let req = req.config().timeout_global(Some(timeout)).build();
                if let Some(body) = body {
                    let req = match body.content_type {
                        Some(content_type) => req.header(http::header::CONTENT_TYPE, content_type),
                        None => req,
                    };
                    req.send(body.bytes).map_err(map_err)?
                } else if form.is_empty() {
                    req.send_empty().map_err(map_err)?
                } else {
                    req.send_form(form).map_err(map_err)?
                }
            }
            other => {
                return Err(Error::InvalidConfig {
                    message: format!("unsupported HTTP method: {other}").into_boxed_str(),
                    source: None,
                });
            }
        };

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(map_err)?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
