//! Request execution: auth, URL resolution and status classification.

use super::Jenkins;
use crate::{
    Error, HttpError,
    transport::{
        TransportBody, TransportRequest,
        request::{Request, Response, Target},
    },
    util::{
        diagnostics,
        url::{endpoint_url, sanitize_url_for_error},
    },
};
use http::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::error::Error as StdError;
use url::Url;

#[cfg(feature = "tracing")]
use tracing::field;

impl Jenkins {
    pub(crate) fn send_literal(&self, req: Request) -> Result<Value, Error> {
        let resp = self.execute_request(&req)?;
        resp.literal()
            .map_err(|source| self.decode_error(&req, &resp, source))
    }

    /// Decode a literal response and map it onto `T`.
    pub(crate) fn send_typed<T: DeserializeOwned>(&self, req: Request) -> Result<T, Error> {
        let resp = self.execute_request(&req)?;
        let value = resp
            .literal()
            .map_err(|source| self.decode_error(&req, &resp, source))?;
        serde_json::from_value(value).map_err(|source| self.decode_error(&req, &resp, source))
    }

    pub(crate) fn send_text(&self, req: Request) -> Result<String, Error> {
        let resp = self.execute_request(&req)?;
        Ok(resp.text())
    }

    pub(crate) fn send_unit(&self, req: Request) -> Result<(), Error> {
        let _ = self.execute_request(&req)?;
        Ok(())
    }

    pub(crate) fn send_response(&self, req: Request) -> Result<Response, Error> {
        self.execute_request(&req)
    }

    fn resolve(&self, req: &Request) -> Result<Url, Error> {
        let base = match &req.target {
            Target::Client => &self.inner.base,
            Target::Reported(base) | Target::Remote(base) => base,
        };
        endpoint_url(base, req.segments.iter().map(String::as_str))
    }

    fn sends_auth(&self, req: &Request, url: &Url) -> bool {
        match req.target {
            Target::Client | Target::Remote(_) => true,
            Target::Reported(_) => url.origin() == self.inner.base.origin(),
        }
    }

    fn decode_error<E>(&self, req: &Request, resp: &Response, source: E) -> Error
    where
        E: StdError + Send + Sync + 'static,
    {
        let path = self
            .resolve(req)
            .map(|url| url.path().to_owned())
            .unwrap_or_default();
        Error::Decode {
            status: resp.status,
            method: req.method.clone(),
            path: path.into_boxed_str(),
            request_id: diagnostics::request_id(&resp.headers),
            body_snippet: diagnostics::body_snippet(
                &resp.body,
                self.inner.body_snippet,
                self.inner.auth.as_ref(),
            ),
            source: Box::new(source),
        }
    }

    pub(crate) fn execute_request(&self, req: &Request) -> Result<Response, Error> {
        #[cfg(feature = "metrics")]
        let _inflight = crate::transport::metrics::InFlightGuard::new();

        if req.body.is_some() && !req.form.is_empty() {
            return Err(Error::invalid_config(
                "request.body and request.form are mutually exclusive",
            ));
        }

        let url = self.resolve(req)?;

        let mut headers = HeaderMap::new();
        let auth = self.inner.auth.as_ref().filter(|_| self.sends_auth(req, &url));
        if let Some(auth) = auth {
            auth.apply(&mut headers)?;
        }

        let body = req.body.clone().map(|body| TransportBody {
            bytes: body.bytes,
            content_type: body.content_type,
        });

        #[cfg(any(feature = "tracing", feature = "metrics"))]
        let start = std::time::Instant::now();
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!(
            "autojenkins.request",
            http.method = %req.method,
            http.host = %url.host_str().unwrap_or_default(),
            http.path = %url.path(),
            http.status = field::Empty,
            request_id = field::Empty,
            latency_ms = field::Empty,
            error_kind = field::Empty,
        );
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let resp = match self.inner.transport.send(TransportRequest {
            method: req.method.clone(),
            url: url.clone(),
            headers,
            query: req.query.clone(),
            form: req.form.clone(),
            body,
            timeout: self.inner.timeout,
        }) {
            Ok(resp) => resp,
            Err(err) => {
                #[cfg(feature = "metrics")]
                crate::transport::metrics::record_outcome(
                    &req.method,
                    err.status(),
                    start.elapsed(),
                    Some(err.kind()),
                );
                #[cfg(feature = "tracing")]
                {
                    span.record("error_kind", field::debug(err.kind()));
                    span.record("latency_ms", start.elapsed().as_millis() as i64);
                }
                return Err(err);
            }
        };

        let request_id = diagnostics::request_id(&resp.headers);

        #[cfg(feature = "tracing")]
        {
            span.record("http.status", resp.status.as_u16() as i64);
            span.record("latency_ms", start.elapsed().as_millis() as i64);
            if let Some(rid) = request_id.as_deref() {
                span.record("request_id", field::display(rid));
            }
        }

        if resp.status.as_u16() >= 400 {
            let err = Error::from_http(HttpError {
                status: resp.status,
                method: req.method.clone(),
                url: Box::new(sanitize_url_for_error(&url)),
                request_id,
                body_snippet: diagnostics::body_snippet(
                    &resp.body,
                    self.inner.body_snippet,
                    self.inner.auth.as_ref(),
                ),
            });

            #[cfg(feature = "metrics")]
            crate::transport::metrics::record_outcome(
                &req.method,
                err.status(),
                start.elapsed(),
                Some(err.kind()),
            );
            #[cfg(feature = "tracing")]
            span.record("error_kind", field::debug(err.kind()));

            return Err(err);
        }

        #[cfg(feature = "metrics")]
        crate::transport::metrics::record_outcome(
            &req.method,
            Some(resp.status),
            start.elapsed(),
            None,
        );

        Ok(Response {
            status: resp.status,
            headers: resp.headers,
            body: resp.body,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ErrorKind, Jenkins,
        transport::{
            TransportRequest, TransportResponse,
            blocking_transport::BlockingTransport,
            request::{Request, RequestBody, Target},
        },
    };
    use http::{HeaderMap, StatusCode, header::AUTHORIZATION};
    use std::sync::{Arc, Mutex};
    use url::Url;

    /// Replies with a fixed status and body, remembering what it was sent.
    struct Canned {
        status: StatusCode,
        body: &'static str,
        seen: Mutex<Vec<TransportRequest>>,
    }

    impl Canned {
        fn new(status: u16, body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                status: StatusCode::from_u16(status).unwrap(),
                body,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl BlockingTransport for Canned {
        fn send(&self, req: TransportRequest) -> Result<TransportResponse, crate::Error> {
            self.seen.lock().unwrap().push(req);
            Ok(TransportResponse {
                status: self.status,
                headers: HeaderMap::new(),
                body: self.body.as_bytes().to_vec(),
            })
        }
    }

    fn client(transport: Arc<Canned>) -> Jenkins {
        Jenkins::builder("http://ci.local/jenkins")
            .unwrap()
            .auth_basic("me", "s3cret")
            .transport(transport)
            .build()
            .unwrap()
    }

    #[test]
    fn status_classification() {
        for (status, kind) in [
            (401, ErrorKind::Unauthorized),
            (403, ErrorKind::Forbidden),
            (404, ErrorKind::NotFound),
            (400, ErrorKind::HttpStatus),
            (502, ErrorKind::HttpStatus),
            (599, ErrorKind::HttpStatus),
            (600, ErrorKind::HttpStatus),
            (999, ErrorKind::HttpStatus),
        ] {
            let jenkins = client(Canned::new(status, ""));
            let err = jenkins
                .send_unit(Request::get(["api", "python"]))
                .unwrap_err();
            assert_eq!(err.kind(), kind, "status {status}");
            assert_eq!(err.status().map(|s| s.as_u16()), Some(status));
        }
    }

    #[test]
    fn redirects_and_success_pass_through() {
        let jenkins = client(Canned::new(302, ""));
        let resp = jenkins
            .send_response(Request::post(["job", "x", "build"]))
            .unwrap();
        assert_eq!(resp.status, StatusCode::FOUND);
    }

    #[test]
    fn sends_basic_auth_under_base_path() {
        let transport = Canned::new(200, "{'jobs': []}");
        let jenkins = client(transport.clone());
        let value = jenkins.send_literal(Request::get(["api", "python"])).unwrap();
        assert_eq!(value["jobs"], serde_json::json!([]));

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].url.as_str(), "http://ci.local/jenkins/api/python");
        assert_eq!(
            seen[0].headers.get(AUTHORIZATION).unwrap(),
            "Basic bWU6czNjcmV0"
        );
    }

    #[test]
    fn reported_addresses_get_credentials_only_on_the_same_origin() {
        let transport = Canned::new(200, "{}");
        let jenkins = client(transport.clone());
        for address in [
            "http://ci.local/jenkins/job/x/3/",
            "http://elsewhere.example/job/x/3/",
            "https://ci.local/jenkins/job/x/3/",
        ] {
            let target = Target::Reported(Url::parse(address).unwrap());
            jenkins
                .send_literal(Request::get(["api", "python"]).on(target))
                .unwrap();
        }

        let seen = transport.seen.lock().unwrap();
        let authorized: Vec<bool> = seen
            .iter()
            .map(|req| req.headers.contains_key(AUTHORIZATION))
            .collect();
        assert_eq!(authorized, vec![true, false, false]);
    }

    #[test]
    fn remote_server_gets_the_client_credentials() {
        let transport = Canned::new(200, "");
        let jenkins = client(transport.clone());
        let remote = Url::parse("http://second.example/").unwrap();
        jenkins
            .send_unit(Request::post(["createItem"]).on(Target::Remote(remote)))
            .unwrap();

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].url.as_str(), "http://second.example/createItem");
        assert!(seen[0].headers.contains_key(AUTHORIZATION));
    }

    #[test]
    fn malformed_literal_is_a_decode_error_with_redacted_snippet() {
        let jenkins = client(Canned::new(200, "<html>s3cret</html>"));
        let err = jenkins
            .send_literal(Request::get(["api", "python"]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        match err {
            crate::Error::Decode {
                path, body_snippet, ..
            } => {
                assert_eq!(&*path, "/jenkins/api/python");
                let snippet = body_snippet.unwrap();
                assert!(!snippet.contains("s3cret"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn error_snippet_is_redacted() {
        let jenkins = client(Canned::new(500, "boom s3cret"));
        let err = jenkins
            .send_unit(Request::get(["api", "python"]))
            .unwrap_err();
        match err {
            crate::Error::HttpStatus(http) => {
                assert!(!http.body_snippet.unwrap().contains("s3cret"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn body_and_form_are_exclusive() {
        let jenkins = client(Canned::new(200, ""));
        let mut req = Request::post(["createItem"]).body(RequestBody::xml("<project/>"));
        req.form.push(("a".into(), "b".into()));
        let err = jenkins.send_unit(req).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }
}
