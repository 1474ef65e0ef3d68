use crate::ErrorKind;
use http::{Method, StatusCode};
use std::time::Duration;

pub(crate) struct InFlightGuard {
    gauge: metrics::Gauge,
}

impl InFlightGuard {
    pub(crate) fn new() -> Self {
        let gauge = metrics::gauge!("autojenkins_inflight");
        gauge.increment(1.0);
        Self { gauge }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.gauge.decrement(1.0);
    }
}

fn status_class(status: StatusCode) -> &'static str {
    match status.as_u16() {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

fn error_kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Unauthorized => "unauthorized",
        ErrorKind::Forbidden => "forbidden",
        ErrorKind::NotFound => "not_found",
        ErrorKind::HttpStatus => "http_status",
        ErrorKind::Transport => "transport",
        ErrorKind::Decode => "decode",
        ErrorKind::InvalidConfig => "invalid_config",
        ErrorKind::TemplateRead => "template_read",
        ErrorKind::JobNotFound => "job_not_found",
        ErrorKind::JobAlreadyExists => "job_already_exists",
        ErrorKind::JobNotBuildable => "job_not_buildable",
        ErrorKind::MissingVariable => "missing_variable",
        ErrorKind::NoBuilds => "no_builds",
        ErrorKind::BuildTimeout => "build_timeout",
        ErrorKind::Cancelled => "cancelled",
    }
}

fn method_label(method: &Method) -> metrics::SharedString {
    match *method {
        Method::GET => "GET".into(),
        Method::POST => "POST".into(),
        ref other => other.to_string().into(),
    }
}

pub(crate) fn record_outcome(
    method: &Method,
    status: Option<StatusCode>,
    latency: Duration,
    error_kind: Option<ErrorKind>,
) {
    let method = method_label(method);
    let status_class = status.map(status_class).unwrap_or("transport");

    metrics::counter!(
        "autojenkins_requests_total",
        "method" => method.clone(),
        "status_class" => status_class
    )
    .increment(1);
    metrics::histogram!(
        "autojenkins_request_duration_seconds",
        "method" => method.clone(),
        "status_class" => status_class
    )
    .record(latency);

    if let Some(kind) = error_kind {
        metrics::counter!(
            "autojenkins_errors_total",
            "method" => method,
            "kind" => error_kind_label(kind)
        )
        .increment(1);
    }
}

/// Counted once per finished build wait, labelled by the build result.
pub(crate) fn record_build_finished(result: &str, waited: Duration) {
    metrics::counter!("autojenkins_builds_finished_total", "result" => result.to_owned())
        .increment(1);
    metrics::histogram!("autojenkins_build_wait_seconds").record(waited);
}
